//! Mutable per-slot candidate sets and the removal trail that undoes them.
//!
//! A slot's domain is a bitset of live [`WordId`]s over that slot's length
//! bucket. Domains only ever shrink while a branch of the search is being
//! explored; every removal is appended to a [`Trail`], and rewinding the trail
//! to the previous checkpoint re-inserts the removed words in LIFO order.
//! Restoration is exact: after a rewind, every domain equals its state at the
//! moment the checkpoint was taken.

use bit_set::BitSet;

use crate::grid::SlotId;
use crate::word_list::WordId;

/// Live candidate words for each slot.
#[derive(Debug)]
pub(crate) struct Domains {
    live: Vec<BitSet>,
    counts: Vec<usize>,
}

impl Domains {
    /// Full domains: slot `s` starts with word ids `0..sizes[s]` all live.
    pub(crate) fn new(sizes: &[usize]) -> Domains {
        let live = sizes
            .iter()
            .map(|&n| {
                let mut set = BitSet::with_capacity(n);
                for w in 0..n {
                    set.insert(w);
                }
                set
            })
            .collect();
        Domains { live, counts: sizes.to_vec() }
    }

    /// Number of live candidates for `slot`.
    pub(crate) fn len(&self, slot: SlotId) -> usize {
        self.counts[slot]
    }

    pub(crate) fn is_live(&self, slot: SlotId, word: WordId) -> bool {
        self.live[slot].contains(word)
    }

    /// Live word ids for `slot`, ascending (= alphabetical within the bucket).
    pub(crate) fn iter_live(&self, slot: SlotId) -> impl Iterator<Item = WordId> + '_ {
        self.live[slot].iter()
    }

    /// Remove `word` from `slot`'s domain, logging the removal on `trail`.
    ///
    /// The word must currently be live; removals are never double-logged.
    pub(crate) fn remove(&mut self, slot: SlotId, word: WordId, trail: &mut Trail) {
        let was_live = self.live[slot].remove(word);
        debug_assert!(was_live, "removed word {word} was not live in slot {slot}");
        self.counts[slot] -= 1;
        trail.entries.push((slot, word));
    }

    /// Shrink `slot`'s domain to the single word `keep`.
    pub(crate) fn restrict_to(&mut self, slot: SlotId, keep: WordId, trail: &mut Trail) {
        debug_assert!(self.is_live(slot, keep), "kept word {keep} must be live in slot {slot}");
        let others: Vec<WordId> = self.live[slot].iter().filter(|&w| w != keep).collect();
        for word in others {
            self.remove(slot, word, trail);
        }
    }

    fn reinsert(&mut self, slot: SlotId, word: WordId) {
        let was_dead = self.live[slot].insert(word);
        debug_assert!(was_dead, "restored word {word} was already live in slot {slot}");
        self.counts[slot] += 1;
    }
}

/// LIFO log of domain removals with a checkpoint stack.
///
/// `checkpoint()` marks the start of a branch; `rewind()` undoes every removal
/// made since the most recent mark. Checkpoints nest: one level per recursion
/// depth of the search.
#[derive(Debug, Default)]
pub(crate) struct Trail {
    entries: Vec<(SlotId, WordId)>,
    checkpoints: Vec<usize>,
}

impl Trail {
    pub(crate) fn new() -> Trail {
        Trail { entries: Vec::new(), checkpoints: Vec::new() }
    }

    /// Mark the current position for a later [`Trail::rewind`].
    pub(crate) fn checkpoint(&mut self) {
        self.checkpoints.push(self.entries.len());
    }

    /// Undo every removal made since the most recent checkpoint, in LIFO
    /// order, and pop that checkpoint. Returns the number of restored words.
    ///
    /// # Panics
    ///
    /// Panics if no checkpoint is active; the search always pairs a rewind
    /// with an earlier checkpoint.
    pub(crate) fn rewind(&mut self, domains: &mut Domains) -> usize {
        let mark = self
            .checkpoints
            .pop()
            .expect("rewind without a matching checkpoint");
        let restored = self.entries.len() - mark;
        while self.entries.len() > mark {
            let (slot, word) = self.entries.pop().unwrap();
            domains.reinsert(slot, word);
        }
        restored
    }

    /// Total number of removals currently logged.
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn checkpoint_depth(&self) -> usize {
        self.checkpoints.len()
    }
}

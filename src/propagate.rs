//! The consistency engine: arc revision over a worklist, to a fixed point.
//!
//! An arc (X, Y) is consistent when every live word in X's domain has at
//! least one supporting word in Y's domain — one whose letter at the crossing
//! index matches. `run` pops arcs off a worklist, removes unsupported words,
//! and re-enqueues the arcs (Z, X) for every other neighbor Z of a slot X
//! whose domain shrank, since their consistency may have been invalidated.
//!
//! Two seedings share the same loop: all arcs of the graph (the preprocessing
//! pass before search) and only the arcs into a just-assigned slot (the
//! incremental pass after each assignment, cascading outward from there).
//! Every removal goes through the trail, so the search can undo a failed
//! branch exactly.
//!
//! Cyclic slot dependencies are handled by the worklist itself reaching a
//! fixed point; slots never notify each other recursively.

use std::collections::{HashSet, VecDeque};

use log::debug;

use crate::constraint_graph::{ConstraintGraph, Crossing};
use crate::domains::{Domains, Trail};
use crate::grid::SlotId;
use crate::word_list::{Word, WordId};

/// Internal failure signal: a slot's domain became empty during propagation.
///
/// Never surfaced to callers of the library — the search converts it into a
/// backtrack, or into an unsolvable verdict at the root.
#[derive(Debug)]
pub(crate) struct DomainWipeout {
    pub(crate) slot: SlotId,
}

/// A directed arc: revise the first slot's domain against the crossing's
/// other slot.
pub(crate) type Arc = (SlotId, Crossing);

/// Every arc in the graph, for the preprocessing pass.
pub(crate) fn initial_worklist(graph: &ConstraintGraph) -> VecDeque<Arc> {
    graph.arcs().collect()
}

/// Only the arcs into `slot`, for the incremental pass after `slot` is
/// assigned. Cascades from there as domains shrink.
pub(crate) fn worklist_into(graph: &ConstraintGraph, slot: SlotId) -> VecDeque<Arc> {
    graph.crossings(slot).iter().map(|c| c.reversed(slot)).collect()
}

/// Process `worklist` to a fixed point.
///
/// `buckets[s]` is the word bucket slot `s` draws from; `domains` and `trail`
/// record the pruning. Returns [`DomainWipeout`] as soon as any domain
/// becomes empty.
pub(crate) fn run(
    graph: &ConstraintGraph,
    buckets: &[&[Word]],
    domains: &mut Domains,
    trail: &mut Trail,
    mut worklist: VecDeque<Arc>,
) -> Result<(), DomainWipeout> {
    while let Some((x, crossing)) = worklist.pop_front() {
        let y = crossing.other;

        if revise(buckets, domains, trail, x, &crossing) {
            if domains.len(x) == 0 {
                debug!("domain of slot {x} exhausted while revising against slot {y}");
                return Err(DomainWipeout { slot: x });
            }
            for c in graph.crossings(x) {
                if c.other != y {
                    worklist.push_back(c.reversed(x));
                }
            }
        }
    }
    Ok(())
}

/// Remove from X's domain every word with no support in Y's domain at the
/// crossing indices. Returns whether anything was removed.
fn revise(
    buckets: &[&[Word]],
    domains: &mut Domains,
    trail: &mut Trail,
    x: SlotId,
    crossing: &Crossing,
) -> bool {
    let y = crossing.other;

    // The set of letters Y still admits at the shared cell; X words are
    // supported iff their own crossing letter is in it.
    let supported: HashSet<char> = domains
        .iter_live(y)
        .map(|w| buckets[y][w].chars[crossing.other_index])
        .collect();

    let unsupported: Vec<WordId> = domains
        .iter_live(x)
        .filter(|&w| !supported.contains(&buckets[x][w].chars[crossing.own_index]))
        .collect();

    for word in &unsupported {
        domains.remove(x, *word, trail);
    }
    !unsupported.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use crate::word_list::VocabularyIndex;

    fn live_words<'a>(domains: &Domains, buckets: &[&'a [Word]], slot: SlotId) -> Vec<&'a str> {
        domains.iter_live(slot).map(|w| buckets[slot][w].text.as_str()).collect()
    }

    /// One across slot (row 0) crossing one down slot (column 1) at
    /// across index 1 / down index 0.
    fn plus_grid() -> Grid {
        Grid::parse_from_str("___\n#_#\n#_#").unwrap()
    }

    fn setup<'a>(
        grid: &Grid,
        vocab: &'a VocabularyIndex,
    ) -> (ConstraintGraph, Vec<&'a [Word]>, Domains) {
        let graph = ConstraintGraph::build(grid);
        let buckets: Vec<&[Word]> =
            grid.slots().iter().map(|s| vocab.words_of_length(s.length)).collect();
        let sizes: Vec<usize> = buckets.iter().map(|b| b.len()).collect();
        (graph, buckets, Domains::new(&sizes))
    }

    #[test]
    fn test_revise_removes_unsupported_words() {
        let grid = plus_grid();
        let vocab = VocabularyIndex::from_words(["cat", "dog", "ace"]).unwrap();
        let (graph, buckets, mut domains) = setup(&grid, &vocab);
        let mut trail = Trail::new();

        run(&graph, &buckets, &mut domains, &mut trail, initial_worklist(&graph)).unwrap();

        // across letter 1 must match down letter 0: DOG's middle 'O' supports
        // nothing, and DOG itself starts with a letter no middle provides
        assert_eq!(live_words(&domains, &buckets, 0), vec!["ACE", "CAT"]);
        assert_eq!(live_words(&domains, &buckets, 1), vec!["ACE", "CAT"]);
        assert_eq!(trail.len(), 2);
    }

    #[test]
    fn test_incompatible_domains_wipe_out() {
        let grid = plus_grid();
        // every middle letter is 'X'; no word starts with 'X'
        let vocab = VocabularyIndex::from_words(["axa", "bxb"]).unwrap();
        let (graph, buckets, mut domains) = setup(&grid, &vocab);
        let mut trail = Trail::new();

        let err = run(&graph, &buckets, &mut domains, &mut trail, initial_worklist(&graph))
            .unwrap_err();

        assert!(err.slot == 0 || err.slot == 1);
    }

    #[test]
    fn test_no_crossings_means_no_pruning() {
        let grid = Grid::parse_from_str("_____").unwrap();
        let vocab = VocabularyIndex::from_words(["abcde", "fghij"]).unwrap();
        let (graph, buckets, mut domains) = setup(&grid, &vocab);
        let mut trail = Trail::new();

        run(&graph, &buckets, &mut domains, &mut trail, initial_worklist(&graph)).unwrap();

        assert_eq!(domains.len(0), 2);
        assert_eq!(trail.len(), 0);
        assert!(worklist_into(&graph, 0).is_empty());
    }

    #[test]
    fn test_incremental_pass_prunes_neighbors_of_assigned_slot() {
        let grid = plus_grid();
        let vocab = VocabularyIndex::from_words(["cat", "ace", "tea"]).unwrap();
        let (graph, buckets, mut domains) = setup(&grid, &vocab);
        let mut trail = Trail::new();

        // assign "CAT" to the across slot, then propagate only from it
        trail.checkpoint();
        let cat = buckets[0].iter().position(|w| w.text == "CAT").unwrap();
        domains.restrict_to(0, cat, &mut trail);
        run(&graph, &buckets, &mut domains, &mut trail, worklist_into(&graph, 0)).unwrap();

        // down words must start with CAT's middle letter 'A'
        assert_eq!(live_words(&domains, &buckets, 1), vec!["ACE"]);

        // a rewind restores both the restriction and the pruning
        trail.rewind(&mut domains);
        assert_eq!(domains.len(0), 3);
        assert_eq!(domains.len(1), 3);
    }

    #[test]
    fn test_pruning_cascades_beyond_the_seeded_arcs() {
        // two across slots tied together by one down slot:
        //   row 0: ___        row 2: ___
        //   column 1 runs through both
        let grid = Grid::parse_from_str("___\n#_#\n___").unwrap();
        let vocab = VocabularyIndex::from_words(["cat", "ace", "tea", "eel"]).unwrap();
        let (graph, buckets, mut domains) = setup(&grid, &vocab);
        let mut trail = Trail::new();

        // the down slot is column 1: C-A-T vertically would need across words
        // agreeing at their middles; assigning row 0 = CAT forces the down
        // slot to words starting 'A', which in turn constrains row 2
        trail.checkpoint();
        let cat = buckets[0].iter().position(|w| w.text == "CAT").unwrap();
        domains.restrict_to(0, cat, &mut trail);
        run(&graph, &buckets, &mut domains, &mut trail, worklist_into(&graph, 0)).unwrap();

        let down = grid
            .slots()
            .iter()
            .find(|s| s.direction == crate::grid::Direction::Down)
            .unwrap()
            .id;
        // down words starting with 'A': only ACE; row 2 must then have
        // middle 'E' (ACE's last letter): TEA and EEL qualify, CAT and ACE do not
        assert_eq!(live_words(&domains, &buckets, down), vec!["ACE"]);
        let row2 = grid.slots().iter().find(|s| s.start == (2, 0)).unwrap().id;
        assert_eq!(live_words(&domains, &buckets, row2), vec!["EEL", "TEA"]);
    }
}

//! The backtracking search that fills a grid from a vocabulary.
//!
//! # Error Handling
//!
//! The solver uses [`SolverError`] with two variants:
//!
//! - S001: `Vocabulary` (a slot has no candidate words at all (wraps [`VocabularyError`]))
//! - S002: `Unsolvable` (no assignment satisfies the grid under the given vocabulary)
//!
//! Each error has a `code()`, optional `help()`, and `display_detailed()` method.
//! Domain exhaustion *during* the search is internal: it triggers a backtrack,
//! never an error, and only becomes `Unsolvable` once every candidate at the
//! root has been tried.
//!
//! # Examples
//!
//! ## Basic Usage
//!
//! ```
//! use crossfill::grid::Grid;
//! use crossfill::solver;
//! use crossfill::word_list::VocabularyIndex;
//!
//! let grid = Grid::parse_from_str("__\n__")?;
//! let vocab = VocabularyIndex::from_words(["at", "as", "to", "so"])?;
//!
//! let assignment = solver::solve(&grid, &vocab)?;
//! for (slot, word) in assignment.iter() {
//!     println!("slot {slot}: {word}");
//! }
//! print!("{}", assignment.render(&grid));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Handling Errors with Detailed Messages
//!
//! ```
//! use crossfill::grid::Grid;
//! use crossfill::solver::{self, SolverError};
//! use crossfill::word_list::VocabularyIndex;
//!
//! let grid = Grid::parse_from_str("__\n__")?;
//! let vocab = VocabularyIndex::from_words(["at", "by"])?;
//!
//! match solver::solve(&grid, &vocab) {
//!     Ok(assignment) => println!("{}", assignment.render(&grid)),
//!     Err(e) => {
//!         // Show detailed error with code and help
//!         eprintln!("{}", e.display_detailed());
//!         assert!(matches!(e, SolverError::Unsolvable));
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::cmp::Reverse;
use std::collections::HashSet;

use log::debug;

use crate::constraint_graph::ConstraintGraph;
use crate::domains::{Domains, Trail};
use crate::errors::VocabularyError;
use crate::grid::{Grid, SlotId};
use crate::propagate;
use crate::word_list::{VocabularyIndex, Word, WordId};

/// Unified error type for the solve pipeline.
///
/// Callers only ever see these two outcomes; the internal domain-wipeout
/// signal used during propagation is converted into backtracking before it
/// can reach the API boundary.
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    /// A slot's domain could not be seeded: the vocabulary has no words of
    /// the required length.
    #[error("vocabulary cannot seed the grid: {0}")]
    Vocabulary(#[from] VocabularyError),

    /// Every candidate at the root of the search has been exhausted. The
    /// puzzle has no solution under the given grid and vocabulary; no partial
    /// assignment is preserved.
    #[error("no assignment satisfies the grid under the given vocabulary")]
    Unsolvable,
}

impl SolverError {
    /// Returns the error code for this error variant
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            SolverError::Vocabulary(_) => "S001",
            SolverError::Unsolvable => "S002",
        }
    }

    /// Returns a helpful suggestion for this error
    #[must_use]
    pub fn help(&self) -> Option<&'static str> {
        match self {
            SolverError::Vocabulary(_) => None, // VocabularyError has its own help
            SolverError::Unsolvable => {
                Some("Enlarge the word list or loosen the grid; the verdict is definitive for these inputs")
            }
        }
    }

    /// Formats the error with code and optional help text
    #[must_use]
    pub fn display_detailed(&self) -> String {
        match self {
            SolverError::Vocabulary(ve) => {
                // delegate to VocabularyError's detailed display
                format!("{}\n  caused by: {}", self.code(), ve.display_detailed())
            }
            SolverError::Unsolvable => crate::errors::format_error_with_code_and_help(
                &self.to_string(),
                self.code(),
                self.help(),
            ),
        }
    }
}

/// A complete, consistent fill: one word per slot, keyed by [`SlotId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    words: Vec<String>,
}

impl Assignment {
    /// The word assigned to `slot`.
    #[must_use]
    pub fn word(&self, slot: SlotId) -> &str {
        &self.words[slot]
    }

    /// Number of filled slots (always the grid's slot count).
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Iterate `(slot, word)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &str)> {
        self.words.iter().enumerate().map(|(s, w)| (s, w.as_str()))
    }

    /// The per-cell letters this assignment places on `grid`.
    ///
    /// Crossing slots write the same letter to their shared cell, so write
    /// order does not matter.
    #[must_use]
    pub fn letter_grid(&self, grid: &Grid) -> Vec<Vec<Option<char>>> {
        let mut letters = vec![vec![None; grid.width()]; grid.height()];
        for slot in grid.slots() {
            for (i, ch) in self.words[slot.id].chars().enumerate() {
                let (row, col) = slot.cells[i];
                letters[row][col] = Some(ch);
            }
        }
        letters
    }

    /// Render the filled grid as terminal text: one row per line, blocked
    /// cells as `█`.
    #[must_use]
    pub fn render(&self, grid: &Grid) -> String {
        let letters = self.letter_grid(grid);
        let mut out = String::new();
        for row in 0..grid.height() {
            for col in 0..grid.width() {
                if grid.is_open(row, col) {
                    out.push(letters[row][col].unwrap_or(' '));
                } else {
                    out.push('█');
                }
            }
            out.push('\n');
        }
        out
    }
}

/// Fill `grid` from `vocabulary`: find one complete, consistent assignment or
/// prove none exists.
///
/// The pipeline: seed each slot's domain from the vocabulary bucket of its
/// length, enforce arc consistency over the whole constraint graph, then run
/// backtracking search. The search picks the unassigned slot with the fewest
/// remaining candidates (ties: most crossings, then lowest slot id), tries its
/// words least-constraining first (ties: alphabetical), re-propagates from
/// each tentative assignment, and rewinds all pruning on failure. A word is
/// used at most once across the whole fill.
///
/// The verdict is deterministic: the same grid and vocabulary always produce
/// the same assignment or the same error.
///
/// # Errors
///
/// Returns [`SolverError::Vocabulary`] if some slot has no candidates of its
/// length, and [`SolverError::Unsolvable`] if the search exhausts every
/// possibility. An `Unsolvable` result carries no partial state.
pub fn solve(grid: &Grid, vocabulary: &VocabularyIndex) -> Result<Assignment, SolverError> {
    let graph = ConstraintGraph::build(grid);

    // Seed domains: one bucket per slot, keyed by slot length.
    let mut buckets: Vec<&[Word]> = Vec::with_capacity(grid.slots().len());
    for slot in grid.slots() {
        let bucket = vocabulary.words_of_length(slot.length);
        if bucket.is_empty() {
            return Err(VocabularyError::NoWordsOfLength { length: slot.length }.into());
        }
        buckets.push(bucket);
    }
    let sizes: Vec<usize> = buckets.iter().map(|b| b.len()).collect();
    let mut domains = Domains::new(&sizes);
    let mut trail = Trail::new();

    // Preprocessing pass: full arc consistency before any assignment.
    if propagate::run(&graph, &buckets, &mut domains, &mut trail, propagate::initial_worklist(&graph))
        .is_err()
    {
        debug!("initial arc consistency proved the puzzle unsolvable");
        return Err(SolverError::Unsolvable);
    }
    debug!(
        "initial arc consistency pruned {} of {} candidates",
        trail.len(),
        sizes.iter().sum::<usize>()
    );

    let mut search = Search {
        graph: &graph,
        buckets: &buckets,
        domains,
        trail,
        assigned: vec![None; grid.slots().len()],
        used: HashSet::new(),
        nodes: 0,
        backtracks: 0,
    };

    if search.backtrack() {
        debug!("solved after {} assignments and {} backtracks", search.nodes, search.backtracks);
        let words = search
            .assigned
            .iter()
            .enumerate()
            .map(|(slot, word)| {
                // the search only returns true with every slot assigned
                let word = word.expect("complete assignment must cover every slot");
                search.buckets[slot][word].text.clone()
            })
            .collect();
        Ok(Assignment { words })
    } else {
        debug!(
            "exhausted the search after {} assignments and {} backtracks",
            search.nodes, search.backtracks
        );
        Err(SolverError::Unsolvable)
    }
}

/// Search state for one solve call. Nothing here outlives the call, so two
/// concurrent solves of independent puzzles never share mutable state.
struct Search<'a> {
    graph: &'a ConstraintGraph,
    buckets: &'a [&'a [Word]],
    domains: Domains,
    trail: Trail,
    assigned: Vec<Option<WordId>>,
    used: HashSet<(usize, WordId)>,
    nodes: u64,
    backtracks: u64,
}

impl Search<'_> {
    /// Depth-first search over slot assignments. Returns true once every slot
    /// is assigned; on false, all domain state is exactly as the caller left it.
    fn backtrack(&mut self) -> bool {
        let Some(slot) = self.select_slot() else {
            return true;
        };

        for word in self.order_values(slot) {
            self.nodes += 1;
            let key = (self.buckets[slot][word].len(), word);

            self.trail.checkpoint();
            self.domains.restrict_to(slot, word, &mut self.trail);
            self.assigned[slot] = Some(word);
            self.used.insert(key);

            // Re-establish consistency around the assignment; a wipeout just
            // means this candidate is dead, not that the puzzle is.
            let consistent = propagate::run(
                self.graph,
                self.buckets,
                &mut self.domains,
                &mut self.trail,
                propagate::worklist_into(self.graph, slot),
            )
            .is_ok();

            if consistent && self.backtrack() {
                return true;
            }

            self.trail.rewind(&mut self.domains);
            self.assigned[slot] = None;
            self.used.remove(&key);
            self.backtracks += 1;
        }

        false
    }

    /// Minimum-remaining-values slot selection: fewest live candidates, ties
    /// broken by most crossings, then lowest slot id. Returns `None` when
    /// every slot is assigned.
    fn select_slot(&self) -> Option<SlotId> {
        (0..self.assigned.len())
            .filter(|&s| self.assigned[s].is_none())
            .min_by_key(|&s| (self.domains.len(s), Reverse(self.graph.degree(s)), s))
    }

    /// Least-constraining-value ordering: words that rule out the fewest
    /// candidates in unassigned crossing slots come first, ties alphabetical.
    /// Words already used elsewhere in the fill are skipped entirely.
    fn order_values(&self, slot: SlotId) -> Vec<WordId> {
        let mut scored: Vec<(usize, WordId)> = self
            .domains
            .iter_live(slot)
            .filter(|&w| !self.used.contains(&(self.buckets[slot][w].len(), w)))
            .map(|w| (self.ruled_out(slot, w), w))
            .collect();
        scored.sort_unstable();
        scored.into_iter().map(|(_, w)| w).collect()
    }

    /// How many neighbor candidates assigning `word` to `slot` would remove.
    fn ruled_out(&self, slot: SlotId, word: WordId) -> usize {
        let chars = &self.buckets[slot][word].chars;
        self.graph
            .crossings(slot)
            .iter()
            .filter(|c| self.assigned[c.other].is_none())
            .map(|c| {
                let letter = chars[c.own_index];
                self.domains
                    .iter_live(c.other)
                    .filter(|&w| self.buckets[c.other][w].chars[c.other_index] != letter)
                    .count()
            })
            .sum()
    }
}

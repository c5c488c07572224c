//! `word_list` — Module to load and preprocess the vocabulary for crossfill.
//!
//! This module is responsible for turning a raw word list (either a file, or an
//! in-memory string) into a [`VocabularyIndex`]: the available words grouped by
//! length, which is what seeds the candidate set of every slot in the grid.
//!
//! The parsing logic:
//! - Each line is either a bare `word`, or `word;score` in the scored-list
//!   format many crossword lists ship in.
//! - Scored lines below `min_score` are skipped; bare lines always pass.
//! - Lines whose score fails to parse are skipped silently.
//! - Entries with non-alphabetic characters are skipped.
//! - All entries are normalized to uppercase, deduplicated, and bucketed by
//!   length with each bucket sorted alphabetically. Bucket order is load-bearing:
//!   a word's index in its bucket is its [`WordId`], and ascending `WordId`
//!   order is the deterministic tie-break order used throughout the solver.
//!
//! The public API mirrors the two ways a vocabulary arrives:
//! - [`VocabularyIndex::from_words`] — programmatic, from any iterator of words.
//! - [`VocabularyIndex::parse_from_str`] — from in-memory list text.
//! - [`VocabularyIndex::load_from_path`] — convenience wrapper reading a file.

use std::collections::HashMap;

use smallvec::SmallVec;

use crate::errors::VocabularyError;
use crate::MAX_SLOT_LENGTH;

/// An identifier for a word, based on its index in the vocabulary's bucket for
/// the relevant length.
pub type WordId = usize;

/// A single candidate word: its canonical uppercase text plus its characters,
/// split out once so crossing-letter checks never re-walk the UTF-8.
#[derive(Debug, Clone)]
pub struct Word {
    pub text: String,
    pub chars: SmallVec<[char; MAX_SLOT_LENGTH]>,
}

impl Word {
    fn new(text: String) -> Self {
        let chars = text.chars().collect();
        Word { text, chars }
    }

    /// Number of characters (not bytes) in the word.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

/// The available words grouped by length.
///
/// Construction fails with [`VocabularyError::NoEntries`] when nothing survives
/// filtering; a *particular* missing length is only detectable once a grid asks
/// for it, and is reported at domain-seeding time by the solver.
#[derive(Debug, Clone)]
pub struct VocabularyIndex {
    buckets: HashMap<usize, Vec<Word>>,
    word_count: usize,
}

impl VocabularyIndex {
    /// Build an index from an iterator of candidate words.
    ///
    /// Words are normalized to uppercase and deduplicated; entries containing
    /// non-alphabetic characters are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`VocabularyError::NoEntries`] if no valid word remains.
    pub fn from_words<I, S>(words: I) -> Result<VocabularyIndex, VocabularyError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let normalized: Vec<String> = words
            .into_iter()
            .filter_map(|w| normalize(w.as_ref()))
            .collect();

        Self::from_normalized(normalized)
    }

    /// Parse a raw word list from an in-memory string.
    ///
    /// # Arguments
    /// * `contents`  — the raw list, one entry per line, either `word` or `word;score`.
    /// * `min_score` — scored entries below this are skipped; bare entries always pass.
    ///
    /// # Errors
    ///
    /// Returns [`VocabularyError::NoEntries`] if no line survives filtering.
    pub fn parse_from_str(
        contents: &str,
        min_score: i32,
    ) -> Result<VocabularyIndex, VocabularyError> {
        // We use `filter_map` so invalid lines are skipped in one pass.
        let normalized: Vec<String> = contents
            .lines()
            .filter_map(|raw_line| {
                let line = raw_line.trim();

                if line.is_empty() {
                    None
                } else if let Some((entry_raw, score_raw)) = line.split_once(';') {
                    // Scored format. A malformed score means a malformed line: skip it.
                    let score: i32 = score_raw.trim().parse().ok()?;
                    if score < min_score {
                        None
                    } else {
                        normalize(entry_raw)
                    }
                } else {
                    // Bare word: no score to filter on.
                    normalize(line)
                }
            })
            .collect();

        Self::from_normalized(normalized)
    }

    /// Convenience method: read a word list from a file path and parse it.
    ///
    /// # Errors
    ///
    /// Will return an `Error` if the file cannot be read or the parsed list is
    /// empty (the [`VocabularyError`] is converted to `io::Error`).
    pub fn load_from_path<P: AsRef<std::path::Path>>(
        path: P,
        min_score: i32,
    ) -> std::io::Result<VocabularyIndex> {
        let path_ref = path.as_ref();

        let data = std::fs::read_to_string(path_ref).map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!("failed to read word list from '{}': {}", path_ref.display(), e),
            )
        })?;

        Ok(Self::parse_from_str(&data, min_score)?)
    }

    fn from_normalized(mut entries: Vec<String>) -> Result<VocabularyIndex, VocabularyError> {
        if entries.is_empty() {
            return Err(VocabularyError::NoEntries);
        }

        // Sort alphabetically, then dedup: `dedup()` only removes *adjacent*
        // duplicates, and a sorted bucket is what makes WordId order equal
        // alphabetical order later.
        entries.sort();
        entries.dedup();

        let word_count = entries.len();
        let mut buckets: HashMap<usize, Vec<Word>> = HashMap::new();
        for entry in entries {
            let word = Word::new(entry);
            buckets.entry(word.len()).or_default().push(word);
        }

        Ok(VocabularyIndex { buckets, word_count })
    }

    /// All words of character-length `n`, alphabetically ordered.
    ///
    /// Returns an empty slice when the vocabulary has no bucket for `n`.
    #[must_use]
    pub fn words_of_length(&self, n: usize) -> &[Word] {
        self.buckets.get(&n).map_or(&[], Vec::as_slice)
    }

    /// Total number of distinct words across all buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.word_count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.word_count == 0
    }
}

/// Uppercase a raw entry, rejecting anything non-alphabetic.
fn normalize(raw: &str) -> Option<String> {
    let entry = raw.trim();
    if entry.is_empty() || !entry.chars().all(char::is_alphabetic) {
        return None;
    }
    Some(entry.to_uppercase())
}

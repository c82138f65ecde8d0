//! Raw n-gram counts and the first-letter word index.
//!
//! Both tables are produced once by corpus extraction (or loaded from an
//! LNNG file) and are read-only afterwards; the language model and the
//! decoder only ever borrow them.

mod extract;
mod io;

pub use extract::extract_ngrams;
pub(crate) use extract::start_marker;

use std::collections::{BTreeMap, HashMap, HashSet};

/// Nested raw-count table: word → (history string → count).
///
/// History strings are space-joined token sequences of length 0..n-1; the
/// empty string is the order-0 history. Absence of an entry means zero.
#[derive(Debug, Clone, Default)]
pub struct CountTable {
    counts: HashMap<String, HashMap<String, f64>>,
}

impl CountTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, word: &str, history: &str, amount: f64) {
        *self
            .counts
            .entry(word.to_string())
            .or_default()
            .entry(history.to_string())
            .or_insert(0.0) += amount;
    }

    /// Raw count for a (word, history) pair, 0 when unseen.
    pub fn count(&self, word: &str, history: &str) -> f64 {
        self.counts
            .get(word)
            .and_then(|h| h.get(history))
            .copied()
            .unwrap_or(0.0)
    }

    /// Iterate every (word, history, count) triple.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, f64)> {
        self.counts.iter().flat_map(|(word, histories)| {
            histories
                .iter()
                .map(move |(history, &count)| (word.as_str(), history.as_str(), count))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Number of distinct words.
    pub fn word_count(&self) -> usize {
        self.counts.len()
    }
}

/// First-letter index over the known vocabulary.
///
/// Buckets keep insertion order (the order words were first seen in the
/// corpus) so argmax ties during decoding resolve the same way on every
/// run. Bucket keys iterate in sorted order for the whole-vocabulary
/// fallback.
#[derive(Debug, Clone, Default)]
pub struct WordIndex {
    buckets: BTreeMap<char, Vec<String>>,
    seen: HashSet<String>,
}

impl WordIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, word: &str) {
        let Some(first) = word.chars().next() else {
            return;
        };
        if self.seen.insert(word.to_string()) {
            self.buckets.entry(first).or_default().push(word.to_string());
        }
    }

    /// Words starting with `letter`, in first-seen order.
    pub fn bucket(&self, letter: char) -> Option<&[String]> {
        self.buckets.get(&letter).map(Vec::as_slice)
    }

    /// Every indexed word, bucket by bucket.
    pub fn all_words(&self) -> impl Iterator<Item = &str> {
        self.buckets
            .values()
            .flat_map(|words| words.iter().map(String::as_str))
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Everything the decoder needs from the counting stage: the raw counts,
/// the first-letter index, and the n-gram order they were extracted with.
#[derive(Debug, Clone)]
pub struct NgramModel {
    order: usize,
    counts: CountTable,
    index: WordIndex,
}

impl NgramModel {
    pub fn new(order: usize, counts: CountTable, index: WordIndex) -> Self {
        Self {
            order,
            counts,
            index,
        }
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn counts(&self) -> &CountTable {
        &self.counts
    }

    pub fn index(&self) -> &WordIndex {
        &self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_absent_is_zero() {
        let table = CountTable::new();
        assert_eq!(table.count("you", "see"), 0.0);
    }

    #[test]
    fn test_add_accumulates() {
        let mut table = CountTable::new();
        table.add("you", "see", 1.0);
        table.add("you", "see", 1.0);
        table.add("you", "", 1.0);
        assert_eq!(table.count("you", "see"), 2.0);
        assert_eq!(table.count("you", ""), 1.0);
        assert_eq!(table.word_count(), 1);
    }

    #[test]
    fn test_index_buckets_keep_first_seen_order() {
        let mut index = WordIndex::new();
        index.add("see");
        index.add("so");
        index.add("see");
        index.add("sun");
        assert_eq!(
            index.bucket('s').unwrap(),
            &["see".to_string(), "so".to_string(), "sun".to_string()]
        );
    }

    #[test]
    fn test_index_ignores_empty_word() {
        let mut index = WordIndex::new();
        index.add("");
        assert!(index.is_empty());
    }

    #[test]
    fn test_all_words_covers_every_bucket() {
        let mut index = WordIndex::new();
        index.add("you");
        index.add("before");
        index.add("be");
        let words: Vec<&str> = index.all_words().collect();
        assert_eq!(words, vec!["before", "be", "you"]);
    }
}

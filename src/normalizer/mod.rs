//! Token-stream normalization decoder.
//!
//! Each token is scored three ways against the rolling history: kept
//! as-is, split into several short words (digit-bearing tokens of up to
//! four characters), or substituted by a canonical candidate from the
//! similarity lookup. The highest-scoring interpretation is emitted and
//! the history advances. Documents are independent; within a document
//! decoding is strictly sequential because every token's hypotheses
//! depend on the history left by the previous one.

mod records;

pub use records::{preprocess, read_records, write_records, Record, RecordError};

use tracing::{debug, trace};

use crate::lm::LanguageModel;
use crate::lookup::SimilarityLookup;
use crate::ngram::{start_marker, WordIndex};

/// Tokens longer than this are never considered for a multiword split.
pub const MAX_MULTIWORD_LEN: usize = 4;

/// First letter of a digit's orthographic string ("0" is a special case,
/// kept uppercase as in the reference table).
fn digit_letter(c: char) -> Option<char> {
    match c {
        '0' => Some('O'),
        '1' => Some('o'),
        '2' | '3' => Some('t'),
        '4' | '5' => Some('f'),
        '6' | '7' => Some('s'),
        '8' => Some('e'),
        '9' => Some('n'),
        _ => None,
    }
}

/// Rolling decoding context of exactly n tokens, oldest first.
///
/// Seeded with n distinct start markers; every shift keeps the length at
/// exactly n.
#[derive(Debug, Clone, PartialEq)]
pub struct RollingHistory {
    tokens: Vec<String>,
}

impl RollingHistory {
    pub fn new(order: usize) -> Self {
        Self {
            tokens: (1..=order).map(start_marker).collect(),
        }
    }

    /// Drop the oldest token and append one.
    pub fn shift(&mut self, token: String) {
        self.tokens.push(token);
        self.tokens.remove(0);
    }

    /// Append `words`, then drop `drop_count` oldest entries.
    ///
    /// The decoder passes the character length of the replaced token as
    /// `drop_count`; since the multiword path emits one word per
    /// character, the length stays at n.
    pub fn shift_multi(&mut self, words: &[String], drop_count: usize) {
        self.tokens.extend(words.iter().cloned());
        self.tokens.drain(..drop_count);
    }

    /// LM query context: the most recent n-1 tokens. The count table only
    /// holds histories up to length n-1, so the oldest token never
    /// participates in scoring. Orders below two have no usable context
    /// and yield an empty slice.
    pub fn context(&self) -> &[String] {
        self.tokens.get(1..).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }
}

/// One scored interpretation of an input token.
#[derive(Debug)]
enum Hypothesis {
    Literal,
    Multiword(Vec<String>),
    Candidate(String),
}

/// Normalization decoder over borrowed, read-only tables.
pub struct Normalizer<'a> {
    lm: &'a LanguageModel<'a>,
    index: &'a WordIndex,
    lookup: &'a SimilarityLookup,
    order: usize,
}

impl<'a> Normalizer<'a> {
    pub fn new(
        lm: &'a LanguageModel<'a>,
        index: &'a WordIndex,
        lookup: &'a SimilarityLookup,
        order: usize,
    ) -> Self {
        Self {
            lm,
            index,
            lookup,
            order,
        }
    }

    /// Decode one document. Tokens are expected lowercased and
    /// punctuation-spaced (see [`preprocess`]).
    pub fn normalize_tokens(&self, tokens: &[String]) -> Vec<String> {
        let mut history = RollingHistory::new(self.order);
        let mut output = Vec::new();

        for token in tokens {
            // Mentions and hashtags pass through and leave the history
            // alone, matching the reference decoder.
            if token.starts_with('@') || token.starts_with('#') {
                output.push(token.clone());
                continue;
            }

            let (hypothesis, prob) = self.best_hypothesis(token, &history);
            trace!(token = token.as_str(), prob, "hypothesis selected");

            match hypothesis {
                Hypothesis::Literal => {
                    output.push(token.clone());
                    history.shift(token.clone());
                }
                Hypothesis::Multiword(words) => {
                    output.extend(words.iter().cloned());
                    // Shift by the character length of the original token,
                    // not the number of words produced.
                    history.shift_multi(&words, token.chars().count());
                }
                Hypothesis::Candidate(candidate) => {
                    output.push(candidate.clone());
                    history.shift(candidate);
                }
            }
            debug_assert_eq!(history.len(), self.order);
        }

        output
    }

    /// Score all three interpretations; ties prefer literal, then
    /// multiword, then candidate substitution.
    fn best_hypothesis(&self, token: &str, history: &RollingHistory) -> (Hypothesis, f64) {
        let literal_prob = self.lm.probability(token, history.context());
        let (multi_words, multi_prob) = self.multiword(token, history);
        let (candidate, candidate_prob) = self.candidate(token, history);

        if literal_prob >= multi_prob && literal_prob >= candidate_prob {
            (Hypothesis::Literal, literal_prob)
        } else if multi_prob >= candidate_prob {
            (Hypothesis::Multiword(multi_words), multi_prob)
        } else {
            (Hypothesis::Candidate(candidate), candidate_prob)
        }
    }

    /// Multiword split: one recovered word per character.
    ///
    /// Only short tokens containing at least one digit qualify. Digits go
    /// through the digit-letter table; every other character is its own
    /// first-letter key. The probability is the product over the chosen
    /// words, each scored against the advancing alternate history.
    fn multiword(&self, token: &str, history: &RollingHistory) -> (Vec<String>, f64) {
        let chars: Vec<char> = token.chars().collect();
        if chars.len() > MAX_MULTIWORD_LEN || !chars.iter().any(|c| c.is_ascii_digit()) {
            return (Vec::new(), 0.0);
        }

        let mut alt_history = history.clone();
        let mut words = Vec::with_capacity(chars.len());
        let mut prob = 1.0;

        for &c in &chars {
            let letter = digit_letter(c).unwrap_or(c);
            let (word, word_prob) = self.best_starting_with(letter, &alt_history);
            prob *= word_prob;
            alt_history.shift(word.clone());
            words.push(word);
        }

        (words, prob)
    }

    /// Most probable indexed word starting with `letter`; when no bucket
    /// exists for the letter, the entire vocabulary is searched.
    fn best_starting_with(&self, letter: char, history: &RollingHistory) -> (String, f64) {
        let mut best = String::new();
        let mut best_prob = 0.0;

        let mut consider = |word: &str| {
            let p = self.lm.probability(word, history.context());
            if p > best_prob {
                best_prob = p;
                best = word.to_string();
            }
        };

        match self.index.bucket(letter) {
            Some(bucket) => bucket.iter().for_each(|w| consider(w)),
            None => {
                debug!(%letter, "no bucket, scanning full vocabulary");
                self.index.all_words().for_each(&mut consider);
            }
        }

        (best, best_prob)
    }

    /// Best canonical candidate from the similarity lookup, scored by the
    /// language model; the precomputed lexical scores only fix the slate.
    fn candidate(&self, token: &str, history: &RollingHistory) -> (String, f64) {
        let mut best = String::new();
        let mut best_prob = 0.0;

        if let Some(list) = self.lookup.get(token) {
            for (candidate, _) in list.entries() {
                let p = self.lm.probability(candidate, history.context());
                if p > best_prob {
                    best_prob = p;
                    best = candidate.to_string();
                }
            }
        }

        (best, best_prob)
    }
}

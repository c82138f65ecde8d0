//! Modified Kneser-Ney smoothed n-gram language model.
//!
//! The recursive backoff over shrinking histories is evaluated as a
//! bottom-up loop over history suffixes, and the per-history aggregates
//! (denominator plus count-of-counts) are computed once at construction
//! instead of rescanning the vocabulary on every query. The count table
//! is immutable after extraction, so the cache is never invalidated.

mod discounts;

pub use discounts::DiscountConstants;

use std::collections::HashMap;

use tracing::debug;

use crate::ngram::CountTable;

/// Aggregates for one history: total mass and how many distinct words
/// occur with it exactly once, exactly twice, or three-plus times.
#[derive(Debug, Clone, Copy, Default)]
struct HistoryStats {
    total: f64,
    n1: f64,
    n2: f64,
    n3: f64,
}

/// Smoothed probability queries over a borrowed count table.
pub struct LanguageModel<'a> {
    counts: &'a CountTable,
    discounts: DiscountConstants,
    stats: HashMap<String, HistoryStats>,
}

impl<'a> LanguageModel<'a> {
    pub fn new(counts: &'a CountTable, discounts: DiscountConstants) -> Self {
        let mut stats: HashMap<String, HistoryStats> = HashMap::new();
        for (_, history, count) in counts.iter() {
            let entry = stats.entry(history.to_string()).or_default();
            entry.total += count;
            if count == 1.0 {
                entry.n1 += 1.0;
            } else if count == 2.0 {
                entry.n2 += 1.0;
            } else if count >= 3.0 {
                entry.n3 += 1.0;
            }
        }
        debug!(histories = stats.len(), "history aggregates cached");
        Self {
            counts,
            discounts,
            stats,
        }
    }

    pub fn discounts(&self) -> DiscountConstants {
        self.discounts
    }

    /// Smoothed P(word | context), context ordered oldest first.
    ///
    /// Evaluated from the empty history upward: each level contributes its
    /// discounted relative frequency plus backoff mass scaled by the level
    /// below. A level whose history was never seen contributes 0, and an
    /// unseen full context yields 0 outright.
    pub fn probability(&self, word: &str, context: &[String]) -> f64 {
        let mut acc = 1.0;
        for suffix_len in 0..=context.len() {
            let history = context[context.len() - suffix_len..].join(" ");
            acc = match self.stats.get(history.as_str()) {
                Some(stats) if stats.total != 0.0 => {
                    let numerator = self.discounted_count(word, &history);
                    let d = self.discounts;
                    let gamma =
                        (d.d1 * stats.n1 + d.d2 * stats.n2 + d.d3 * stats.n3) / stats.total;
                    numerator / stats.total + gamma * acc
                }
                _ => 0.0,
            };
        }
        acc
    }

    /// Raw count minus the discount for its frequency bucket.
    fn discounted_count(&self, word: &str, history: &str) -> f64 {
        let raw = self.counts.count(word, history);
        if raw == 1.0 {
            raw - self.discounts.d1
        } else if raw == 2.0 {
            raw - self.discounts.d2
        } else if raw >= 3.0 {
            raw - self.discounts.d3
        } else {
            raw
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ngram::extract_ngrams;

    fn ctx(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    /// Corpus with repeated bigrams so the discounts are non-degenerate.
    fn model_counts() -> CountTable {
        extract_ngrams("i see you . i see you . i see him", 2)
            .counts()
            .clone()
    }

    #[test]
    fn test_probability_non_negative() {
        let counts = model_counts();
        let lm = LanguageModel::new(&counts, DiscountConstants::estimate(&counts, 2));
        for word in ["i", "see", "you", "him", "unseen"] {
            for context in [ctx(&[]), ctx(&["see"]), ctx(&["zzz"])] {
                let p = lm.probability(word, &context);
                assert!(p >= 0.0, "P({word}|{context:?}) = {p}");
            }
        }
    }

    #[test]
    fn test_seen_bigram_outscores_unseen_word() {
        let counts = model_counts();
        let lm = LanguageModel::new(&counts, DiscountConstants::estimate(&counts, 2));
        let context = ctx(&["see"]);
        assert!(lm.probability("you", &context) > lm.probability("u", &context));
    }

    #[test]
    fn test_singleton_discounted_by_d1() {
        let counts = model_counts();
        let discounts = DiscountConstants::estimate(&counts, 2);
        let lm = LanguageModel::new(&counts, discounts);

        // "him" follows "see" exactly once; the top-level term must be
        // (1 - D1) / total("see").
        let context = ctx(&["see"]);
        let base = lm.probability("him", &[]);
        let total = 3.0; // "see" is followed by you, you, him
        let gamma = (discounts.d1 * 1.0 + discounts.d2 * 1.0) / total;
        let expected = (1.0 - discounts.d1) / total + gamma * base;
        let got = lm.probability("him", &context);
        assert!((got - expected).abs() < 1e-12, "got {got}, expected {expected}");
    }

    #[test]
    fn test_unseen_context_yields_zero() {
        let counts = model_counts();
        let lm = LanguageModel::new(&counts, DiscountConstants::estimate(&counts, 2));
        assert_eq!(lm.probability("you", &ctx(&["zzz"])), 0.0);
    }

    #[test]
    fn test_empty_table_yields_zero() {
        let counts = CountTable::new();
        let lm = LanguageModel::new(&counts, DiscountConstants::estimate(&counts, 2));
        assert_eq!(lm.probability("you", &[]), 0.0);
        assert_eq!(lm.probability("you", &ctx(&["see"])), 0.0);
    }

    #[test]
    fn test_base_case_adds_backoff_mass() {
        // For the empty context the smoothed value is e/d + gamma, so even
        // an unseen word receives the raw leftover mass.
        let counts = model_counts();
        let lm = LanguageModel::new(&counts, DiscountConstants::estimate(&counts, 2));
        assert!(lm.probability("unseen", &[]) > 0.0);
    }
}

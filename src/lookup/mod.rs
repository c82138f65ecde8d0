//! Precomputed similarity lookup: unnormalized word → ranked canonical
//! candidates.
//!
//! Built in two phases over the embedding tables. Phase 1 finds, for every
//! canonical word, its nearest unnormalized neighbours in embedding space.
//! Phase 2 inverts those pairs and reranks them by lexical similarity,
//! accumulating a fixed-size candidate list per unnormalized word. The
//! result is read-only during decoding and safe to share across threads.

mod embedding;
mod io;
pub mod lexical;

pub use embedding::{EmbeddingError, EmbeddingTable};

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use lexical::lex_sim;

/// Candidate list length per word.
pub const TOP_K: usize = 25;

/// Sentinel score for unfilled slots, lower than any real score.
const EMPTY_SCORE: f64 = f64::NEG_INFINITY;

/// Fixed-capacity ranked list, descending by score.
///
/// Always holds exactly [`TOP_K`] slots; unfilled slots carry an empty
/// word and the sentinel score. A candidate displaces an occupant only on
/// a strictly greater score, so earlier insertions win ties and the order
/// is reproducible run to run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedList {
    slots: Vec<(String, f64)>,
}

impl Default for RankedList {
    fn default() -> Self {
        Self::new()
    }
}

impl RankedList {
    pub fn new() -> Self {
        Self {
            slots: vec![(String::new(), EMPTY_SCORE); TOP_K],
        }
    }

    /// Insert before the first slot scoring strictly less than the
    /// candidate, dropping the tail. Candidates worse than every occupant
    /// are discarded.
    pub fn insert(&mut self, word: &str, score: f64) {
        let Some(pos) = self.slots.iter().position(|(_, s)| *s < score) else {
            return;
        };
        self.slots.insert(pos, (word.to_string(), score));
        self.slots.truncate(TOP_K);
    }

    /// Filled slots only, best first.
    pub fn entries(&self) -> impl Iterator<Item = (&str, f64)> {
        self.slots
            .iter()
            .filter(|(_, score)| *score != EMPTY_SCORE)
            .map(|(word, score)| (word.as_str(), *score))
    }

    pub fn is_filled(&self) -> bool {
        self.slots.iter().all(|(_, score)| *score != EMPTY_SCORE)
    }

    #[cfg(test)]
    fn scores(&self) -> Vec<f64> {
        self.slots.iter().map(|(_, s)| *s).collect()
    }
}

/// Unnormalized word → ranked canonical candidates.
#[derive(Debug, Clone, Default)]
pub struct SimilarityLookup {
    lists: HashMap<String, RankedList>,
}

impl SimilarityLookup {
    /// Rank `candidate` into the list for `word`.
    pub fn insert(&mut self, word: &str, candidate: &str, score: f64) {
        self.lists
            .entry(word.to_string())
            .or_default()
            .insert(candidate, score);
    }

    pub fn get(&self, word: &str) -> Option<&RankedList> {
        self.lists.get(word)
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RankedList)> {
        self.lists.iter().map(|(w, l)| (w.as_str(), l))
    }
}

/// Cosine-style similarity with a combined-norm denominator.
///
/// The denominator is sqrt(|a|² + |b|²), not the product of the separate
/// norms; the reference data was built with this variant, so it is kept
/// bit-for-bit rather than corrected to the textbook formula.
pub fn cos_sim(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for i in 0..a.len() {
        numerator += a[i] * b[i];
        denominator += a[i] * a[i] + b[i] * b[i];
    }
    numerator / denominator.sqrt()
}

/// Phase 1: nearest unnormalized neighbours of one canonical vector.
fn nearest_neighbours(query: &[f64], unnormalized: &EmbeddingTable) -> RankedList {
    let mut top = RankedList::new();
    for (word, vector) in unnormalized.iter() {
        top.insert(word, cos_sim(query, vector));
    }
    top
}

/// Build the full lookup from canonical and unnormalized embeddings.
///
/// Each canonical word's neighbour search is independent of every other's,
/// so phase 1 is a natural parallelization point; the current pass is
/// sequential and deterministic in embedding-file order.
pub fn build_lookup(
    canonical: &EmbeddingTable,
    unnormalized: &EmbeddingTable,
) -> SimilarityLookup {
    let mut lookup = SimilarityLookup::default();

    for (c_word, c_vec) in canonical.iter() {
        let neighbours = nearest_neighbours(c_vec, unnormalized);
        for (u_word, _) in neighbours.entries() {
            lookup.insert(u_word, c_word, lex_sim(c_word, u_word));
        }
        debug!(word = c_word, "canonical word reranked");
    }

    info!(
        canonical = canonical.len(),
        unnormalized = unnormalized.len(),
        entries = lookup.len(),
        "similarity lookup built"
    );
    lookup
}

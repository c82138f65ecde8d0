//! Statistical lexical normalization of noisy text.
//!
//! Combines a Modified Kneser-Ney smoothed n-gram language model with a
//! precomputed phonetic/lexical similarity lookup to rewrite informal
//! tokens ("b4" → "before", "u" → "you") before downstream processing.

pub mod lm;
pub mod lookup;
pub mod ngram;
pub mod normalizer;
pub mod store;

mod trace_init;

pub use trace_init::init_tracing;

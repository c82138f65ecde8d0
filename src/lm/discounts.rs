//! Modified Kneser-Ney discount constants, following Chen & Goodman (1999).

use tracing::warn;

use crate::ngram::CountTable;

/// The three subtractive discounts, derived once from the count table and
/// immutable for the lifetime of a [`LanguageModel`](super::LanguageModel).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscountConstants {
    pub d1: f64,
    pub d2: f64,
    pub d3: f64,
}

/// Count-of-counts over the highest-order (word, history) pairs.
struct Tally {
    n1: f64,
    n2: f64,
    n3: f64,
    n4: f64,
}

/// Tally how many highest-order pairs occur exactly 1, 2, 3 and 4 times.
///
/// A pair is highest-order when its history splits into exactly n-1
/// space-separated fields. The empty history splits into one empty field,
/// so for n = 2 the order-0 history is tallied alongside single-word
/// histories; the reference counts were produced the same way.
fn tally(counts: &CountTable, order: usize) -> Tally {
    let mut t = Tally {
        n1: 0.0,
        n2: 0.0,
        n3: 0.0,
        n4: 0.0,
    };

    for (_, history, count) in counts.iter() {
        if history.split(' ').count() != order.saturating_sub(1) {
            continue;
        }
        if count == 1.0 {
            t.n1 += 1.0;
        } else if count == 2.0 {
            t.n2 += 1.0;
        } else if count == 3.0 {
            t.n3 += 1.0;
        } else if count == 4.0 {
            t.n4 += 1.0;
        }
    }
    t
}

impl DiscountConstants {
    /// Estimate the discounts from the count table.
    ///
    /// Any level whose count-of-counts is zero would divide by zero; that
    /// level's discount degrades to 0 and the condition is logged instead
    /// of faulting.
    pub fn estimate(counts: &CountTable, order: usize) -> Self {
        let t = tally(counts, order);
        let y = discount_ratio(&t);

        let d1 = if t.n1 > 0.0 {
            1.0 - 2.0 * y * t.n2 / t.n1
        } else {
            warn!(order, "no singleton n-grams, D1 degrades to 0");
            0.0
        };
        let d2 = if t.n2 > 0.0 {
            2.0 - 3.0 * y * t.n3 / t.n2
        } else {
            warn!(order, "no doubleton n-grams, D2 degrades to 0");
            0.0
        };
        let d3 = d3_or_zero(&t, y, order);

        Self { d1, d2, d3 }
    }

    /// Estimate the discounts the way the reference implementation does.
    ///
    /// The reference assigns the D2 expression to D1 (overwriting the real
    /// D1) and never sets D2, which therefore stays 0. Kept behind its own
    /// constructor so output can be matched against reference datasets;
    /// [`estimate`](Self::estimate) is the corrected default.
    pub fn estimate_legacy(counts: &CountTable, order: usize) -> Self {
        let t = tally(counts, order);
        let y = discount_ratio(&t);

        let d1 = if t.n2 > 0.0 {
            2.0 - 3.0 * y * t.n3 / t.n2
        } else {
            warn!(order, "no doubleton n-grams, legacy D1 degrades to 0");
            0.0
        };
        let d3 = d3_or_zero(&t, y, order);

        Self { d1, d2: 0.0, d3 }
    }
}

fn discount_ratio(t: &Tally) -> f64 {
    let denom = t.n1 + 2.0 * t.n2;
    if denom > 0.0 {
        t.n1 / denom
    } else {
        warn!("no singleton or doubleton n-grams, discount ratio degrades to 0");
        0.0
    }
}

fn d3_or_zero(t: &Tally, y: f64, order: usize) -> f64 {
    if t.n3 > 0.0 {
        3.0 - 4.0 * y * t.n4 / t.n3
    } else {
        warn!(order, "no tripleton n-grams, D3 degrades to 0");
        0.0
    }
}

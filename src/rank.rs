//! Dot-product similarity ranking over an embedding table.
//!
//! Scores every row of a table against a query vector with a raw dot
//! product (no cosine normalization; artifact vectors carry whatever
//! magnitudes they were trained with) and selects the top-k rows. The
//! query's own row is excluded so an item never recommends itself.
//!
//! Selection order is deterministic: equal scores fall back to ascending
//! encoded index, so repeat calls over unchanged artifacts return
//! identical sequences.
//!
//! Scoring switches between a sequential loop and rayon data parallelism
//! based on table size; small tables stay on the calling thread.

use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use log::{debug, trace};

use crate::embedding::EmbeddingTable;

/// Tables at or above this row count are scored with rayon.
const PARALLEL_THRESHOLD: usize = 1000;

/// Which end of the score range to return.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RankMode {
    /// Highest dot products first (most similar).
    #[default]
    Nearest,
    /// Lowest dot products first (least similar).
    Farthest,
}

impl fmt::Display for RankMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankMode::Nearest => write!(f, "nearest"),
            RankMode::Farthest => write!(f, "farthest"),
        }
    }
}

/// Dot product between two slices.
///
/// # Panics
///
/// Panics if the lengths differ.
///
/// # Examples
///
/// ```
/// use anirec::rank::dot;
/// assert_eq!(dot(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]), 32.0);
/// ```
#[inline]
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    assert_eq!(a.len(), b.len(), "dimension mismatch");
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Ranks all table rows against a query vector and returns up to `k`
/// `(encoded index, score)` pairs.
///
/// `exclude` names the query's own row when the query was taken from the
/// table; pass `None` for external query vectors. The excluded row never
/// appears in the result. With [`RankMode::Nearest`] scores are
/// non-increasing; with [`RankMode::Farthest`] non-decreasing. Returns
/// fewer than `k` pairs when the table has fewer eligible rows, and an
/// empty vector for `k == 0`.
///
/// # Panics
///
/// Panics if the query length differs from the table width.
///
/// # Examples
///
/// ```
/// use anirec::embedding::EmbeddingTable;
/// use anirec::rank::{rank, RankMode};
///
/// let table = EmbeddingTable::from_rows(vec![
///     vec![1.0, 0.0],
///     vec![0.9, 0.1],
///     vec![-1.0, 0.0],
/// ]);
/// let query = table.row(0);
/// let top = rank(&query, &table, Some(0), 2, RankMode::Nearest);
/// assert_eq!(top.len(), 2);
/// assert_eq!(top[0].0, 1);
/// assert_eq!(top[1].0, 2);
/// ```
pub fn rank(
    query: &[f64],
    table: &EmbeddingTable,
    exclude: Option<usize>,
    k: usize,
    mode: RankMode,
) -> Vec<(usize, f64)> {
    assert_eq!(
        query.len(),
        table.nfeatures(),
        "query dimension mismatch: query has {}, table has {}",
        query.len(),
        table.nfeatures()
    );

    let nitems = table.nitems();
    debug!("Ranking {} rows (k={}, mode={}, exclude={:?})", nitems, k, mode, exclude);

    if k == 0 {
        return Vec::new();
    }

    let mut scored: Vec<(usize, f64)> = if nitems >= PARALLEL_THRESHOLD {
        trace!("Scoring in parallel ({} rows)", nitems);
        (0..nitems)
            .into_par_iter()
            .map(|i| (i, table.dot_row(i, query)))
            .collect()
    } else {
        trace!("Scoring sequentially ({} rows)", nitems);
        (0..nitems).map(|i| (i, table.dot_row(i, query))).collect()
    };

    // Deterministic ordering: score, then ascending index on ties.
    match mode {
        RankMode::Nearest => scored.sort_unstable_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        }),
        RankMode::Farthest => scored.sort_unstable_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        }),
    }

    let results: Vec<(usize, f64)> = scored
        .into_iter()
        .filter(|(i, _)| Some(*i) != exclude)
        .take(k)
        .collect();

    debug!("Ranking produced {} results", results.len());
    results
}

//! Top-k selection over scored candidates.
//!
//! Quickselect moves the `k` smallest candidates into the front of the buffer
//! in expected linear time; only that prefix is then sorted. Every comparison
//! uses the full `(score, id)` order so ties resolve identically whichever
//! way the partitioning falls.

use std::cmp::Ordering;

use crate::error::{Result, SearchError};

/// A candidate paired with the score it is ranked by. Smaller scores rank
/// first.
///
/// # Examples
/// ```
/// use nns_core::ScoredCandidate;
///
/// let near = ScoredCandidate::new(0.1, 7);
/// let tied = ScoredCandidate::new(0.1, 9);
/// assert!(near < tied);
/// assert!(ScoredCandidate::new(-1.0, 100) < near);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoredCandidate {
    /// Ranking key; smaller is better.
    pub score: f64,
    /// Identifier of the scored vector.
    pub id: usize,
}

impl ScoredCandidate {
    /// Pairs `score` with `id`.
    #[must_use]
    #[rustfmt::skip]
    pub fn new(score: f64, id: usize) -> Self { Self { score, id } }
}

impl Eq for ScoredCandidate {}

impl Ord for ScoredCandidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then(self.id.cmp(&other.id))
    }
}

impl PartialOrd for ScoredCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Returns the `k` smallest candidates sorted ascending by `(score, id)`.
///
/// When `k` is at least the number of candidates every candidate is returned
/// in sorted order.
///
/// # Errors
/// Returns [`SearchError::InvalidArgument`] when `k` is zero.
///
/// # Examples
/// ```
/// use nns_core::{ScoredCandidate, select_top_k};
///
/// let scores = vec![
///     ScoredCandidate::new(0.5, 0),
///     ScoredCandidate::new(0.1, 1),
///     ScoredCandidate::new(0.3, 2),
///     ScoredCandidate::new(0.1, 3),
/// ];
/// let top = select_top_k(scores, 3)?;
/// let ids: Vec<_> = top.iter().map(|candidate| candidate.id).collect();
/// assert_eq!(ids, vec![1, 3, 2]);
/// # Ok::<(), nns_core::SearchError>(())
/// ```
pub fn select_top_k(mut candidates: Vec<ScoredCandidate>, k: usize) -> Result<Vec<ScoredCandidate>> {
    if k == 0 {
        return Err(SearchError::invalid_k(k));
    }
    if k < candidates.len() {
        partition_smallest(&mut candidates, k);
        candidates.truncate(k);
    }
    candidates.sort_unstable();
    Ok(candidates)
}

/// Rearranges `items` so the first `k` slots hold the `k` smallest items in
/// unspecified order. Requires `k < items.len()`.
fn partition_smallest(items: &mut [ScoredCandidate], k: usize) {
    let mut lo = 0;
    let mut hi = items.len();
    // `k` stays inside `lo..hi`; once the pivot lands on `k`, everything
    // before it is smaller.
    while hi - lo > 1 {
        let pivot = lo + partition(&mut items[lo..hi]);
        match pivot.cmp(&k) {
            Ordering::Equal => return,
            Ordering::Greater => hi = pivot,
            Ordering::Less => lo = pivot + 1,
        }
    }
}

/// Lomuto partition around the middle element; returns the pivot's final
/// position.
fn partition(items: &mut [ScoredCandidate]) -> usize {
    let last = items.len() - 1;
    items.swap(items.len() / 2, last);
    let mut store = 0;
    for index in 0..last {
        if items[index] < items[last] {
            items.swap(index, store);
            store += 1;
        }
    }
    items.swap(store, last);
    store
}

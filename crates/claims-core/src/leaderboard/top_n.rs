//! Bounded top-N structure over provider net-fee scores.
//!
//! Keeps at most `capacity` providers, each with a single current score. The
//! NPI → score map is authoritative; a min-heap over scores drives eviction
//! decisions. Updates to an existing provider do not touch the heap in place:
//! the new slot is pushed and the superseded one goes stale, to be skipped on
//! pop and swept out when the heap outgrows twice the capacity.

use parking_lot::Mutex;
use std::{
    cmp::{Ordering, Reverse},
    collections::{BinaryHeap, HashMap},
    sync::Arc,
};
use thiserror::Error;
use tracing::trace;

/// Errors that occur during leaderboard construction.
#[derive(Debug, Error)]
pub enum LeaderboardError {
    /// Invalid configuration parameter (typically zero capacity).
    #[error("Invalid leaderboard configuration: {0}")]
    InvalidConfig(String),
}

/// A provider and its current score, as returned by snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredEntry {
    pub provider_npi: Arc<str>,
    pub net_fee: f64,
}

/// Min-heap slot. Ordering is an explicit `total_cmp` on the score with the
/// NPI as tie-break, so eviction among equal scores is deterministic.
#[derive(Debug, Clone)]
struct HeapSlot {
    score: f64,
    npi: Arc<str>,
}

impl PartialEq for HeapSlot {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapSlot {}

impl PartialOrd for HeapSlot {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapSlot {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score.total_cmp(&other.score).then_with(|| self.npi.cmp(&other.npi))
    }
}

/// Bounded top-N leaderboard keyed by provider NPI.
///
/// At most one entry per provider; holds the `capacity` highest-scoring
/// providers seen since the last [`clear`](Self::clear). A push for an
/// existing provider replaces its score (last write wins); a push for a new
/// provider at capacity must strictly beat the current minimum to evict it.
///
/// All operations take `&self` and are internally synchronized with a single
/// mutex; none of them blocks on I/O.
pub struct TopNLeaderboard {
    capacity: usize,
    inner: Mutex<Inner>,
}

struct Inner {
    /// Authoritative provider → current score mapping.
    scores: HashMap<Arc<str>, f64>,
    /// Min-heap over scores. May hold stale slots after a replace.
    heap: BinaryHeap<Reverse<HeapSlot>>,
}

impl TopNLeaderboard {
    /// Creates a leaderboard holding at most `capacity` providers.
    ///
    /// # Errors
    ///
    /// Returns `LeaderboardError::InvalidConfig` if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, LeaderboardError> {
        if capacity == 0 {
            return Err(LeaderboardError::InvalidConfig(
                "capacity must be non-zero".to_string(),
            ));
        }

        Ok(Self {
            capacity,
            inner: Mutex::new(Inner { scores: HashMap::new(), heap: BinaryHeap::new() }),
        })
    }

    /// Inserts or replaces a provider's score.
    ///
    /// Total: never fails. A score for an existing provider always takes
    /// effect, even when lower than the current minimum; a score for a new
    /// provider at capacity is discarded unless strictly greater than the
    /// minimum held.
    pub fn push(&self, provider_npi: &str, score: f64) {
        trace!(provider_npi, score, "leaderboard push");
        self.inner.lock().upsert(provider_npi, score, self.capacity);
    }

    /// Adds `delta` to a provider's running sum, inserting at `delta` when
    /// the provider is not currently held.
    ///
    /// This is the ingestion path: each claim's net fee accumulates into a
    /// per-provider total, matching the store's `SUM(net_fee)` semantics for
    /// providers that stay resident.
    pub fn accumulate(&self, provider_npi: &str, delta: f64) {
        let mut inner = self.inner.lock();
        let score = inner.scores.get(provider_npi).copied().unwrap_or(0.0) + delta;
        trace!(provider_npi, score, "leaderboard accumulate");
        inner.upsert(provider_npi, score, self.capacity);
    }

    /// Returns a fresh vector of entries, descending by score with ties
    /// broken by NPI. Does not mutate the structure.
    #[must_use]
    pub fn snapshot(&self) -> Vec<ScoredEntry> {
        let inner = self.inner.lock();
        let mut entries: Vec<ScoredEntry> = inner
            .scores
            .iter()
            .map(|(npi, score)| ScoredEntry { provider_npi: Arc::clone(npi), net_fee: *score })
            .collect();
        entries.sort_by(|a, b| {
            b.net_fee.total_cmp(&a.net_fee).then_with(|| a.provider_npi.cmp(&b.provider_npi))
        });
        entries
    }

    /// True iff no provider is held. An empty leaderboard is the cache-miss
    /// sentinel for the reconciler.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().scores.is_empty()
    }

    /// Number of providers currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().scores.len()
    }

    /// Maximum number of providers held, fixed at construction.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Empties the structure. The next read through the reconciler falls
    /// back to the durable store.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.scores.clear();
        inner.heap.clear();
    }

    #[cfg(test)]
    fn heap_len(&self) -> usize {
        self.inner.lock().heap.len()
    }
}

impl Inner {
    fn upsert(&mut self, npi: &str, score: f64, capacity: usize) {
        if let Some((key, existing)) = self.scores.get_key_value(npi) {
            if existing.total_cmp(&score) == Ordering::Equal {
                return;
            }
            let key = Arc::clone(key);
            self.scores.insert(Arc::clone(&key), score);
            self.heap.push(Reverse(HeapSlot { score, npi: key }));
            self.sweep_stale(capacity);
            return;
        }

        if self.scores.len() < capacity {
            let key: Arc<str> = Arc::from(npi);
            self.scores.insert(Arc::clone(&key), score);
            self.heap.push(Reverse(HeapSlot { score, npi: key }));
            return;
        }

        // At capacity: the newcomer must strictly beat the current minimum.
        let Some(min) = self.current_min() else { return };
        if score.total_cmp(&min.score) != Ordering::Greater {
            return;
        }

        self.heap.pop();
        self.scores.remove(min.npi.as_ref());
        let key: Arc<str> = Arc::from(npi);
        self.scores.insert(Arc::clone(&key), score);
        self.heap.push(Reverse(HeapSlot { score, npi: key }));
    }

    /// Peeks the heap minimum that still reflects the map, discarding stale
    /// slots on the way down.
    fn current_min(&mut self) -> Option<HeapSlot> {
        loop {
            let slot = self.heap.peek()?.0.clone();
            match self.scores.get(slot.npi.as_ref()) {
                Some(current) if current.total_cmp(&slot.score) == Ordering::Equal => {
                    return Some(slot);
                }
                _ => {
                    self.heap.pop();
                }
            }
        }
    }

    /// Rebuilds the heap from the map once stale slots dominate it.
    fn sweep_stale(&mut self, capacity: usize) {
        if self.heap.len() <= capacity.saturating_mul(2) {
            return;
        }
        self.heap = self
            .scores
            .iter()
            .map(|(npi, score)| Reverse(HeapSlot { score: *score, npi: Arc::clone(npi) }))
            .collect();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn entries(board: &TopNLeaderboard) -> Vec<(String, f64)> {
        board
            .snapshot()
            .into_iter()
            .map(|e| (e.provider_npi.to_string(), e.net_fee))
            .collect()
    }

    #[test]
    fn rejects_zero_capacity() {
        assert!(matches!(
            TopNLeaderboard::new(0),
            Err(LeaderboardError::InvalidConfig(_))
        ));
    }

    #[test]
    fn empty_until_first_push() {
        let board = TopNLeaderboard::new(3).unwrap();
        assert!(board.is_empty());
        assert_eq!(board.len(), 0);

        board.push("1111111111", 10.0);
        assert!(!board.is_empty());
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn snapshot_is_sorted_descending_and_bounded() {
        let board = TopNLeaderboard::new(3).unwrap();
        for (npi, score) in
            [("1000000001", 5.0), ("1000000002", 9.0), ("1000000003", 1.0), ("1000000004", 7.0)]
        {
            board.push(npi, score);
            let snapshot = board.snapshot();
            assert!(snapshot.len() <= 3);
            assert!(snapshot.windows(2).all(|w| w[0].net_fee >= w[1].net_fee));
        }
        assert_eq!(board.len(), 3);
    }

    #[test]
    fn evicts_minimum_when_full() {
        let board = TopNLeaderboard::new(2).unwrap();
        board.push("A", 100.0);
        board.push("B", 50.0);
        board.push("C", 75.0);

        assert_eq!(entries(&board), vec![("A".to_string(), 100.0), ("C".to_string(), 75.0)]);
    }

    #[test]
    fn low_score_is_noop_when_full() {
        let board = TopNLeaderboard::new(2).unwrap();
        board.push("A", 100.0);
        board.push("B", 50.0);
        board.push("C", 25.0);

        assert_eq!(entries(&board), vec![("A".to_string(), 100.0), ("B".to_string(), 50.0)]);
    }

    #[test]
    fn equal_score_does_not_evict() {
        let board = TopNLeaderboard::new(2).unwrap();
        board.push("A", 100.0);
        board.push("B", 50.0);
        board.push("C", 50.0);

        assert_eq!(entries(&board), vec![("A".to_string(), 100.0), ("B".to_string(), 50.0)]);
    }

    #[test]
    fn push_replaces_existing_score() {
        let board = TopNLeaderboard::new(2).unwrap();
        board.push("A", 100.0);
        board.push("A", 200.0);

        assert_eq!(entries(&board), vec![("A".to_string(), 200.0)]);
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn replace_downward_exposes_entry_to_eviction() {
        let board = TopNLeaderboard::new(2).unwrap();
        board.push("A", 100.0);
        board.push("C", 75.0);

        // A's stale 100.0 slot must not shield it from eviction.
        board.push("A", 10.0);
        board.push("B", 50.0);

        assert_eq!(entries(&board), vec![("C".to_string(), 75.0), ("B".to_string(), 50.0)]);
    }

    #[test]
    fn accumulate_builds_running_sums() {
        let board = TopNLeaderboard::new(2).unwrap();
        board.accumulate("A", 100.0);
        board.accumulate("A", 200.0);
        board.accumulate("B", 40.0);

        assert_eq!(entries(&board), vec![("A".to_string(), 300.0), ("B".to_string(), 40.0)]);
    }

    #[test]
    fn snapshot_is_idempotent() {
        let board = TopNLeaderboard::new(3).unwrap();
        board.push("1000000001", 5.0);
        board.push("1000000002", 9.0);

        assert_eq!(board.snapshot(), board.snapshot());
    }

    #[test]
    fn clear_resets_to_empty() {
        let board = TopNLeaderboard::new(2).unwrap();
        board.push("A", 100.0);
        board.clear();

        assert!(board.is_empty());
        assert!(board.snapshot().is_empty());

        // Reusable after a reset.
        board.push("B", 1.0);
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn heap_stays_bounded_under_repeated_replacement() {
        let board = TopNLeaderboard::new(4).unwrap();
        for i in 0..100 {
            board.accumulate("A", f64::from(i));
            board.accumulate("B", 1.0);
        }

        assert!(board.heap_len() <= 10, "heap grew unbounded: {}", board.heap_len());
        assert_eq!(board.len(), 2);
    }

    #[test]
    fn ties_in_snapshot_are_ordered_by_npi() {
        let board = TopNLeaderboard::new(3).unwrap();
        board.push("2000000000", 5.0);
        board.push("1000000000", 5.0);

        let snapshot = entries(&board);
        assert_eq!(snapshot[0].0, "1000000000");
        assert_eq!(snapshot[1].0, "2000000000");
    }

    #[test]
    fn concurrent_pushes_respect_capacity() {
        let board = std::sync::Arc::new(TopNLeaderboard::new(5).unwrap());
        let mut handles = Vec::new();
        for t in 0..4 {
            let board = std::sync::Arc::clone(&board);
            handles.push(std::thread::spawn(move || {
                for i in 0..50 {
                    board.push(&format!("{t}00000000{i:02}"), f64::from(i));
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(board.len(), 5);
        let snapshot = board.snapshot();
        assert!(snapshot.windows(2).all(|w| w[0].net_fee >= w[1].net_fee));
    }
}

//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, and evictions.

use serde::Serialize;

// == Cache Stats ==
/// Cache performance metrics.
///
/// Removal counters are disjoint: `evictions` counts only capacity overflow,
/// `expirations` only stale entries dropped by `get` or `cleanup`, and
/// `invalidations` only tag or source invalidation. Explicit deletes and
/// clears are counted by none of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Live entries at the time the snapshot was taken
    pub entries: usize,
    /// Lookups that returned data
    pub hits: u64,
    /// Lookups that found nothing or a stale entry
    pub misses: u64,
    /// hits / (hits + misses), 0.0 before the first lookup
    pub hit_rate: f64,
    /// Entries removed by LRU policy
    pub evictions: u64,
    /// Entries removed because they had expired
    pub expirations: u64,
    /// Entries removed by tag or source invalidation
    pub invalidations: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn compute_hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Snapshot ==
    /// Returns a copy with `entries` and `hit_rate` filled in.
    pub fn snapshot(&self, entries: usize) -> Self {
        Self {
            entries,
            hit_rate: self.compute_hit_rate(),
            ..self.clone()
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }

    pub fn record_invalidations(&mut self, count: usize) {
        self.invalidations += count as u64;
    }
}

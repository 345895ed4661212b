//! Cache Statistics Module
//!
//! Tracks hits, misses, evictions and expirations, and defines the
//! diagnostic snapshot returned by `stats()`.

use serde::Serialize;

// == Cache Stats ==
/// Cumulative counters since construction or the last reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key not found or expired)
    pub misses: u64,
    /// Number of entries removed by capacity eviction
    pub evictions: u64,
    /// Number of expired entries removed by a sweep or an observing read
    pub expirations: u64,
}

impl CacheStats {
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits = self.hits.saturating_add(1);
    }

    pub fn record_miss(&mut self) {
        self.misses = self.misses.saturating_add(1);
    }

    pub fn record_evictions(&mut self, count: usize) {
        self.evictions = self.evictions.saturating_add(count as u64);
    }

    pub fn record_expirations(&mut self, count: usize) {
        self.expirations = self.expirations.saturating_add(count as u64);
    }

    // == Reset ==
    /// Zeroes every counter.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// == Stats Snapshot ==
/// Point-in-time diagnostic view of one cache.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSnapshot {
    /// Entries currently stored (including expired entries not yet swept)
    pub count: usize,
    /// Configured maximum number of entries
    pub capacity: usize,
    /// Approximate bytes held by keys, values and entry metadata
    pub estimated_memory: usize,
    /// hits / (hits + misses)
    pub hit_rate: f64,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
}

impl StatsSnapshot {
    /// Builds a snapshot from the counters and the store's current shape.
    pub fn new(stats: &CacheStats, count: usize, capacity: usize, estimated_memory: usize) -> Self {
        Self {
            count,
            capacity,
            estimated_memory,
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            expirations: stats.expirations,
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.evictions, 0);
        assert_eq!(stats.expirations, 0);
    }

    #[test]
    fn test_hit_rate_no_requests() {
        assert_eq!(CacheStats::new().hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        assert_eq!(stats.hit_rate(), 0.75);
    }

    #[test]
    fn test_record_evictions_and_expirations() {
        let mut stats = CacheStats::new();
        stats.record_evictions(3);
        stats.record_expirations(2);
        stats.record_evictions(1);
        assert_eq!(stats.evictions, 4);
        assert_eq!(stats.expirations, 2);
    }

    #[test]
    fn test_reset() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_miss();
        stats.record_evictions(5);
        stats.reset();
        assert_eq!(stats, CacheStats::default());
    }

    #[test]
    fn test_snapshot_serialize() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_miss();

        let snapshot = StatsSnapshot::new(&stats, 3, 10, 512);
        assert_eq!(snapshot.hit_rate, 0.5);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["count"], 3);
        assert_eq!(json["capacity"], 10);
        assert_eq!(json["estimated_memory"], 512);
        assert_eq!(json["hit_rate"], 0.5);
    }
}

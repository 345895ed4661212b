//! Cache Entry Module
//!
//! Defines a single cache entry with expiry, recency and frequency metadata.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

// == Cache Entry ==
/// A stored value plus the metadata that drives expiry and eviction.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The cached payload
    pub value: V,
    /// Insertion timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Last successful read (Unix milliseconds)
    pub last_accessed_at: u64,
    /// Number of successful reads since the last write
    pub access_count: u64,
    /// Expiration timestamp (Unix milliseconds), always > created_at
    pub expires_at: u64,
    /// Write version, unique within the owning cache
    pub version: u64,
    /// Insertion sequence number, final eviction tie-breaker
    pub seq: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry expiring `ttl` from now.
    ///
    /// A zero TTL is raised to one millisecond so that `expires_at` is
    /// strictly after `created_at`. TTLs too long for a `u64` of
    /// milliseconds saturate instead of wrapping.
    pub fn new(value: V, ttl: Duration, version: u64, seq: u64) -> Self {
        let now = current_timestamp_ms();
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);

        Self {
            value,
            created_at: now,
            last_accessed_at: now,
            access_count: 0,
            expires_at: now.saturating_add(ttl_ms),
            version,
            seq,
        }
    }

    // == Is Expired ==
    /// Checks whether the entry has expired at `now`.
    ///
    /// Boundary condition: the entry is expired once `now >= expires_at`.
    pub fn is_expired_at(&self, now: u64) -> bool {
        now >= self.expires_at
    }

    /// Checks whether the entry has expired against the wall clock.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    // == Touch ==
    /// Records a successful read.
    pub fn touch(&mut self, now: u64) {
        self.last_accessed_at = now;
        self.access_count = self.access_count.saturating_add(1);
    }

    // == Score ==
    /// Eviction value of the entry: `access_count / (now - last_accessed_at + 1)`.
    ///
    /// Higher is more valuable. Entries never read score zero.
    pub fn score(&self, now: u64) -> f64 {
        let idle = now.saturating_sub(self.last_accessed_at);
        self.access_count as f64 / (idle as f64 + 1.0)
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, `0` once expired.
    pub fn ttl_remaining_ms(&self) -> u64 {
        self.expires_at.saturating_sub(current_timestamp_ms())
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
///
/// A clock set before the epoch reads as `0` rather than panicking.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

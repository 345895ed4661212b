//! Cache Store Module
//!
//! Main cache engine: a HashMap of entries with TTL expiry and a hybrid
//! recency/frequency eviction policy.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::cache::entry::current_timestamp_ms;
use crate::cache::{CacheEntry, CacheStats, StatsSnapshot};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};

/// Bytes charged per entry for timestamps, counters and map overhead.
pub const ENTRY_OVERHEAD_BYTES: usize = 64;

/// Bytes charged for an entry whose key or value cannot be serialized.
pub const FALLBACK_ENTRY_SIZE: usize = 1024;

// == Bounded Cache ==
/// Key-value store with time-based expiry and capacity-based eviction.
///
/// `len()` counts every stored entry, including expired entries that no sweep
/// or read has removed yet. `has()` does not count as a read: it leaves
/// recency, frequency and hit/miss counters untouched.
#[derive(Debug)]
pub struct BoundedCache<K, V> {
    /// Key-value storage
    entries: HashMap<K, CacheEntry<V>>,
    /// Performance counters
    stats: CacheStats,
    /// Capacity, TTL and eviction settings
    config: CacheConfig,
    /// Last version handed out
    version: u64,
    /// Last insertion sequence handed out
    seq: u64,
}

impl<K, V> BoundedCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    // == Constructor ==
    pub fn new(config: CacheConfig) -> Self {
        let config = config.normalized();
        Self {
            entries: HashMap::with_capacity(config.max_size),
            stats: CacheStats::new(),
            config,
            version: 0,
            seq: 0,
        }
    }

    /// Creates a cache with the given capacity and default TTL.
    pub fn with_capacity(max_size: usize, default_ttl: Duration) -> Self {
        Self::new(CacheConfig::new(max_size, default_ttl))
    }

    // == Set ==
    /// Stores a value, overwriting any existing entry for `key`.
    ///
    /// A new key arriving at capacity first evicts the lowest-value entries.
    /// Returns the version assigned to the written entry.
    pub fn set(&mut self, key: K, value: V, ttl: Option<Duration>) -> u64 {
        let now = current_timestamp_ms();

        if !self.entries.contains_key(&key) && self.entries.len() >= self.config.max_size {
            self.make_room(now);
        }

        self.version += 1;
        self.seq += 1;
        let ttl = ttl.unwrap_or(self.config.default_ttl);
        self.entries
            .insert(key, CacheEntry::new(value, ttl, self.version, self.seq));

        self.version
    }

    // == Get ==
    /// Returns the value if present and not expired, recording a hit or miss.
    pub fn get<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_versioned(key).map(|(value, _)| value)
    }

    /// Like [`get`](Self::get), also returning the entry's version for use
    /// with [`compare_and_set`](Self::compare_and_set).
    pub fn get_versioned<Q>(&mut self, key: &Q) -> Option<(V, u64)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = current_timestamp_ms();
        match self.live_entry_mut(key, now) {
            Some(entry) => {
                entry.touch(now);
                let found = (entry.value.clone(), entry.version);
                self.stats.record_hit();
                Some(found)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Has ==
    /// Returns whether a live entry exists, without counting it as a read.
    pub fn has<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = current_timestamp_ms();
        self.live_entry_mut(key, now).is_some()
    }

    // == Delete ==
    /// Removes an entry, returning whether one was stored.
    pub fn delete<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.remove(key).is_some()
    }

    // == Clear ==
    /// Removes every entry. Counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    // == Compare And Set ==
    /// Writes `value` only if the live entry's version equals `expected`.
    ///
    /// `expected = None` requires the key to be absent (or expired). On
    /// success the new version is returned.
    pub fn compare_and_set(
        &mut self,
        key: K,
        expected: Option<u64>,
        value: V,
        ttl: Option<Duration>,
    ) -> Result<u64>
    where
        K: Debug,
    {
        let now = current_timestamp_ms();
        let actual = self.live_entry_mut(&key, now).map(|entry| entry.version);

        if actual != expected {
            return Err(CacheError::VersionConflict {
                key: format!("{key:?}"),
                expected,
                actual,
            });
        }

        Ok(self.set(key, value, ttl))
    }

    // == Purge Expired ==
    /// Removes all expired entries, returning how many were removed.
    pub fn purge_expired(&mut self) -> usize {
        self.purge_expired_at(current_timestamp_ms())
    }

    // == Length ==
    /// Number of stored entries, including expired entries not yet removed.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Number of stored entries that have not expired.
    pub fn live_len(&self) -> usize {
        let now = current_timestamp_ms();
        self.entries
            .values()
            .filter(|entry| !entry.is_expired_at(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.config.max_size
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Snapshot of the stored keys, in no particular order.
    pub fn keys(&self) -> Vec<K> {
        self.entries.keys().cloned().collect()
    }

    /// Cumulative counters since construction or the last reset.
    pub fn counters(&self) -> CacheStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    // == Internals ==
    /// Returns the entry for `key` if it is live. An expired entry found
    /// here is removed on the spot.
    fn live_entry_mut<Q>(&mut self, key: &Q, now: u64) -> Option<&mut CacheEntry<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let expired = self.entries.get(key)?.is_expired_at(now);
        if expired {
            self.entries.remove(key);
            self.stats.record_expirations(1);
            return None;
        }
        self.entries.get_mut(key)
    }

    fn purge_expired_at(&mut self, now: u64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));
        let removed = before - self.entries.len();
        self.stats.record_expirations(removed);
        removed
    }

    /// Frees at least one slot for an incoming key.
    ///
    /// Expired entries go first. If the cache is still full, the entries with
    /// the lowest score are evicted, ties going to the oldest insertion.
    fn make_room(&mut self, now: u64) {
        self.purge_expired_at(now);
        if self.entries.len() < self.config.max_size {
            return;
        }

        let needed = self.entries.len() + 1 - self.config.max_size;
        let batch = self.config.eviction_batch().max(needed).min(self.entries.len());

        let mut candidates: Vec<(f64, u64, u64, &K)> = self
            .entries
            .iter()
            .map(|(key, entry)| (entry.score(now), entry.created_at, entry.seq, key))
            .collect();
        candidates.sort_by(|a, b| {
            a.0.total_cmp(&b.0)
                .then(a.1.cmp(&b.1))
                .then(a.2.cmp(&b.2))
        });
        let victims: Vec<K> = candidates
            .into_iter()
            .take(batch)
            .map(|(_, _, _, key)| key.clone())
            .collect();

        for key in &victims {
            self.entries.remove(key);
        }
        self.stats.record_evictions(victims.len());
        debug!(evicted = victims.len(), capacity = self.config.max_size, "capacity eviction");
    }
}

impl<K, V> BoundedCache<K, V>
where
    K: Eq + Hash + Clone + AsRef<str>,
    V: Clone,
{
    // == Invalidate Matching ==
    /// Removes every entry whose key contains `tag`, returning the count.
    ///
    /// An empty tag matches nothing.
    pub fn invalidate_matching(&mut self, tag: &str) -> usize {
        if tag.is_empty() {
            return 0;
        }
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.as_ref().contains(tag));
        before - self.entries.len()
    }
}

impl<K, V> BoundedCache<K, V>
where
    K: Eq + Hash + Clone + Serialize,
    V: Clone + Serialize,
{
    // == Stats ==
    /// Returns a diagnostic snapshot of the cache.
    pub fn stats(&self) -> StatsSnapshot {
        StatsSnapshot::new(
            &self.stats,
            self.entries.len(),
            self.config.max_size,
            self.estimated_memory(),
        )
    }

    /// Approximate bytes held, from the serialized size of keys and values.
    pub fn estimated_memory(&self) -> usize {
        self.entries
            .iter()
            .map(|(key, entry)| estimate_entry_size(key, &entry.value))
            .sum()
    }
}

fn estimate_entry_size<K: Serialize, V: Serialize>(key: &K, value: &V) -> usize {
    match (serde_json::to_vec(key), serde_json::to_vec(value)) {
        (Ok(key), Ok(value)) => key.len() + value.len() + ENTRY_OVERHEAD_BYTES,
        (Err(err), _) | (_, Err(err)) => {
            debug!(error = %err, "size estimate fell back to constant");
            FALLBACK_ENTRY_SIZE
        }
    }
}

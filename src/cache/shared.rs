//! Shared Cache Module
//!
//! Cloneable handle that lets many request handlers use one cache instance.
//! Every operation holds the lock for its whole duration, so single calls
//! are atomic with respect to each other. Composite sequences must go
//! through [`SharedCache::update`] or [`SharedCache::compare_and_set`].

use std::borrow::Borrow;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::cache::{BoundedCache, CacheStats, StatsSnapshot};
use crate::config::CacheConfig;
use crate::error::Result;

// == Shared Cache ==
/// Thread-safe handle to a [`BoundedCache`].
#[derive(Debug)]
pub struct SharedCache<K, V> {
    inner: Arc<RwLock<BoundedCache<K, V>>>,
}

impl<K, V> Clone for SharedCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> SharedCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(config: CacheConfig) -> Self {
        Self::from_store(BoundedCache::new(config))
    }

    pub fn from_store(store: BoundedCache<K, V>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    pub async fn set(&self, key: K, value: V, ttl: Option<Duration>) -> u64 {
        self.inner.write().await.set(key, value, ttl)
    }

    // Reads take the write lock: a hit updates recency and counters.
    pub async fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.write().await.get(key)
    }

    pub async fn get_versioned<Q>(&self, key: &Q) -> Option<(V, u64)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.write().await.get_versioned(key)
    }

    pub async fn has<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.write().await.has(key)
    }

    pub async fn delete<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.write().await.delete(key)
    }

    pub async fn clear(&self) {
        self.inner.write().await.clear();
    }

    pub async fn compare_and_set(
        &self,
        key: K,
        expected: Option<u64>,
        value: V,
        ttl: Option<Duration>,
    ) -> Result<u64>
    where
        K: Debug,
    {
        self.inner
            .write()
            .await
            .compare_and_set(key, expected, value, ttl)
    }

    pub async fn purge_expired(&self) -> usize {
        self.inner.write().await.purge_expired()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn live_len(&self) -> usize {
        self.inner.read().await.live_len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    pub async fn keys(&self) -> Vec<K> {
        self.inner.read().await.keys()
    }

    pub async fn counters(&self) -> CacheStats {
        self.inner.read().await.counters()
    }

    pub async fn reset_stats(&self) {
        self.inner.write().await.reset_stats();
    }

    pub async fn config(&self) -> CacheConfig {
        self.inner.read().await.config().clone()
    }

    // == Read Through ==
    /// Returns the cached value for `key`, or awaits `fetch` and caches an
    /// `Ok` result. Errors pass through and nothing is cached.
    ///
    /// The lock is not held while `fetch` runs, so concurrent misses on the
    /// same key may each fetch.
    pub async fn get_or_try_insert_with<F, Fut, E>(
        &self,
        key: K,
        ttl: Option<Duration>,
        fetch: F,
    ) -> std::result::Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<V, E>>,
    {
        if let Some(value) = self.get(&key).await {
            return Ok(value);
        }

        let value = fetch().await?;
        self.set(key, value.clone(), ttl).await;
        Ok(value)
    }

    // == Update ==
    /// Runs `f` against the store under a single write lock.
    ///
    /// Use this for read-then-write sequences that must not interleave with
    /// other writers.
    pub async fn update<R>(&self, f: impl FnOnce(&mut BoundedCache<K, V>) -> R) -> R {
        let mut guard = self.inner.write().await;
        f(&mut *guard)
    }
}

impl<K, V> SharedCache<K, V>
where
    K: Eq + Hash + Clone + AsRef<str>,
    V: Clone,
{
    pub async fn invalidate_matching(&self, tag: &str) -> usize {
        self.inner.write().await.invalidate_matching(tag)
    }
}

impl<K, V> SharedCache<K, V>
where
    K: Eq + Hash + Clone + Serialize,
    V: Clone + Serialize,
{
    pub async fn stats(&self) -> StatsSnapshot {
        self.inner.read().await.stats()
    }
}

//! Memoization over a shared cache.
//!
//! `memoize(f, key_fn, cache)` wraps an async fallible function so that
//! repeated calls with equivalent arguments are served from the cache.

use std::future::Future;
use std::hash::Hash;
use std::time::Duration;

use crate::cache::SharedCache;

/// An async function whose successful results are cached.
///
/// Errors are returned to the caller and never cached. Two concurrent calls
/// that both miss will both run `f`; the later write wins.
pub struct Memoized<F, KF, K, V> {
    f: F,
    key_fn: KF,
    cache: SharedCache<K, V>,
    ttl: Option<Duration>,
}

/// Wraps `f` so that results are cached under `key_fn(&args)`.
pub fn memoize<A, K, V, E, F, Fut, KF>(f: F, key_fn: KF, cache: SharedCache<K, V>) -> Memoized<F, KF, K, V>
where
    F: Fn(A) -> Fut,
    Fut: Future<Output = Result<V, E>>,
    KF: Fn(&A) -> K,
{
    Memoized {
        f,
        key_fn,
        cache,
        ttl: None,
    }
}

impl<F, KF, K, V> Memoized<F, KF, K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Caches results for `ttl` instead of the cache's default TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub async fn call<A, E, Fut>(&self, args: A) -> Result<V, E>
    where
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<V, E>>,
        KF: Fn(&A) -> K,
    {
        let key = (self.key_fn)(&args);
        self.cache
            .get_or_try_insert_with(key, self.ttl, || (self.f)(args))
            .await
    }

    /// Drops the cached result for `args`, returning whether one existed.
    pub async fn invalidate<A>(&self, args: &A) -> bool
    where
        KF: Fn(&A) -> K,
    {
        let key = (self.key_fn)(args);
        self.cache.delete(&key).await
    }

    pub fn cache(&self) -> &SharedCache<K, V> {
        &self.cache
    }
}

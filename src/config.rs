//! Configuration Module
//!
//! `CacheConfig` is the constructor surface of a single cache. `Config` is the
//! application-level configuration loaded from environment variables by the
//! admin server binary.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Construction parameters for one bounded expiring cache.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// Maximum number of stored entries (clamped to at least 1)
    pub max_size: usize,
    /// TTL applied when `set` is called without one
    pub default_ttl: Duration,
    /// Interval between background sweeps (clamped to at most `default_ttl`)
    pub sweep_interval: Duration,
    /// Fraction of `max_size` removed per capacity eviction (at least one entry)
    pub eviction_fraction: f64,
}

impl CacheConfig {
    pub fn new(max_size: usize, default_ttl: Duration) -> Self {
        Self {
            max_size,
            default_ttl,
            ..Self::default()
        }
        .normalized()
    }

    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self.normalized()
    }

    pub fn with_eviction_fraction(mut self, fraction: f64) -> Self {
        self.eviction_fraction = fraction;
        self.normalized()
    }

    /// Applies the clamping rules so every field is usable as-is.
    pub fn normalized(mut self) -> Self {
        self.max_size = self.max_size.max(1);
        if self.default_ttl.is_zero() {
            self.default_ttl = Duration::from_millis(1);
        }
        if self.sweep_interval.is_zero() || self.sweep_interval > self.default_ttl {
            self.sweep_interval = self.default_ttl;
        }
        if !self.eviction_fraction.is_finite() {
            self.eviction_fraction = 0.0;
        }
        self.eviction_fraction = self.eviction_fraction.clamp(0.0, 1.0);
        self
    }

    /// Number of entries one capacity eviction removes.
    pub fn eviction_batch(&self) -> usize {
        ((self.max_size as f64 * self.eviction_fraction).floor() as usize).max(1)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: 500,
            default_ttl: Duration::from_secs(300),
            sweep_interval: Duration::from_secs(60),
            eviction_fraction: 0.1,
        }
    }
}

/// Application configuration for the storefront caches and the admin server.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP port of the admin/diagnostics server
    pub server_port: u16,
    /// Recommendation list cache
    pub recommendations: CacheConfig,
    /// API response cache, keyed by request fingerprint
    pub api_responses: CacheConfig,
    /// Graph query result cache
    pub graph_queries: CacheConfig,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - Admin server port (default: 3000)
    /// - `CACHE_EVICTION_FRACTION` - Batch eviction fraction for all caches (default: 0.1)
    /// - `RECOMMENDATION_CACHE_MAX_SIZE` / `_TTL_MS` / `_SWEEP_MS` (default: 500 / 600000 / 60000)
    /// - `API_RESPONSE_CACHE_MAX_SIZE` / `_TTL_MS` / `_SWEEP_MS` (default: 1000 / 60000 / 30000)
    /// - `GRAPH_QUERY_CACHE_MAX_SIZE` / `_TTL_MS` / `_SWEEP_MS` (default: 200 / 300000 / 60000)
    ///
    /// Values that fail to parse fall back to their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let fraction = env_or("CACHE_EVICTION_FRACTION", 0.1);

        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            recommendations: cache_from_env("RECOMMENDATION", &defaults.recommendations, fraction),
            api_responses: cache_from_env("API_RESPONSE", &defaults.api_responses, fraction),
            graph_queries: cache_from_env("GRAPH_QUERY", &defaults.graph_queries, fraction),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            recommendations: CacheConfig::new(500, Duration::from_secs(600))
                .with_sweep_interval(Duration::from_secs(60)),
            api_responses: CacheConfig::new(1000, Duration::from_secs(60))
                .with_sweep_interval(Duration::from_secs(30)),
            graph_queries: CacheConfig::new(200, Duration::from_secs(300))
                .with_sweep_interval(Duration::from_secs(60)),
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn cache_from_env(prefix: &str, defaults: &CacheConfig, fraction: f64) -> CacheConfig {
    let default_ttl_ms = defaults.default_ttl.as_millis() as u64;
    let default_sweep_ms = defaults.sweep_interval.as_millis() as u64;

    CacheConfig {
        max_size: env_or(&format!("{prefix}_CACHE_MAX_SIZE"), defaults.max_size),
        default_ttl: Duration::from_millis(env_or(&format!("{prefix}_CACHE_TTL_MS"), default_ttl_ms)),
        sweep_interval: Duration::from_millis(env_or(
            &format!("{prefix}_CACHE_SWEEP_MS"),
            default_sweep_ms,
        )),
        eviction_fraction: fraction,
    }
    .normalized()
}

//! Storefront Cache Registry
//!
//! Composition root for the storefront's caches. The application builds one
//! `StorefrontCaches` at startup, hands it to whatever needs caching, and
//! calls `shutdown()` on exit to stop every sweeper.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::info;

use crate::cache::{
    category_tag, graph_query_key, product_tag, request_fingerprint, GraphQueryKind,
    RecommendationCache, SharedCache, StatsSnapshot,
};
use crate::config::Config;
use crate::error::CacheError;
use crate::tasks::{spawn_sweep_task, SweepHandle};

/// Names of the caches owned by [`StorefrontCaches`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheName {
    Recommendations,
    ApiResponses,
    GraphQueries,
}

impl CacheName {
    pub const ALL: [CacheName; 3] = [
        CacheName::Recommendations,
        CacheName::ApiResponses,
        CacheName::GraphQueries,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CacheName::Recommendations => "recommendations",
            CacheName::ApiResponses => "api_responses",
            CacheName::GraphQueries => "graph_queries",
        }
    }
}

impl fmt::Display for CacheName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CacheName {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CacheName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| CacheError::UnknownCache(s.to_string()))
    }
}

// == Storefront Caches ==
/// The storefront's caches and their sweepers.
#[derive(Debug)]
pub struct StorefrontCaches {
    /// Scored product lists per shopper and page context
    pub recommendations: RecommendationCache,
    /// Upstream API responses keyed by request fingerprint
    pub api_responses: SharedCache<String, Value>,
    /// Graph database query results keyed by (kind, entity, limit)
    pub graph_queries: SharedCache<String, Value>,
    sweepers: Mutex<Vec<SweepHandle>>,
}

impl StorefrontCaches {
    /// Builds every cache from `config` and starts one sweeper per cache.
    ///
    /// Must be called from within a tokio runtime.
    pub fn init(config: &Config) -> Self {
        let recommendations = RecommendationCache::new(config.recommendations.clone());
        let api_responses = SharedCache::new(config.api_responses.clone());
        let graph_queries = SharedCache::new(config.graph_queries.clone());

        let sweepers = vec![
            spawn_sweep_task(
                CacheName::Recommendations.as_str(),
                recommendations.shared().clone(),
                config.recommendations.sweep_interval,
            ),
            spawn_sweep_task(
                CacheName::ApiResponses.as_str(),
                api_responses.clone(),
                config.api_responses.sweep_interval,
            ),
            spawn_sweep_task(
                CacheName::GraphQueries.as_str(),
                graph_queries.clone(),
                config.graph_queries.sweep_interval,
            ),
        ];
        info!(caches = sweepers.len(), "Storefront caches initialized");

        Self {
            recommendations,
            api_responses,
            graph_queries,
            sweepers: Mutex::new(sweepers),
        }
    }

    // == Read-Through Helpers ==
    /// Serves an API response from cache, or fetches and caches it.
    pub async fn api_response<I, N, V, F, Fut, E>(
        &self,
        method: &str,
        path: &str,
        query: I,
        fetch: F,
    ) -> Result<Value, E>
    where
        I: IntoIterator<Item = (N, V)>,
        N: AsRef<str>,
        V: AsRef<str>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, E>>,
    {
        let key = request_fingerprint(method, path, query);
        self.api_responses.get_or_try_insert_with(key, None, fetch).await
    }

    /// Serves a graph query result from cache, or runs the query and caches it.
    pub async fn graph_query<F, Fut, E>(
        &self,
        kind: GraphQueryKind,
        entity_id: &str,
        limit: usize,
        fetch: F,
    ) -> Result<Value, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, E>>,
    {
        let key = graph_query_key(kind, entity_id, limit);
        self.graph_queries.get_or_try_insert_with(key, None, fetch).await
    }

    // == Admin Operations ==
    pub async fn stats(&self) -> BTreeMap<CacheName, StatsSnapshot> {
        let mut stats = BTreeMap::new();
        stats.insert(CacheName::Recommendations, self.recommendations.stats().await);
        stats.insert(CacheName::ApiResponses, self.api_responses.stats().await);
        stats.insert(CacheName::GraphQueries, self.graph_queries.stats().await);
        stats
    }

    pub async fn clear(&self, name: CacheName) {
        match name {
            CacheName::Recommendations => self.recommendations.clear().await,
            CacheName::ApiResponses => self.api_responses.clear().await,
            CacheName::GraphQueries => self.graph_queries.clear().await,
        }
        info!(cache = %name, "Cache cleared");
    }

    /// Removes entries whose key contains `tag` from every cache.
    ///
    /// `tag` is matched against the raw key text, where `\`, `|`, `,` and
    /// `:` inside values appear escaped. Use [`Self::invalidate_product`] or
    /// [`Self::invalidate_category`] to match an id or category as given.
    pub async fn invalidate(&self, tag: &str) -> usize {
        let removed = self.recommendations.invalidate_matching(tag).await
            + self.api_responses.invalidate_matching(tag).await
            + self.graph_queries.invalidate_matching(tag).await;
        info!(tag, removed, "Invalidated matching entries");
        removed
    }

    /// Removes entries mentioning product `id` from every cache.
    pub async fn invalidate_product(&self, id: &str) -> usize {
        self.invalidate(&product_tag(id)).await
    }

    /// Removes entries mentioning `category` from every cache.
    pub async fn invalidate_category(&self, category: &str) -> usize {
        self.invalidate(&category_tag(category)).await
    }

    /// Runs an expiry sweep on every cache now.
    pub async fn sweep(&self) -> usize {
        self.recommendations.shared().purge_expired().await
            + self.api_responses.purge_expired().await
            + self.graph_queries.purge_expired().await
    }

    // == Shutdown ==
    /// Stops every sweeper and waits for each to exit. Safe to call twice.
    pub async fn shutdown(&self) {
        let sweepers: Vec<SweepHandle> = self.sweepers.lock().await.drain(..).collect();
        for sweeper in sweepers {
            sweeper.stop().await;
        }
        info!("Storefront caches shut down");
    }

    pub async fn running_sweepers(&self) -> usize {
        self.sweepers
            .lock()
            .await
            .iter()
            .filter(|sweeper| !sweeper.is_finished())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    use crate::cache::{RecommendationContext, ScoredProduct, UserProfile};

    #[test]
    fn test_cache_name_parse() {
        assert_eq!("graph_queries".parse::<CacheName>().unwrap(), CacheName::GraphQueries);
        assert_eq!(
            "sessions".parse::<CacheName>(),
            Err(CacheError::UnknownCache("sessions".to_string()))
        );
        assert_eq!(CacheName::ApiResponses.to_string(), "api_responses");
    }

    fn fast_sweep_config() -> Config {
        let sweep = Duration::from_millis(10);
        let config = Config::default();
        Config {
            recommendations: config.recommendations.clone().with_sweep_interval(sweep),
            api_responses: config.api_responses.clone().with_sweep_interval(sweep),
            graph_queries: config.graph_queries.clone().with_sweep_interval(sweep),
            ..config
        }
    }

    #[tokio::test]
    async fn test_init_and_shutdown() {
        let caches = StorefrontCaches::init(&fast_sweep_config());
        assert_eq!(caches.running_sweepers().await, 3);

        // Sweepers are live: an expired entry disappears without any read
        caches
            .graph_queries
            .set("graph|stale".to_string(), json!(1), Some(Duration::from_millis(1)))
            .await;
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(caches.graph_queries.len().await, 0);

        caches.shutdown().await;

        // Sweepers are gone: the next expired entry stays until observed
        caches
            .graph_queries
            .set("graph|stale".to_string(), json!(1), Some(Duration::from_millis(1)))
            .await;
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(caches.graph_queries.len().await, 1);

        caches.shutdown().await;
    }

    #[tokio::test]
    async fn test_invalidate_product_matches_escaped_ids() {
        let caches = StorefrontCaches::init(&Config::default());
        caches
            .graph_queries
            .set(graph_query_key(GraphQueryKind::AlsoViewed, "sku,9", 5), json!([]), None)
            .await;
        caches
            .graph_queries
            .set(graph_query_key(GraphQueryKind::AlsoViewed, "sku-9", 5), json!([]), None)
            .await;

        // The raw id never appears in a key, only its escaped form does
        assert_eq!(caches.invalidate("sku,9").await, 0);
        assert_eq!(caches.invalidate_product("sku,9").await, 1);
        assert_eq!(caches.graph_queries.len().await, 1);

        caches
            .api_responses
            .set(request_fingerprint("GET", "/c", [("cat", "shoes:kids")]), json!({}), None)
            .await;
        assert_eq!(caches.invalidate_category("shoes:kids").await, 1);

        caches.shutdown().await;
    }

    #[tokio::test]
    async fn test_read_through_helpers() {
        let caches = StorefrontCaches::init(&Config::default());

        let first = caches
            .api_response("GET", "/products", [("page", "1")], || async {
                Ok::<_, String>(json!({"items": ["p1"]}))
            })
            .await
            .unwrap();
        let second = caches
            .api_response("get", "/products", [("page", "1")], || async {
                Err::<Value, _>("upstream should not be called".to_string())
            })
            .await
            .unwrap();
        assert_eq!(first, second);

        let related = caches
            .graph_query(GraphQueryKind::FrequentlyBoughtTogether, "p1", 5, || async {
                Ok::<_, String>(json!(["p2", "p3"]))
            })
            .await
            .unwrap();
        assert_eq!(related, json!(["p2", "p3"]));

        let stats = caches.stats().await;
        assert_eq!(stats[&CacheName::ApiResponses].count, 1);
        assert_eq!(stats[&CacheName::ApiResponses].hits, 1);
        assert_eq!(stats[&CacheName::GraphQueries].count, 1);
        assert_eq!(stats[&CacheName::Recommendations].count, 0);

        caches.shutdown().await;
    }

    #[tokio::test]
    async fn test_invalidate_across_caches_and_clear() {
        let caches = StorefrontCaches::init(&Config::default());
        let context = RecommendationContext {
            current_product: Some("p1".to_string()),
            ..Default::default()
        };
        let params = json!({});

        caches
            .recommendations
            .set(
                &UserProfile::default(),
                &context,
                params.as_object().unwrap(),
                vec![ScoredProduct::new("p2", 0.7, "similar_products")],
                None,
            )
            .await;
        caches
            .graph_queries
            .set(graph_query_key(GraphQueryKind::SimilarProducts, "p1", 5), json!([]), None)
            .await;
        caches
            .api_responses
            .set(request_fingerprint("GET", "/cart", Vec::<(String, String)>::new()), json!({}), None)
            .await;

        assert_eq!(caches.invalidate("p1").await, 2);

        caches.clear(CacheName::ApiResponses).await;
        assert_eq!(caches.api_responses.len().await, 0);

        caches.shutdown().await;
    }

    #[tokio::test]
    async fn test_sweep_all() {
        let caches = StorefrontCaches::init(&Config::default());
        caches
            .api_responses
            .set("api|stale".to_string(), json!(1), Some(Duration::from_millis(20)))
            .await;
        caches
            .graph_queries
            .set("graph|stale".to_string(), json!(1), Some(Duration::from_millis(20)))
            .await;

        tokio::time::sleep(Duration::from_millis(40)).await;

        assert_eq!(caches.sweep().await, 2);
        caches.shutdown().await;
    }
}

//! Cache Key Module
//!
//! Deterministic string keys for structured lookups. Fragments are appended
//! as `|tag:value` in a fixed order, absent fields are skipped, id lists and
//! free-form parameters are sorted, so structurally equal inputs always
//! produce the same key.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Prefix of recommendation keys.
pub const RECOMMENDATION_PREFIX: &str = "rec";
/// Prefix of API response keys.
pub const API_PREFIX: &str = "api";
/// Prefix of graph query keys.
pub const GRAPH_PREFIX: &str = "graph";

// == Key Builder ==
/// Accumulates tagged fragments into a cache key.
#[derive(Debug, Clone)]
pub struct KeyBuilder {
    key: String,
}

impl KeyBuilder {
    pub fn new(prefix: &str) -> Self {
        Self {
            key: escape(prefix),
        }
    }

    /// Appends `tag:value` unless the value is absent or empty.
    pub fn field(mut self, tag: &str, value: Option<&str>) -> Self {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.push(tag, &escape(value));
        }
        self
    }

    /// Appends a displayable value unless absent.
    pub fn value<T: fmt::Display>(self, tag: &str, value: Option<T>) -> Self {
        let rendered = value.map(|v| v.to_string());
        self.field(tag, rendered.as_deref())
    }

    /// Appends a sorted, de-duplicated id list unless it is empty.
    pub fn ids<I, S>(mut self, tag: &str, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ids: Vec<String> = ids
            .into_iter()
            .map(|id| escape(id.as_ref()))
            .filter(|id| !id.is_empty())
            .collect();
        if ids.is_empty() {
            return self;
        }
        ids.sort_unstable();
        ids.dedup();
        self.push(tag, &ids.join(","));
        self
    }

    /// Appends free-form parameters sorted by name as `p.<name>:<json>`.
    ///
    /// Null values count as absent. Nested objects render with sorted keys.
    pub fn params<'a, I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (S, &'a Value)>,
        S: AsRef<str>,
    {
        let mut params: Vec<(String, String)> = params
            .into_iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(name, value)| (escape(name.as_ref()), escape(&value.to_string())))
            .collect();
        params.sort();
        for (name, value) in params {
            self.push(&format!("p.{name}"), &value);
        }
        self
    }

    pub fn build(self) -> String {
        self.key
    }

    fn push(&mut self, tag: &str, escaped_value: &str) {
        self.key.push('|');
        self.key.push_str(tag);
        self.key.push(':');
        self.key.push_str(escaped_value);
    }
}

/// Escapes the characters that delimit fragments and list items.
fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '|' | ',' | ':') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

// == Recommendation Inputs ==
/// Shopper attributes that shape a recommendation list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub purchase_history: Vec<String>,
    #[serde(default)]
    pub viewed_products: Vec<String>,
    #[serde(default)]
    pub preferred_categories: Vec<String>,
    #[serde(default)]
    pub price_range: Option<PriceRange>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl fmt::Display for PriceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

/// Where the shopper is when recommendations are requested.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationContext {
    #[serde(default)]
    pub current_product: Option<String>,
    #[serde(default)]
    pub current_category: Option<String>,
    #[serde(default)]
    pub cart_items: Vec<String>,
    /// Page placement, e.g. `home`, `product`, `cart`
    #[serde(default)]
    pub page: Option<String>,
}

// == Recommendation Key ==
/// Builds the cache key for a recommendation request.
///
/// Fragment order: `u`, `ph`, `vp`, `pc`, `pr`, `cp`, `cc`, `ci`, `pg`, then
/// parameters sorted by name.
pub fn recommendation_key<'a, I, S>(
    profile: &UserProfile,
    context: &RecommendationContext,
    params: I,
) -> String
where
    I: IntoIterator<Item = (S, &'a Value)>,
    S: AsRef<str>,
{
    KeyBuilder::new(RECOMMENDATION_PREFIX)
        .field("u", profile.user_id.as_deref())
        .ids("ph", &profile.purchase_history)
        .ids("vp", &profile.viewed_products)
        .ids("pc", &profile.preferred_categories)
        .value("pr", profile.price_range)
        .field("cp", context.current_product.as_deref())
        .field("cc", context.current_category.as_deref())
        .ids("ci", &context.cart_items)
        .field("pg", context.page.as_deref())
        .params(params)
        .build()
}

/// Substring that appears in every key built with `id` in any product field.
///
/// Matching is by substring, so `p1` also matches keys mentioning `p10`.
/// Over-invalidation is harmless; the entries are recomputed.
pub fn product_tag(id: &str) -> String {
    escape(id)
}

/// Substring matching keys whose current or preferred categories include `category`.
pub fn category_tag(category: &str) -> String {
    escape(category)
}

// == Request Fingerprint ==
/// Builds the cache key of an API response from method, path and query.
///
/// Query parameters are sorted by name, then value, so reordering them does
/// not change the key.
pub fn request_fingerprint<I, N, V>(method: &str, path: &str, query: I) -> String
where
    I: IntoIterator<Item = (N, V)>,
    N: AsRef<str>,
    V: AsRef<str>,
{
    let mut query: Vec<(String, String)> = query
        .into_iter()
        .map(|(name, value)| (escape(name.as_ref()), escape(value.as_ref())))
        .collect();
    query.sort();

    let method = method.to_ascii_uppercase();
    let mut builder = KeyBuilder::new(API_PREFIX)
        .field("m", Some(method.as_str()))
        .field("path", Some(path));
    for (name, value) in query {
        builder.push(&format!("q.{name}"), &value);
    }
    builder.build()
}

// == Graph Query Key ==
/// Kinds of relationship queries sent to the graph database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphQueryKind {
    SimilarProducts,
    FrequentlyBoughtTogether,
    AlsoViewed,
    CategoryAffinity,
}

impl GraphQueryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GraphQueryKind::SimilarProducts => "similar_products",
            GraphQueryKind::FrequentlyBoughtTogether => "frequently_bought_together",
            GraphQueryKind::AlsoViewed => "also_viewed",
            GraphQueryKind::CategoryAffinity => "category_affinity",
        }
    }
}

/// Builds the cache key of a graph query result.
pub fn graph_query_key(kind: GraphQueryKind, entity_id: &str, limit: usize) -> String {
    KeyBuilder::new(GRAPH_PREFIX)
        .field("k", Some(kind.as_str()))
        .field("id", Some(entity_id))
        .value("n", Some(limit))
        .build()
}

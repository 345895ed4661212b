//! Error types for the storefront caches
//!
//! Plain cache reads and writes are total and never produce these errors.
//! They come from compare-and-set conflicts and from the admin API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache layer and its admin surface.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CacheError {
    /// A compare-and-set found a different version than expected
    #[error("Version conflict on {key}: expected {expected:?}, found {actual:?}")]
    VersionConflict {
        key: String,
        expected: Option<u64>,
        actual: Option<u64>,
    },

    /// No cache is registered under the given name
    #[error("Unknown cache: {0}")]
    UnknownCache(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::VersionConflict { .. } => StatusCode::CONFLICT,
            CacheError::UnknownCache(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache layer.
pub type Result<T> = std::result::Result<T, CacheError>;

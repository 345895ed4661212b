//! Request DTOs for the admin API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

/// Request body for POST /invalidate
///
/// # Fields
/// - `tag`: raw key substring, with `\ | , :` in values written escaped;
///   every cached entry whose key contains it is removed
#[derive(Debug, Clone, Deserialize)]
pub struct InvalidateRequest {
    pub tag: String,
}

impl InvalidateRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.tag.trim().is_empty() {
            return Some("Tag cannot be empty".to_string());
        }
        None
    }
}

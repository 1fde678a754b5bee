//! Request DTOs for the cache diagnostics API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;
use serde_json::Value;

/// Maximum accepted length of an entity id, in bytes.
pub const MAX_ID_LENGTH: usize = 256;

/// Request body for storing an entity (PUT /caches/:kind)
///
/// # Fields
/// - `id`: Entity identifier; the cache key is `<kind>:<id>`
/// - `value`: Any JSON document
/// - `ttl`: Optional TTL in seconds (uses the cache default if not specified)
#[derive(Debug, Clone, Deserialize)]
pub struct SetEntryRequest {
    pub id: String,
    pub value: Value,
    #[serde(default)]
    pub ttl: Option<u64>,
}

impl SetEntryRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.id.is_empty() {
            return Some("Id cannot be empty".to_string());
        }
        if self.id.len() > MAX_ID_LENGTH {
            return Some(format!(
                "Id exceeds maximum length of {} bytes",
                MAX_ID_LENGTH
            ));
        }
        if self.ttl == Some(0) {
            return Some("TTL must be at least 1 second".to_string());
        }
        None
    }
}

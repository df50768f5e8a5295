//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

use crate::cache::{SetOptions, MAX_KEY_LENGTH};

/// Request body for the SET operation (PUT /set)
///
/// # Fields
/// - `key`: The cache key to store the value under
/// - `value`: The value to store
/// - `ttl`: Optional TTL in seconds (uses default if not specified)
/// - `priority`: Optional eviction priority, lower goes first
/// - `tags`: Optional labels for tag queries
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The cache key
    pub key: String,
    /// The value to store
    pub value: String,
    /// Optional TTL in seconds
    #[serde(default)]
    pub ttl: Option<u64>,
    /// Optional eviction priority
    #[serde(default)]
    pub priority: Option<i32>,
    /// Optional tags
    #[serde(default)]
    pub tags: Vec<String>,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        if self.key.len() > MAX_KEY_LENGTH {
            return Some(format!(
                "Key exceeds maximum length of {} characters",
                MAX_KEY_LENGTH
            ));
        }
        if self.tags.iter().any(|tag| tag.is_empty()) {
            return Some("Tags cannot be empty".to_string());
        }
        None
    }

    /// Splits the request into key, value bytes and write options.
    pub fn into_parts(self) -> (String, Vec<u8>, SetOptions) {
        let options = SetOptions {
            ttl: self.ttl,
            priority: self.priority,
            tags: self.tags,
        };
        (self.key, self.value.into_bytes(), options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_request_deserialize() {
        let json = r#"{"key": "test", "value": "hello"}"#;
        let req: SetRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.key, "test");
        assert_eq!(req.value, "hello");
        assert!(req.ttl.is_none());
        assert!(req.priority.is_none());
        assert!(req.tags.is_empty());
    }

    #[test]
    fn test_set_request_with_metadata() {
        let json = r#"{"key": "test", "value": "hello", "ttl": 60, "priority": -2, "tags": ["a", "b"]}"#;
        let req: SetRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.ttl, Some(60));

        let (key, value, options) = req.into_parts();
        assert_eq!(key, "test");
        assert_eq!(value, b"hello");
        assert_eq!(options.priority, Some(-2));
        assert_eq!(options.tags, vec!["a", "b"]);
    }

    #[test]
    fn test_validate_empty_key() {
        let req: SetRequest = serde_json::from_str(r#"{"key": "", "value": "test"}"#).unwrap();
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_validate_empty_tag() {
        let req: SetRequest =
            serde_json::from_str(r#"{"key": "k", "value": "test", "tags": [""]}"#).unwrap();
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_validate_valid_request() {
        let req: SetRequest =
            serde_json::from_str(r#"{"key": "valid_key", "value": "test", "ttl": 60}"#).unwrap();
        assert!(req.validate().is_none());
    }
}

//! The normalized error record every normalizer produces

use reqwest::StatusCode;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Original error kept for diagnostics
pub type Cause = Arc<dyn std::error::Error + Send + Sync>;

/// Canonical cross-client error record
///
/// `message` and `name` are always populated. `data` is `None` (never an
/// empty object) when no body was available or it could not be decoded.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NormalizedError<T = serde_json::Value> {
    /// HTTP status code, absent for non-HTTP failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,

    /// Human-readable status line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,

    /// Error message
    pub message: String,

    /// Error category name
    pub name: String,

    /// Decoded response payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// The original error value
    #[serde(skip)]
    #[schemars(skip)]
    pub cause: Option<Cause>,

    /// Stack trace of the original error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl<T> NormalizedError<T> {
    /// Create a record with only the mandatory fields set
    pub fn new(message: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            status_code: None,
            status_message: None,
            message: message.into(),
            name: name.into(),
            data: None,
            cause: None,
            stack: None,
        }
    }

    /// Set the status code
    pub fn with_status_code(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    /// Set the status message
    pub fn with_status_message(mut self, status_message: impl Into<String>) -> Self {
        self.status_message = Some(status_message.into());
        self
    }

    /// Set the payload
    pub fn with_data(mut self, data: T) -> Self {
        self.data = Some(data);
        self
    }

    /// Set the cause
    pub fn with_cause(mut self, cause: Cause) -> Self {
        self.cause = Some(cause);
        self
    }

    /// Status code as a typed [`StatusCode`], if it is a valid one
    pub fn status(&self) -> Option<StatusCode> {
        self.status_code.and_then(|code| StatusCode::from_u16(code).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_has_mandatory_fields_only() {
        let normalized: NormalizedError = NormalizedError::new("boom", "Error");
        assert_eq!(normalized.message, "boom");
        assert_eq!(normalized.name, "Error");
        assert!(normalized.status_code.is_none());
        assert!(normalized.data.is_none());
        assert!(normalized.cause.is_none());
        assert!(normalized.stack.is_none());
    }

    #[test]
    fn test_status() {
        let normalized: NormalizedError = NormalizedError::new("x", "Error").with_status_code(404);
        assert_eq!(normalized.status(), Some(StatusCode::NOT_FOUND));

        let normalized: NormalizedError = NormalizedError::new("x", "Error").with_status_code(0);
        assert_eq!(normalized.status(), None);
    }

    #[test]
    fn test_serialization_skips_absent_fields_and_cause() {
        let normalized = NormalizedError::new("HTTP Error 404: Not Found", "FetchError")
            .with_status_code(404)
            .with_status_message("Not Found")
            .with_data(json!({"error": "Not Found"}))
            .with_cause(Arc::new(std::io::Error::other("inner")));

        let value = serde_json::to_value(&normalized).unwrap();
        assert_eq!(
            value,
            json!({
                "status_code": 404,
                "status_message": "Not Found",
                "message": "HTTP Error 404: Not Found",
                "name": "FetchError",
                "data": {"error": "Not Found"},
            })
        );
    }

    #[test]
    fn test_schema_has_message_and_name() {
        let schema = schemars::schema_for!(NormalizedError<serde_json::Value>);
        let json = serde_json::to_string(&schema).unwrap();
        assert!(json.contains("\"message\""));
        assert!(json.contains("\"name\""));
        assert!(!json.contains("\"cause\""));
    }
}

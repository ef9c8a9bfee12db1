//! Normalizers convert a recognized error into a [`NormalizedError`]
//!
//! Design: each normalizer understands exactly one shape and fails with
//! [`TypeMismatch`] for anything else. [`UnifiedNormalizer`] resolves the
//! shape first and delegates, checking framework errors before client errors.

mod client;
mod framework;
mod response;

pub use client::{normalize_fetch_client_error, FetchClientNormalizer};
pub use framework::{normalize_framework_error, FrameworkNormalizer};
pub use response::{normalize_fetch_error, FetchResponseNormalizer};

use crate::error::TypeMismatch;
use crate::normalized::NormalizedError;
use crate::types::Thrown;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::backtrace::{Backtrace, BacktraceStatus};

/// Strategy converting an error value into a normalized record
///
/// Implement this trait to support error types from other HTTP clients.
/// Synchronous closures can be adapted with [`NormalizeFn`].
#[async_trait]
pub trait Normalizer<E: ?Sized, T>: Send + Sync {
    /// Normalize the error
    ///
    /// Called only after the paired validator accepted the value.
    async fn normalize(&self, error: &E) -> Result<NormalizedError<T>, TypeMismatch>;
}

/// Adapter turning a synchronous closure into a [`Normalizer`]
#[derive(Debug, Clone, Copy)]
pub struct NormalizeFn<F>(pub F);

#[async_trait]
impl<E, T, F> Normalizer<E, T> for NormalizeFn<F>
where
    E: ?Sized + Sync,
    T: Send + 'static,
    F: Fn(&E) -> Result<NormalizedError<T>, TypeMismatch> + Send + Sync,
{
    async fn normalize(&self, error: &E) -> Result<NormalizedError<T>, TypeMismatch> {
        (self.0)(error)
    }
}

/// Normalize a framework error or a fetch-client error
pub fn normalize_error<T: DeserializeOwned>(
    error: &Thrown,
) -> Result<NormalizedError<T>, TypeMismatch> {
    if error.as_framework_error().is_some() {
        return normalize_framework_error(error);
    }
    if error.as_fetch_client_error().is_some() {
        return normalize_fetch_client_error(error);
    }
    Err(TypeMismatch::new("FrameworkError or FetchClientError"))
}

/// Normalizer for application code: framework errors, then client errors
#[derive(Debug, Clone, Copy, Default)]
pub struct UnifiedNormalizer;

#[async_trait]
impl<T> Normalizer<Thrown, T> for UnifiedNormalizer
where
    T: DeserializeOwned + Send + 'static,
{
    async fn normalize(&self, error: &Thrown) -> Result<NormalizedError<T>, TypeMismatch> {
        normalize_error(error)
    }
}

/// Decode a client-parsed payload, dropping it if it does not fit `T`
fn decode_data<T: DeserializeOwned>(value: &serde_json::Value) -> Option<T> {
    match serde_json::from_value(value.clone()) {
        Ok(data) => Some(data),
        Err(e) => {
            tracing::debug!(error = %e, "Dropping payload that does not match data type");
            None
        }
    }
}

/// Stack trace at the current point
///
/// Captured regardless of `RUST_BACKTRACE`. `None` only on platforms where
/// backtraces are unsupported.
fn capture_stack() -> Option<String> {
    let backtrace = Backtrace::force_capture();
    match backtrace.status() {
        BacktraceStatus::Captured => Some(backtrace.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FetchClientError, FrameworkError};
    use reqwest::StatusCode;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn test_normalize_error_rejects_other_errors() {
        let err: Box<dyn std::error::Error + Send + Sync> = "Generic error".into();
        let result = normalize_error::<serde_json::Value>(&err.into());
        assert_eq!(
            result.unwrap_err().to_string(),
            "Expected FrameworkError or FetchClientError object"
        );
    }

    #[test]
    fn test_normalize_error_prefers_framework_error() {
        let error = FrameworkError::new(StatusCode::UNAUTHORIZED, "Authentication required")
            .with_status_message("Unauthorized")
            .with_data(json!({"requiresAuth": true}));
        let thrown = Thrown::from(error.clone());

        let result: NormalizedError = normalize_error(&thrown).unwrap();
        assert_eq!(result.status_code, Some(401));
        assert_eq!(result.status_message.as_deref(), Some("Unauthorized"));
        assert_eq!(result.message, "Authentication required");
        assert_eq!(result.name, "FrameworkError");
        assert_eq!(result.data, Some(json!({"requiresAuth": true})));
    }

    #[test]
    fn test_normalize_error_handles_client_error() {
        let error = FetchClientError::new("https://api.example.com", "Fetch failed")
            .with_status(500)
            .with_status_text("Internal Server Error");

        let result: NormalizedError = normalize_error(&error.into()).unwrap();
        assert_eq!(result.status_code, Some(500));
        assert_eq!(result.status_message.as_deref(), Some("Internal Server Error"));
        assert_eq!(result.message, "Fetch failed");
        assert_eq!(result.name, "FetchError");
    }

    #[test]
    fn test_normalize_error_typed_data() {
        #[derive(Debug, Deserialize)]
        struct ApiResponse {
            success: bool,
            errors: Vec<String>,
        }

        let error = FrameworkError::new(StatusCode::BAD_REQUEST, "Validation error").with_data(
            json!({"success": false, "errors": ["Invalid email", "Password too short"]}),
        );

        let result: NormalizedError<ApiResponse> = normalize_error(&error.into()).unwrap();
        let data = result.data.unwrap();
        assert!(!data.success);
        assert_eq!(data.errors.len(), 2);
    }

    #[tokio::test]
    async fn test_unified_normalizer_strategy() {
        let error = FetchClientError::new("https://api.example.com/users/1", "User fetch failed")
            .with_status(200)
            .with_data(json!({"id": 1, "name": "John Doe"}));

        let result: NormalizedError = UnifiedNormalizer
            .normalize(&Thrown::from(error))
            .await
            .unwrap();
        assert_eq!(result.data, Some(json!({"id": 1, "name": "John Doe"})));
    }

    #[tokio::test]
    async fn test_normalize_fn_adapter() {
        let normalizer = NormalizeFn(|error: &Thrown| {
            Ok::<_, TypeMismatch>(NormalizedError::<serde_json::Value>::new(
                error.to_string(),
                "Custom",
            ))
        });

        let thrown = Thrown::from(json!("oops"));
        let result = normalizer.normalize(&thrown).await.unwrap();
        assert_eq!(result.message, "\"oops\"");
        assert_eq!(result.name, "Custom");
    }
}

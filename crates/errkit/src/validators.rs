//! Validators decide whether a thrown value is an error the handler owns
//!
//! Design: validators are structural predicates over [`Thrown`]. A validator
//! that returns `Ok(false)` lets the dispatcher hand the value back
//! unchanged; a strict validator returns `Err(Rejected)` for values that are
//! not errors at all.

use crate::error::Rejected;
use crate::types::{ErrorShape, Thrown};

/// Strategy deciding whether a value should be dispatched
///
/// Any `Fn(&E) -> bool` closure is a validator.
pub trait Validator<E: ?Sized>: Send + Sync {
    /// Returns `Ok(true)` if the value should be normalized and dispatched
    fn validate(&self, error: &E) -> Result<bool, Rejected>;
}

impl<E, F> Validator<E> for F
where
    E: ?Sized,
    F: Fn(&E) -> bool + Send + Sync,
{
    fn validate(&self, error: &E) -> Result<bool, Rejected> {
        Ok(self(error))
    }
}

/// Default validator: accepts HTTP responses with an error status
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchResponseValidator;

impl Validator<Thrown> for FetchResponseValidator {
    fn validate(&self, error: &Thrown) -> Result<bool, Rejected> {
        Ok(is_fetch_error(error))
    }
}

/// Strict validator for application code
///
/// Accepts fetch-client errors, framework errors and any other error value.
/// Everything else (raw responses, non-error values) is rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictValidator;

impl Validator<Thrown> for StrictValidator {
    fn validate(&self, error: &Thrown) -> Result<bool, Rejected> {
        match error.shape() {
            ErrorShape::FetchClient | ErrorShape::Framework | ErrorShape::Error => Ok(true),
            ErrorShape::FetchResponse | ErrorShape::Unknown => Err(Rejected),
        }
    }
}

/// True if the value is an HTTP response with status >= 400
pub fn is_fetch_error(error: &Thrown) -> bool {
    error
        .as_fetch_response()
        .is_some_and(|response| response.status().as_u16() >= 400)
}

/// True if the value is an HTTP response, whatever its status
pub fn is_fetch_response(error: &Thrown) -> bool {
    error.as_fetch_response().is_some()
}

/// True if the value is an error raised by a fetch client
pub fn is_fetch_client_error(error: &Thrown) -> bool {
    error.as_fetch_client_error().is_some()
}

/// True if the value is a framework error
pub fn is_framework_error(error: &Thrown) -> bool {
    error.as_framework_error().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::FetchResponse;
    use crate::types::{FetchClientError, FrameworkError};
    use reqwest::StatusCode;
    use serde_json::json;

    fn response(status: u16) -> Thrown {
        let status = StatusCode::from_u16(status).unwrap();
        FetchResponse::builder(status).build().into()
    }

    fn plain_error(message: &str) -> Thrown {
        let err: Box<dyn std::error::Error + Send + Sync> = message.into();
        err.into()
    }

    #[test]
    fn test_is_fetch_error() {
        for status in [400, 401, 404, 418, 500, 503, 599] {
            assert!(is_fetch_error(&response(status)), "status {status}");
        }
        for status in [200, 201, 204, 301, 304, 399] {
            assert!(!is_fetch_error(&response(status)), "status {status}");
        }
        assert!(!is_fetch_error(&plain_error("test")));
        assert!(!is_fetch_error(&Thrown::from(json!({"status": 500}))));
    }

    #[test]
    fn test_default_validator() {
        let validator = FetchResponseValidator;
        assert_eq!(validator.validate(&response(404)), Ok(true));
        assert_eq!(validator.validate(&response(200)), Ok(false));
        assert_eq!(validator.validate(&plain_error("test")), Ok(false));
    }

    #[test]
    fn test_strict_validator_accepts_errors() {
        let validator = StrictValidator;
        let client = FetchClientError::new("https://api.example.com", "failed").with_status(500);
        let framework = FrameworkError::new(StatusCode::NOT_FOUND, "missing");

        assert_eq!(validator.validate(&client.into()), Ok(true));
        assert_eq!(validator.validate(&framework.into()), Ok(true));
        assert_eq!(validator.validate(&plain_error("test")), Ok(true));
    }

    #[test]
    fn test_strict_validator_rejects_non_errors() {
        let validator = StrictValidator;
        assert_eq!(validator.validate(&Thrown::from(json!("oops"))), Err(Rejected));
        assert_eq!(validator.validate(&Thrown::from(json!(42))), Err(Rejected));
        assert_eq!(validator.validate(&response(500)), Err(Rejected));
    }

    #[test]
    fn test_structural_predicates() {
        let client = Thrown::from(FetchClientError::new("https://api.example.com", "failed"));
        assert!(is_fetch_client_error(&client));
        assert!(!is_framework_error(&client));
        assert!(!is_fetch_response(&client));

        let framework = Thrown::from(FrameworkError::new(StatusCode::NOT_FOUND, "missing"));
        assert!(is_framework_error(&framework));
        assert!(!is_fetch_client_error(&framework));

        assert!(is_fetch_response(&response(200)));
        assert!(!is_fetch_response(&plain_error("test")));
    }

    #[test]
    fn test_closure_validator() {
        let validator = |error: &Thrown| matches!(error, Thrown::Value(_));
        assert_eq!(validator.validate(&Thrown::from(json!(1))), Ok(true));
        assert_eq!(validator.validate(&plain_error("test")), Ok(false));
    }
}

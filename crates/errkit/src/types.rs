//! Error shapes the built-in strategies understand
//!
//! [`Thrown`] is the closed set of values an error handler can receive.
//! [`Thrown::shape`] resolves which shape a value has, checking in a fixed
//! priority order so that a value wrapped in [`Thrown::Error`] is still
//! recognized by its concrete type.

use crate::normalized::Cause;
use crate::response::FetchResponse;
use crate::FETCH_ERROR_NAME;
use reqwest::StatusCode;
use std::sync::Arc;
use thiserror::Error;

/// Error raised by a fetch client, carrying request and response details
#[derive(Debug, Clone, Default, Error)]
#[error("{message}")]
pub struct FetchClientError {
    /// URL (or description) of the failed request
    pub request: String,
    /// Response, if one was received
    pub response: Option<FetchResponse>,
    /// Payload the client parsed from the response
    pub data: Option<serde_json::Value>,
    /// Response status
    pub status: Option<u16>,
    /// Explicit status code, preferred over `status`
    pub status_code: Option<u16>,
    /// Response status text
    pub status_text: Option<String>,
    /// Explicit status message, preferred over `status_text`
    pub status_message: Option<String>,
    /// Error message, may be empty
    pub message: String,
    /// Error name
    pub name: Option<String>,
    /// Stack trace captured where the error was raised
    pub stack: Option<String>,
}

impl FetchClientError {
    /// Create an error for a request with a message
    pub fn new(request: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            request: request.into(),
            message: message.into(),
            ..Default::default()
        }
    }

    /// Set the response status
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Set the status text
    pub fn with_status_text(mut self, text: impl Into<String>) -> Self {
        self.status_text = Some(text.into());
        self
    }

    /// Set the parsed payload
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Attach the response
    pub fn with_response(mut self, response: FetchResponse) -> Self {
        self.response = Some(response);
        self
    }

    /// Create an error from a reqwest error
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        let status = err.status();
        Self {
            request: err.url().map(|u| u.to_string()).unwrap_or_default(),
            status: status.map(|s| s.as_u16()),
            status_text: status
                .and_then(|s| s.canonical_reason())
                .map(str::to_string),
            message: err.to_string(),
            name: Some(FETCH_ERROR_NAME.to_string()),
            ..Default::default()
        }
    }
}

impl From<reqwest::Error> for FetchClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::from_reqwest(&err)
    }
}

/// Error raised by application code to signal an HTTP failure
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct FrameworkError {
    /// HTTP status code
    pub status_code: u16,
    /// Human-readable status line
    pub status_message: Option<String>,
    /// Error message
    pub message: String,
    /// Payload for the handler
    pub data: Option<serde_json::Value>,
    /// Underlying error this one wraps
    #[source]
    pub cause: Option<Cause>,
    /// Error name, defaults to `FrameworkError` when normalized
    pub name: Option<String>,
    /// Stack trace captured where the error was raised
    pub stack: Option<String>,
}

impl FrameworkError {
    /// Create an error with a status and message
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            status_message: None,
            message: message.into(),
            data: None,
            cause: None,
            name: None,
            stack: None,
        }
    }

    /// Set the status message
    pub fn with_status_message(mut self, status_message: impl Into<String>) -> Self {
        self.status_message = Some(status_message.into());
        self
    }

    /// Set the payload
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Wrap an underlying error
    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Arc::new(cause));
        self
    }
}

/// Shape of a thrown value, in resolution priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorShape {
    /// [`FrameworkError`]
    Framework,
    /// [`FetchClientError`]
    FetchClient,
    /// [`FetchResponse`]
    FetchResponse,
    /// Any other error value
    Error,
    /// Not an error at all
    Unknown,
}

/// A value handed to an error handler
#[derive(Debug, Clone, Error)]
pub enum Thrown {
    /// HTTP response
    #[error("{0}")]
    Response(FetchResponse),
    /// Error raised by a fetch client
    #[error("{0}")]
    Client(FetchClientError),
    /// Error raised by application code
    #[error("{0}")]
    Framework(FrameworkError),
    /// Any error value; known shapes are still recognized through downcasting
    #[error("{0}")]
    Error(Cause),
    /// A non-error value (a bare string, number or object)
    #[error("{0}")]
    Value(serde_json::Value),
}

impl Thrown {
    /// Wrap an arbitrary error
    pub fn error(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Thrown::Error(Arc::new(err))
    }

    /// Resolve the shape of this value
    ///
    /// Framework errors win over client errors, which win over responses.
    pub fn shape(&self) -> ErrorShape {
        if self.as_framework_error().is_some() {
            ErrorShape::Framework
        } else if self.as_fetch_client_error().is_some() {
            ErrorShape::FetchClient
        } else if self.as_fetch_response().is_some() {
            ErrorShape::FetchResponse
        } else if matches!(self, Thrown::Error(_)) {
            ErrorShape::Error
        } else {
            ErrorShape::Unknown
        }
    }

    /// This value as a framework error, looking inside wrapped errors
    pub fn as_framework_error(&self) -> Option<&FrameworkError> {
        match self {
            Thrown::Framework(err) => Some(err),
            Thrown::Error(err) => err.downcast_ref(),
            _ => None,
        }
    }

    /// This value as a fetch-client error, looking inside wrapped errors
    pub fn as_fetch_client_error(&self) -> Option<&FetchClientError> {
        match self {
            Thrown::Client(err) => Some(err),
            Thrown::Error(err) => err.downcast_ref(),
            _ => None,
        }
    }

    /// This value as an HTTP response, looking inside wrapped errors
    pub fn as_fetch_response(&self) -> Option<&FetchResponse> {
        match self {
            Thrown::Response(response) => Some(response),
            Thrown::Error(err) => err.downcast_ref(),
            _ => None,
        }
    }

    /// This value as a shareable cause
    ///
    /// Wrapped errors are returned as the same allocation, not re-wrapped.
    pub fn to_cause(&self) -> Cause {
        match self {
            Thrown::Response(response) => Arc::new(response.clone()),
            Thrown::Client(err) => Arc::new(err.clone()),
            Thrown::Framework(err) => Arc::new(err.clone()),
            Thrown::Error(err) => Arc::clone(err),
            Thrown::Value(_) => Arc::new(self.clone()),
        }
    }
}

impl From<FetchResponse> for Thrown {
    fn from(response: FetchResponse) -> Self {
        Thrown::Response(response)
    }
}

impl From<reqwest::Response> for Thrown {
    fn from(response: reqwest::Response) -> Self {
        Thrown::Response(response.into())
    }
}

impl From<FetchClientError> for Thrown {
    fn from(err: FetchClientError) -> Self {
        Thrown::Client(err)
    }
}

impl From<reqwest::Error> for Thrown {
    fn from(err: reqwest::Error) -> Self {
        Thrown::Client(err.into())
    }
}

impl From<FrameworkError> for Thrown {
    fn from(err: FrameworkError) -> Self {
        Thrown::Framework(err)
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for Thrown {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Thrown::Error(Arc::from(err))
    }
}

impl From<serde_json::Value> for Thrown {
    fn from(value: serde_json::Value) -> Self {
        Thrown::Value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_shape_of_each_variant() {
        let response = FetchResponse::builder(StatusCode::NOT_FOUND).build();
        assert_eq!(Thrown::from(response).shape(), ErrorShape::FetchResponse);

        let client = FetchClientError::new("https://api.example.com", "failed");
        assert_eq!(Thrown::from(client).shape(), ErrorShape::FetchClient);

        let framework = FrameworkError::new(StatusCode::NOT_FOUND, "missing");
        assert_eq!(Thrown::from(framework).shape(), ErrorShape::Framework);

        let plain: Box<dyn std::error::Error + Send + Sync> = "test".into();
        assert_eq!(Thrown::from(plain).shape(), ErrorShape::Error);

        assert_eq!(Thrown::from(json!("oops")).shape(), ErrorShape::Unknown);
    }

    #[test]
    fn test_wrapped_known_shapes_are_recognized() {
        let framework = FrameworkError::new(StatusCode::FORBIDDEN, "nope");
        let thrown = Thrown::error(framework);
        assert_eq!(thrown.shape(), ErrorShape::Framework);
        assert_eq!(thrown.as_framework_error().unwrap().status_code, 403);

        let client = FetchClientError::new("https://api.example.com", "failed").with_status(502);
        let thrown = Thrown::error(client);
        assert_eq!(thrown.shape(), ErrorShape::FetchClient);

        let response = FetchResponse::builder(StatusCode::BAD_GATEWAY).build();
        let thrown = Thrown::error(response);
        assert_eq!(thrown.shape(), ErrorShape::FetchResponse);
    }

    #[test]
    fn test_to_cause_keeps_wrapped_allocation() {
        let inner: Cause = Arc::new(std::io::Error::other("disk"));
        let thrown = Thrown::Error(Arc::clone(&inner));
        assert!(Arc::ptr_eq(&thrown.to_cause(), &inner));
    }

    #[test]
    fn test_framework_error_source_is_cause() {
        let err = FrameworkError::new(StatusCode::INTERNAL_SERVER_ERROR, "wrapped")
            .with_cause(std::io::Error::other("original"));
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "original");
    }

    #[test]
    fn test_display() {
        let thrown = Thrown::from(FrameworkError::new(StatusCode::NOT_FOUND, "missing"));
        assert_eq!(thrown.to_string(), "missing");

        let thrown = Thrown::from(FetchResponse::builder(StatusCode::NOT_FOUND).build());
        assert_eq!(thrown.to_string(), "404 Not Found");

        let thrown = Thrown::from(FetchClientError::new("https://api.example.com", "boom"));
        assert_eq!(thrown.to_string(), "boom");

        assert_eq!(Thrown::from(json!("oops")).to_string(), "\"oops\"");
    }
}

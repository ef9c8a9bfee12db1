//! ErrKit - status-routed HTTP error handling
//!
//! This crate turns an error raised somewhere in an HTTP request path into a
//! call to the handler registered for its status code. Every error goes
//! through three steps:
//!
//! 1. a [`Validator`] decides whether the value is an error this handler owns
//! 2. a [`Normalizer`] converts it into a [`NormalizedError`]
//! 3. the dispatcher runs the handler for the normalized status code, or the
//!    default handler when none matches
//!
//! ## Error shapes
//!
//! The built-in strategies understand three shapes, wrapped in [`Thrown`]:
//! - [`FetchResponse`] - a raw HTTP response with an error status
//! - [`FetchClientError`] - an error raised by an HTTP client
//! - [`FrameworkError`] - an error raised by application code
//!
//! [`error_handler`] handles raw responses. [`ErrorHandling`] binds the strict
//! pair used by application code, which handles client and framework errors.
//! Other error types are supported by implementing [`Validator`] and
//! [`Normalizer`] for them.

pub mod composable;
mod dispatch;
mod error;
mod handlers;
mod normalized;
pub mod normalizers;
mod response;
mod types;
pub mod validators;

pub use composable::ErrorHandling;
pub use dispatch::{error_handler, error_handler_with_options, ErrorHandlerOptions};
pub use error::{BodyError, DispatchError, Rejected, TypeMismatch};
pub use handlers::{Handler, HandlerMap, StatusHandlers};
pub use normalized::{Cause, NormalizedError};
pub use normalizers::{
    normalize_error, normalize_fetch_client_error, normalize_fetch_error,
    normalize_framework_error, NormalizeFn, Normalizer,
};
pub use response::{FetchResponse, FetchResponseBuilder, BODY_TIMEOUT};
pub use types::{ErrorShape, FetchClientError, FrameworkError, Thrown};
pub use validators::{
    is_fetch_client_error, is_fetch_error, is_fetch_response, is_framework_error, Validator,
};

/// Name given to errors produced from HTTP responses and fetch clients
pub const FETCH_ERROR_NAME: &str = "FetchError";

/// Name given to framework errors that carry no name of their own
pub const FRAMEWORK_ERROR_NAME: &str = "FrameworkError";

/// Message used when a client error has neither a message nor a status
pub const FETCH_ERROR_FALLBACK_MESSAGE: &str = "Fetch Error";

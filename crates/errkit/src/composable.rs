//! Reusable error handling bound to a base handler map
//!
//! [`ErrorHandling`] holds the handlers and strategy pair shared by a part of
//! an application. Each call may pass override handlers, which are merged over
//! the base map for that call only.

use crate::dispatch::{error_handler_with_options, ErrorHandlerOptions};
use crate::error::DispatchError;
use crate::handlers::{HandlerMap, StatusHandlers};
use crate::normalizers::Normalizer;
use crate::types::Thrown;
use crate::validators::Validator;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::sync::Arc;

/// Base handlers plus the strict strategy pair for application code
///
/// # Example
///
/// ```no_run
/// use errkit::{ErrorHandling, FrameworkError, HandlerMap, StatusHandlers, Thrown};
/// use reqwest::StatusCode;
///
/// # async fn run() {
/// let errors: ErrorHandling = ErrorHandling::new(
///     HandlerMap::new(|_, err: &Thrown| eprintln!("request failed: {}", err))
///         .on(StatusCode::UNAUTHORIZED, |_, _| eprintln!("please sign in")),
/// );
///
/// let overrides = StatusHandlers::new().on(StatusCode::NOT_FOUND, |_, _| {
///     eprintln!("no such item");
/// });
///
/// let error = FrameworkError::new(StatusCode::NOT_FOUND, "Item not found");
/// errors.handle_error(error.into(), Some(&overrides)).await.unwrap();
/// # }
/// ```
pub struct ErrorHandling<T = serde_json::Value> {
    handlers: HandlerMap<T, Thrown>,
    options: ErrorHandlerOptions<Thrown, T>,
}

impl<T> ErrorHandling<T>
where
    T: DeserializeOwned + Send + 'static,
{
    /// Bind handlers to the strict validator and unified normalizer
    pub fn new(handlers: HandlerMap<T, Thrown>) -> Self {
        Self::with_options(handlers, ErrorHandlerOptions::extended())
    }

    /// Bind handlers to an explicit strategy pair
    pub fn with_options(
        handlers: HandlerMap<T, Thrown>,
        options: ErrorHandlerOptions<Thrown, T>,
    ) -> Self {
        Self { handlers, options }
    }

    /// Replace the validator, keeping the normalizer
    pub fn with_validator(mut self, validator: impl Validator<Thrown> + 'static) -> Self {
        self.options.validator = Arc::new(validator);
        self
    }

    /// Replace the normalizer, keeping the validator
    pub fn with_normalizer(mut self, normalizer: impl Normalizer<Thrown, T> + 'static) -> Self {
        self.options.normalizer = Arc::new(normalizer);
        self
    }

    /// Base handler map
    pub fn handlers(&self) -> &HandlerMap<T, Thrown> {
        &self.handlers
    }

    /// Strategy pair used for every call
    pub fn options(&self) -> &ErrorHandlerOptions<Thrown, T> {
        &self.options
    }

    /// Dispatch an error, with optional per-call handlers
    ///
    /// Override handlers replace base handlers registered for the same status
    /// code. The base map is not modified.
    pub async fn handle_error(
        &self,
        error: Thrown,
        overrides: Option<&StatusHandlers<T, Thrown>>,
    ) -> Result<(), DispatchError<Thrown>> {
        let handlers = match overrides {
            Some(overrides) if !overrides.is_empty() => {
                Cow::Owned(self.handlers.merged(overrides))
            }
            _ => Cow::Borrowed(&self.handlers),
        };

        error_handler_with_options(error, &handlers, &self.options).await
    }
}

impl<T> Clone for ErrorHandling<T> {
    fn clone(&self) -> Self {
        Self {
            handlers: self.handlers.clone(),
            options: self.options.clone(),
        }
    }
}

impl<T> std::fmt::Debug for ErrorHandling<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorHandling")
            .field("handlers", &self.handlers)
            .finish_non_exhaustive()
    }
}

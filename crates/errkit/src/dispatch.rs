//! Error dispatch entry points
//!
//! Validate, normalize, then route the error to the handler registered for
//! its status code. The strategies are configured via [`ErrorHandlerOptions`].

use crate::error::{DispatchError, Rejected};
use crate::handlers::HandlerMap;
use crate::normalized::NormalizedError;
use crate::normalizers::{FetchResponseNormalizer, Normalizer, UnifiedNormalizer};
use crate::types::Thrown;
use crate::validators::{FetchResponseValidator, StrictValidator, Validator};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Validator and normalizer pair used by the dispatcher
pub struct ErrorHandlerOptions<E: ?Sized = Thrown, T = serde_json::Value> {
    /// Decides whether a value is dispatched at all
    pub validator: Arc<dyn Validator<E>>,
    /// Converts an accepted value into a normalized record
    pub normalizer: Arc<dyn Normalizer<E, T>>,
}

impl<E: ?Sized, T> ErrorHandlerOptions<E, T> {
    /// Create options from an explicit strategy pair
    pub fn new<V, N>(validator: V, normalizer: N) -> Self
    where
        V: Validator<E> + 'static,
        N: Normalizer<E, T> + 'static,
    {
        Self {
            validator: Arc::new(validator),
            normalizer: Arc::new(normalizer),
        }
    }

    /// Replace the validator
    pub fn validator(mut self, validator: impl Validator<E> + 'static) -> Self {
        self.validator = Arc::new(validator);
        self
    }

    /// Replace the normalizer
    pub fn normalizer(mut self, normalizer: impl Normalizer<E, T> + 'static) -> Self {
        self.normalizer = Arc::new(normalizer);
        self
    }
}

impl<T> ErrorHandlerOptions<Thrown, T>
where
    T: DeserializeOwned + Send + 'static,
{
    /// Strict pair for application code: framework and fetch-client errors
    pub fn extended() -> Self {
        Self::new(StrictValidator, UnifiedNormalizer)
    }
}

impl<T> Default for ErrorHandlerOptions<Thrown, T>
where
    T: DeserializeOwned + Send + 'static,
{
    /// Default pair: HTTP responses with an error status
    fn default() -> Self {
        Self::new(FetchResponseValidator, FetchResponseNormalizer)
    }
}

impl<E: ?Sized, T> Clone for ErrorHandlerOptions<E, T> {
    fn clone(&self) -> Self {
        Self {
            validator: Arc::clone(&self.validator),
            normalizer: Arc::clone(&self.normalizer),
        }
    }
}

/// Dispatch an error using the default strategy pair
///
/// Only HTTP responses with an error status are handled. Anything else is
/// handed back as [`DispatchError::Unhandled`]. For custom strategies, use
/// [`error_handler_with_options`].
pub async fn error_handler<T>(
    error: Thrown,
    handlers: &HandlerMap<T, Thrown>,
) -> Result<(), DispatchError<Thrown>>
where
    T: DeserializeOwned + Send + 'static,
{
    error_handler_with_options(error, handlers, &ErrorHandlerOptions::default()).await
}

/// Dispatch an error using an explicit strategy pair
///
/// The handler receives the decoded payload and the original error value,
/// not the normalized record. Handler panics are not caught.
pub async fn error_handler_with_options<E, T>(
    error: E,
    handlers: &HandlerMap<T, E>,
    options: &ErrorHandlerOptions<E, T>,
) -> Result<(), DispatchError<E>> {
    match options.validator.validate(&error) {
        Ok(true) => {}
        Ok(false) => {
            tracing::debug!("Validator declined error, propagating");
            return Err(DispatchError::Unhandled(error));
        }
        Err(Rejected) => {
            tracing::debug!("Validator rejected error, propagating");
            return Err(DispatchError::Rejected(error));
        }
    }

    let NormalizedError {
        status_code, data, ..
    } = options.normalizer.normalize(&error).await?;

    let handler = handlers.resolve(status_code);
    handler(data, &error);
    Ok(())
}

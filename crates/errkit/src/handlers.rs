//! Status-keyed handler maps

use crate::types::Thrown;
use reqwest::StatusCode;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Callback invoked with the decoded payload and the original error value
pub type Handler<T = serde_json::Value, E = Thrown> = Arc<dyn Fn(Option<T>, &E) + Send + Sync>;

/// Partial map from status code to handler, without a default
///
/// Used for per-call overrides that are merged over a [`HandlerMap`].
pub struct StatusHandlers<T = serde_json::Value, E = Thrown> {
    handlers: HashMap<u16, Handler<T, E>>,
}

impl<T, E> StatusHandlers<T, E> {
    /// Create an empty map
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler for an exact status code
    pub fn on<F>(mut self, status: StatusCode, handler: F) -> Self
    where
        F: Fn(Option<T>, &E) + Send + Sync + 'static,
    {
        self.insert(status, Arc::new(handler));
        self
    }

    /// Register a shared handler for an exact status code
    pub fn insert(&mut self, status: StatusCode, handler: Handler<T, E>) {
        self.handlers.insert(status.as_u16(), handler);
    }

    /// Handler registered for a status code
    pub fn get(&self, status_code: u16) -> Option<&Handler<T, E>> {
        self.handlers.get(&status_code)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<T, E> Default for StatusHandlers<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> Clone for StatusHandlers<T, E> {
    fn clone(&self) -> Self {
        Self {
            handlers: self.handlers.clone(),
        }
    }
}

impl<T, E> fmt::Debug for StatusHandlers<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut codes: Vec<_> = self.handlers.keys().collect();
        codes.sort();
        f.debug_struct("StatusHandlers").field("codes", &codes).finish()
    }
}

/// Handler map with a mandatory default handler
///
/// Lookup is an exact status-code match. When no handler matches, or the
/// error has no status code, the default handler runs.
pub struct HandlerMap<T = serde_json::Value, E = Thrown> {
    statuses: StatusHandlers<T, E>,
    default: Handler<T, E>,
}

impl<T, E> HandlerMap<T, E> {
    /// Create a map with only a default handler
    pub fn new<F>(default: F) -> Self
    where
        F: Fn(Option<T>, &E) + Send + Sync + 'static,
    {
        Self {
            statuses: StatusHandlers::new(),
            default: Arc::new(default),
        }
    }

    /// Register a handler for an exact status code
    pub fn on<F>(mut self, status: StatusCode, handler: F) -> Self
    where
        F: Fn(Option<T>, &E) + Send + Sync + 'static,
    {
        self.statuses.insert(status, Arc::new(handler));
        self
    }

    /// Handler registered for a status code, ignoring the default
    pub fn get(&self, status_code: u16) -> Option<&Handler<T, E>> {
        self.statuses.get(status_code)
    }

    /// The default handler
    pub fn default_handler(&self) -> &Handler<T, E> {
        &self.default
    }

    /// Handler to run for a normalized status code
    pub fn resolve(&self, status_code: Option<u16>) -> &Handler<T, E> {
        match status_code.and_then(|code| self.get(code)) {
            Some(handler) => {
                tracing::debug!(status_code, "Using status handler");
                handler
            }
            None => {
                tracing::debug!(status_code, "Using default handler");
                &self.default
            }
        }
    }

    /// Copy of this map with `overrides` merged over it
    ///
    /// Override handlers replace base handlers registered for the same code.
    pub fn merged(&self, overrides: &StatusHandlers<T, E>) -> Self {
        let mut merged = self.clone();
        for (code, handler) in &overrides.handlers {
            merged.statuses.handlers.insert(*code, Arc::clone(handler));
        }
        merged
    }
}

impl<T, E> Clone for HandlerMap<T, E> {
    fn clone(&self) -> Self {
        Self {
            statuses: self.statuses.clone(),
            default: Arc::clone(&self.default),
        }
    }
}

impl<T, E> fmt::Debug for HandlerMap<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerMap")
            .field("statuses", &self.statuses)
            .finish_non_exhaustive()
    }
}

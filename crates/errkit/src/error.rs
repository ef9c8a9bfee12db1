//! Error types for errkit

use thiserror::Error;

/// A normalizer was handed a value of a shape it does not understand.
///
/// This is a programmer-error guard: the dispatcher only normalizes values
/// its validator accepted, so a correctly paired strategy never produces it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Expected {expected} object")]
pub struct TypeMismatch {
    /// Name of the shape the normalizer expected
    pub expected: &'static str,
}

impl TypeMismatch {
    /// Create a mismatch naming the expected shape
    pub fn new(expected: &'static str) -> Self {
        Self { expected }
    }
}

/// A strict validator refused a value that matches no known error shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("value matches no known error shape")]
pub struct Rejected;

/// Errors that can occur while reading a response body
#[derive(Debug, Error)]
pub enum BodyError {
    /// Body was already read
    #[error("Body has already been consumed")]
    Consumed,

    /// Transport failed while streaming the body
    #[error("Failed to read body")]
    Read(#[source] reqwest::Error),

    /// Body did not finish streaming in time
    #[error("Body read timed out")]
    Timeout,

    /// Body could not be decoded into the requested type
    #[error("Failed to parse body")]
    Parse(#[source] serde_json::Error),
}

/// Outcome of a dispatch that did not reach a handler.
///
/// Both rejection variants hand the original value back unchanged, so the
/// caller can keep propagating it exactly as it was thrown.
#[derive(Debug, Error)]
pub enum DispatchError<E> {
    /// The validator declined the value; it is not an HTTP error
    #[error("error is not a recognized HTTP error")]
    Unhandled(E),

    /// A strict validator refused the value outright
    #[error("value matches no known error shape")]
    Rejected(E),

    /// The normalizer did not recognize a value the validator accepted
    #[error(transparent)]
    Normalize(#[from] TypeMismatch),
}

impl<E> DispatchError<E> {
    /// Recover the original error value, if this outcome carries it
    pub fn into_original(self) -> Option<E> {
        match self {
            DispatchError::Unhandled(error) | DispatchError::Rejected(error) => Some(error),
            DispatchError::Normalize(_) => None,
        }
    }

    /// Borrow the original error value, if this outcome carries it
    pub fn original(&self) -> Option<&E> {
        match self {
            DispatchError::Unhandled(error) | DispatchError::Rejected(error) => Some(error),
            DispatchError::Normalize(_) => None,
        }
    }
}

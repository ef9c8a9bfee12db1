//! Normalizer for framework errors

use super::{decode_data, Normalizer};
use crate::error::TypeMismatch;
use crate::normalized::NormalizedError;
use crate::types::Thrown;
use crate::FRAMEWORK_ERROR_NAME;
use async_trait::async_trait;
use serde::de::DeserializeOwned;

/// Normalizer for [`FrameworkError`](crate::FrameworkError) values
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameworkNormalizer;

#[async_trait]
impl<T> Normalizer<Thrown, T> for FrameworkNormalizer
where
    T: DeserializeOwned + Send + 'static,
{
    async fn normalize(&self, error: &Thrown) -> Result<NormalizedError<T>, TypeMismatch> {
        normalize_framework_error(error)
    }
}

/// Normalize a framework error
///
/// Status, message and data are copied as-is. The cause is the error's own
/// cause when it has one, otherwise the error itself.
pub fn normalize_framework_error<T: DeserializeOwned>(
    error: &Thrown,
) -> Result<NormalizedError<T>, TypeMismatch> {
    let err = error
        .as_framework_error()
        .ok_or(TypeMismatch::new("FrameworkError"))?;

    // message is never empty in the normalized record
    let message = if err.message.is_empty() {
        format!("HTTP Error {}", err.status_code)
    } else {
        err.message.clone()
    };

    let name = match err.name.as_deref() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => FRAMEWORK_ERROR_NAME.to_string(),
    };

    Ok(NormalizedError {
        status_code: Some(err.status_code),
        status_message: err.status_message.clone(),
        message,
        name,
        data: err.data.as_ref().and_then(decode_data),
        cause: Some(err.cause.clone().unwrap_or_else(|| error.to_cause())),
        stack: err.stack.clone(),
    })
}

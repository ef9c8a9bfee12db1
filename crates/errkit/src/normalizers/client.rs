//! Normalizer for errors raised by a fetch client

use super::{decode_data, Normalizer};
use crate::error::TypeMismatch;
use crate::normalized::NormalizedError;
use crate::response::FetchResponse;
use crate::types::Thrown;
use crate::{FETCH_ERROR_FALLBACK_MESSAGE, FETCH_ERROR_NAME};
use async_trait::async_trait;
use serde::de::DeserializeOwned;

/// Normalizer for [`FetchClientError`](crate::FetchClientError) values
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchClientNormalizer;

#[async_trait]
impl<T> Normalizer<Thrown, T> for FetchClientNormalizer
where
    T: DeserializeOwned + Send + 'static,
{
    async fn normalize(&self, error: &Thrown) -> Result<NormalizedError<T>, TypeMismatch> {
        normalize_fetch_client_error(error)
    }
}

/// Normalize a fetch-client error
///
/// Explicit fields win over their fallbacks: `status_code` over `status`,
/// `status_message` over `status_text`, and `data` over the payload stashed
/// on the nested response.
pub fn normalize_fetch_client_error<T: DeserializeOwned>(
    error: &Thrown,
) -> Result<NormalizedError<T>, TypeMismatch> {
    let err = error
        .as_fetch_client_error()
        .ok_or(TypeMismatch::new("FetchClientError"))?;

    let status_code = err.status_code.or(err.status);
    let status_message = err
        .status_message
        .clone()
        .or_else(|| err.status_text.clone());

    let data = err
        .data
        .as_ref()
        .or_else(|| err.response.as_ref().and_then(FetchResponse::data))
        .and_then(decode_data);

    let message = if !err.message.is_empty() {
        err.message.clone()
    } else if let Some(code) = status_code {
        format!("HTTP Error {}", code)
    } else {
        FETCH_ERROR_FALLBACK_MESSAGE.to_string()
    };

    let name = match err.name.as_deref() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => FETCH_ERROR_NAME.to_string(),
    };

    Ok(NormalizedError {
        status_code,
        status_message,
        message,
        name,
        data,
        cause: Some(error.to_cause()),
        stack: err.stack.clone(),
    })
}

//! Normalizer for raw HTTP responses
//!
//! The body is read only if it is still unread. JSON content types are
//! decoded as JSON, anything else is read as text and kept if non-empty.
//! Read and parse failures leave `data` as `None`.

use super::{capture_stack, Normalizer};
use crate::error::{BodyError, TypeMismatch};
use crate::normalized::NormalizedError;
use crate::response::FetchResponse;
use crate::types::Thrown;
use crate::FETCH_ERROR_NAME;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Default normalizer for [`FetchResponse`] errors
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchResponseNormalizer;

#[async_trait]
impl<T> Normalizer<Thrown, T> for FetchResponseNormalizer
where
    T: DeserializeOwned + Send + 'static,
{
    async fn normalize(&self, error: &Thrown) -> Result<NormalizedError<T>, TypeMismatch> {
        normalize_fetch_error(error).await
    }
}

/// Normalize an HTTP response error
pub async fn normalize_fetch_error<T: DeserializeOwned>(
    error: &Thrown,
) -> Result<NormalizedError<T>, TypeMismatch> {
    let response = error
        .as_fetch_response()
        .ok_or(TypeMismatch::new("Response"))?;

    let data = read_data(response).await;
    let status_code = response.status().as_u16();
    let status_text = response.status_text();

    Ok(NormalizedError {
        status_code: Some(status_code),
        status_message: Some(status_text.to_string()),
        message: format!("HTTP Error {}: {}", status_code, status_text),
        name: FETCH_ERROR_NAME.to_string(),
        data,
        cause: Some(error.to_cause()),
        stack: capture_stack(),
    })
}

/// Read and decode the body, if it has not been read yet
async fn read_data<T: DeserializeOwned>(response: &FetchResponse) -> Option<T> {
    if response.body_used() {
        return None;
    }

    let is_json = response
        .content_type()
        .is_some_and(|ct| ct.contains("application/json"));

    let decoded = if is_json {
        response.json::<T>().await.map(Some)
    } else {
        match response.text().await {
            Ok(text) if text.is_empty() => Ok(None),
            Ok(text) => serde_json::from_value(serde_json::Value::String(text))
                .map(Some)
                .map_err(BodyError::Parse),
            Err(e) => Err(e),
        }
    };

    match decoded {
        Ok(data) => data,
        Err(e) => {
            debug!(error = %e, status = %response.status(), "Ignoring unreadable response body");
            None
        }
    }
}

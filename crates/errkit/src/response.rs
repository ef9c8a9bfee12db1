//! HTTP response value with a one-shot body
//!
//! A [`FetchResponse`] is what a failed request hands to the error handler.
//! Its body moves through an explicit state machine: it starts unread and is
//! taken out exactly once, after which [`FetchResponse::body_used`] reports
//! `true` and every further read fails with [`BodyError::Consumed`].

use crate::error::BodyError;
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use url::Url;

/// Body timeout (total) for streamed bodies
pub const BODY_TIMEOUT: Duration = Duration::from_secs(30);

enum BodySource {
    Buffered(Bytes),
    Stream(reqwest::Response),
}

enum BodyState {
    Unread(BodySource),
    Consumed,
}

struct Inner {
    status: StatusCode,
    status_text: String,
    headers: HeaderMap,
    url: Option<Url>,
    data: Option<serde_json::Value>,
    body: Mutex<BodyState>,
    body_timeout: Duration,
}

/// HTTP response carried as an error value
///
/// Cloning is cheap and clones share the same body state, so reading the
/// body through one clone consumes it for all of them.
#[derive(Clone)]
pub struct FetchResponse {
    inner: Arc<Inner>,
}

impl FetchResponse {
    /// Start building a response with a buffered body
    pub fn builder(status: StatusCode) -> FetchResponseBuilder {
        FetchResponseBuilder::new(status)
    }

    /// HTTP status
    pub fn status(&self) -> StatusCode {
        self.inner.status
    }

    /// Status line text, e.g. `Not Found`
    pub fn status_text(&self) -> &str {
        &self.inner.status_text
    }

    /// True for 2xx statuses
    pub fn ok(&self) -> bool {
        self.inner.status.is_success()
    }

    /// Response headers
    pub fn headers(&self) -> &HeaderMap {
        &self.inner.headers
    }

    /// Content-Type header value
    pub fn content_type(&self) -> Option<&str> {
        self.inner
            .headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// URL the response came from
    pub fn url(&self) -> Option<&Url> {
        self.inner.url.as_ref()
    }

    /// Payload an HTTP client already parsed and stashed on the response
    pub fn data(&self) -> Option<&serde_json::Value> {
        self.inner.data.as_ref()
    }

    /// True once the body has been taken
    pub fn body_used(&self) -> bool {
        matches!(*self.lock_body(), BodyState::Consumed)
    }

    /// True if both handles refer to the same response
    pub fn ptr_eq(&self, other: &FetchResponse) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Read the whole body
    pub async fn bytes(&self) -> Result<Bytes, BodyError> {
        let source = {
            let mut state = self.lock_body();
            match std::mem::replace(&mut *state, BodyState::Consumed) {
                BodyState::Unread(source) => source,
                BodyState::Consumed => return Err(BodyError::Consumed),
            }
        };

        match source {
            BodySource::Buffered(bytes) => Ok(bytes),
            BodySource::Stream(response) => {
                read_body_with_timeout(response, self.inner.body_timeout).await
            }
        }
    }

    /// Read the body as text, replacing invalid UTF-8
    pub async fn text(&self) -> Result<String, BodyError> {
        let body = self.bytes().await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    /// Read the body and decode it as JSON
    pub async fn json<T: DeserializeOwned>(&self) -> Result<T, BodyError> {
        let body = self.bytes().await?;
        serde_json::from_slice(&body).map_err(BodyError::Parse)
    }

    fn lock_body(&self) -> std::sync::MutexGuard<'_, BodyState> {
        self.inner
            .body
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl FetchResponse {
    /// Wrap a streamed response whose body must arrive within `body_timeout`
    pub(crate) fn with_body_timeout(response: reqwest::Response, body_timeout: Duration) -> Self {
        let status = response.status();
        let inner = Inner {
            status,
            status_text: canonical_text(status),
            headers: response.headers().clone(),
            url: Some(response.url().clone()),
            data: None,
            body: Mutex::new(BodyState::Unread(BodySource::Stream(response))),
            body_timeout,
        };
        Self {
            inner: Arc::new(inner),
        }
    }
}

impl From<reqwest::Response> for FetchResponse {
    fn from(response: reqwest::Response) -> Self {
        Self::with_body_timeout(response, BODY_TIMEOUT)
    }
}

impl fmt::Debug for FetchResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchResponse")
            .field("status", &self.inner.status)
            .field("status_text", &self.inner.status_text)
            .field("url", &self.inner.url)
            .field("body_used", &self.body_used())
            .finish()
    }
}

impl fmt::Display for FetchResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}",
            self.inner.status.as_u16(),
            self.inner.status_text
        )
    }
}

impl std::error::Error for FetchResponse {}

/// Builder for [`FetchResponse`] values with a buffered body
#[derive(Debug)]
pub struct FetchResponseBuilder {
    status: StatusCode,
    status_text: Option<String>,
    headers: HeaderMap,
    url: Option<Url>,
    data: Option<serde_json::Value>,
    body: Bytes,
}

impl FetchResponseBuilder {
    fn new(status: StatusCode) -> Self {
        Self {
            status,
            status_text: None,
            headers: HeaderMap::new(),
            url: None,
            data: None,
            body: Bytes::new(),
        }
    }

    /// Override the status text (defaults to the canonical reason phrase)
    pub fn status_text(mut self, text: impl Into<String>) -> Self {
        self.status_text = Some(text.into());
        self
    }

    /// Add a header
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Set the URL
    pub fn url(mut self, url: Url) -> Self {
        self.url = Some(url);
        self
    }

    /// Stash a client-parsed payload on the response
    pub fn data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Set a raw body
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Set a JSON body and an `application/json` content type
    pub fn json(mut self, body: &serde_json::Value) -> Self {
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.body = Bytes::from(body.to_string());
        self
    }

    /// Build the response
    pub fn build(self) -> FetchResponse {
        let status_text = self
            .status_text
            .unwrap_or_else(|| canonical_text(self.status));
        let inner = Inner {
            status: self.status,
            status_text,
            headers: self.headers,
            url: self.url,
            data: self.data,
            body: Mutex::new(BodyState::Unread(BodySource::Buffered(self.body))),
            body_timeout: BODY_TIMEOUT,
        };
        FetchResponse {
            inner: Arc::new(inner),
        }
    }
}

fn canonical_text(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or_default().to_string()
}

/// Read a streamed body, failing if it does not complete within `timeout`
async fn read_body_with_timeout(
    response: reqwest::Response,
    timeout: Duration,
) -> Result<Bytes, BodyError> {
    let collect = async {
        let mut body = BytesMut::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(BodyError::Read)?;
            body.extend_from_slice(&chunk);
        }
        Ok::<_, BodyError>(body.freeze())
    };

    tokio::time::timeout(timeout, collect)
        .await
        .map_err(|_| BodyError::Timeout)?
}

/// Server that answers one request with a body shorter than its
/// `content-length`, then holds the connection for `hold_open`
#[cfg(test)]
pub(crate) async fn truncated_body_server(hold_open: Duration) -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = [0u8; 1024];
        let _ = socket.read(&mut request).await;
        socket
            .write_all(
                b"HTTP/1.1 500 Internal Server Error\r\n\
                  content-type: application/json\r\n\
                  content-length: 100\r\n\r\n\
                  {\"partial\":",
            )
            .await
            .unwrap();
        tokio::time::sleep(hold_open).await;
    });
    format!("http://{}/", addr)
}

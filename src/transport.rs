//! Chat endpoint transport.
//!
//! [`ChatTransport`] is the seam between the widget and the network. The
//! widget issues exactly one `send` per submission and treats any `Err` as a
//! connection failure.

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::config::BackendConfig;
use crate::error::TransportError;
use crate::message::{ChatRequest, ChatResponse};

/// Sends a chat request and decodes the reply.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait ChatTransport {
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, TransportError>;
}

/// `POST`s JSON to the chat endpoint with `reqwest`.
///
/// The HTTP status is not inspected: whatever body comes back must decode as
/// a [`ChatResponse`], otherwise the call fails with
/// [`TransportError::Decode`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    endpoint: Url,
    http: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport for `endpoint` resolved against `base_url`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Backend origin (e.g. `http://127.0.0.1:80`)
    /// * `endpoint` - Path or absolute URL of the chat endpoint (e.g. `/chat`)
    /// * `timeout` - Optional limit on the whole request; `None` waits forever
    pub fn new(
        base_url: &str,
        endpoint: &str,
        timeout: Option<Duration>,
    ) -> Result<Self, TransportError> {
        let endpoint = Url::parse(base_url)?.join(endpoint)?;
        let http = build_client(timeout)?;
        Ok(Self { endpoint, http })
    }

    pub fn from_config(backend: &BackendConfig) -> Result<Self, TransportError> {
        Self::new(&backend.base_url, &backend.endpoint, backend.timeout())
    }

    /// Resolved endpoint URL.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn build_client(timeout: Option<Duration>) -> Result<reqwest::Client, TransportError> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}

#[cfg(target_arch = "wasm32")]
fn build_client(timeout: Option<Duration>) -> Result<reqwest::Client, TransportError> {
    if let Some(timeout) = timeout {
        tracing::warn!(
            name: "chat.transport.timeout_unsupported",
            timeout_ms = timeout.as_millis() as u64,
            "Request timeouts are not supported by the browser client; waiting indefinitely"
        );
    }
    Ok(reqwest::Client::builder().build()?)
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl ChatTransport for HttpTransport {
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, TransportError> {
        tracing::debug!(
            name: "chat.request.sent",
            endpoint = %self.endpoint,
            chars = request.message.chars().count(),
            "Chat request sent"
        );

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        let decoded = serde_json::from_str(&body).map_err(|source| TransportError::Decode {
            status: status.as_u16(),
            source,
        })?;

        tracing::debug!(
            name: "chat.request.settled",
            status = status.as_u16(),
            "Chat response decoded"
        );
        Ok(decoded)
    }
}

//! HTTP transport.
//!
//! The engine talks to the exchange through the [`Transport`] trait so a
//! cycle can be driven against a scripted responder in tests. The
//! production implementation, [`HttpTransport`], is a thin wrapper over
//! `reqwest` with a pinned rustls configuration.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::Result;

/// HTTP verbs used by the Bitfinex endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A fully built request, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    /// Header name/value pairs, sent in order.
    pub headers: Vec<(String, String)>,
    /// Raw body; empty means no body.
    pub body: String,
}

impl HttpRequest {
    /// Returns the value of the first header named `name`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Status and body of a completed exchange, whatever the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one request and returns the raw response.
///
/// Implementations return `Err` only when no response was obtained
/// (connect failure, TLS failure, timeout). Non-2xx statuses are returned
/// as a [`RawResponse`] for the caller to judge.
pub trait Transport {
    fn send(&self, request: &HttpRequest) -> impl Future<Output = Result<RawResponse>> + Send;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Builds a client using `tls_config` and a per-request `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::Tls`](crate::WatchError::Tls) if the client
    /// cannot be constructed.
    pub fn new(tls_config: rustls::ClientConfig, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .use_preconfigured_tls(tls_config)
            .timeout(timeout)
            .build()
            .map_err(|e| crate::WatchError::Tls(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: &HttpRequest) -> Result<RawResponse> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }

        debug!(url = %request.url, method = ?request.method, "sending request");
        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        Ok(RawResponse { status, body })
    }
}

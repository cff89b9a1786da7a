//! Transport used to fetch snapshots from the monitored host
//!
//! The collector only needs a single blocking-style request per cycle: it hands over a URL and a
//! timeout and gets back the status code and raw body. Status codes are not interpreted here.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{instrument, trace};

/// Raw reply of the monitored host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Errors that can occur while fetching a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request did not complete within the timeout
    Timeout,

    /// The host could not be reached (DNS, refused connection, ...)
    Connect(String),

    /// Any other failure while sending the request
    Request(String),

    /// The response body could not be read
    Body(String),

    /// The host replied with a non-2xx status
    Status(u16),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Timeout => write!(f, "HTTP request timed out"),
            TransportError::Connect(msg) => write!(f, "HTTP request failed: {msg}"),
            TransportError::Request(msg) => write!(f, "HTTP request failed: {msg}"),
            TransportError::Body(msg) => write!(f, "failed to read response body: {msg}"),
            TransportError::Status(status) => write!(f, "HTTP status: {status}"),
        }
    }
}

impl std::error::Error for TransportError {}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else if err.is_body() || err.is_decode() {
            TransportError::Body(err.to_string())
        } else {
            TransportError::Request(err.to_string())
        }
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one request against `url`, giving up after `timeout`.
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchResponse, TransportError>;
}

/// Transport backed by a shared `reqwest` client
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchResponse, TransportError> {
        trace!("requesting snapshot");

        let response = self.client.get(url).timeout(timeout).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        trace!("received {} bytes with status {status}", body.len());

        Ok(FetchResponse { status, body })
    }
}

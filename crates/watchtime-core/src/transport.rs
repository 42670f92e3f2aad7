//! HTTP transport seam.
//!
//! The engine never talks to the network directly; it consumes a
//! [`Transport`] that fetches a URL and returns the decoded JSON body.
//! Tests inject fakes with canned payloads, production uses
//! [`HttpTransport`] backed by `reqwest`.

use serde_json::Value;

use crate::error::{Error, Result};

/// Injected HTTP capability: fetch a URL, decode the body as JSON.
///
/// Transport-level failures (connect, timeout, decode) surface as
/// [`Error::Transport`]. Application-level failures travel inside the
/// returned body as an `error.message` field and are translated by the
/// API client, not here.
pub trait Transport: Send + Sync {
    /// Fetch the given URL and decode the response body as JSON.
    fn get_json(&self, url: &str) -> impl Future<Output = Result<Value>> + Send;
}

/// Production transport backed by a shared `reqwest` client.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with a fresh connection pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transport for HttpTransport {
    async fn get_json(&self, url: &str) -> Result<Value> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
        response
            .json()
            .await
            .map_err(|e| Error::Transport(e.to_string()))
    }
}

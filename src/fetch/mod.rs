//! Network capability abstraction
//!
//! The engine never talks to the network directly; it is constructed with a
//! [`FetchClient`] implementation. [`HttpFetcher`] backs it with reqwest in
//! interactive builds, [`MockFetcher`] serves canned responses in tests and
//! headless environments.

#[cfg(feature = "http")]
pub mod http;
pub mod mock;

use crate::error::{AssetError, Result};

/// A fetched response: status line plus the raw body.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub reason: String,
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn ok(body: Vec<u8>) -> Self {
        Self {
            status: 200,
            reason: "OK".to_string(),
            body,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The body on 2xx, otherwise a `Network` error carrying status + reason.
    pub fn success_body(self) -> Result<Vec<u8>> {
        if self.is_success() {
            Ok(self.body)
        } else {
            Err(AssetError::Network {
                status: self.status,
                reason: self.reason,
            })
        }
    }
}

/// Async fetch capability injected into the engine.
#[async_trait::async_trait]
pub trait FetchClient: Send + Sync + 'static {
    /// Fetch a URL, resolving to the response or a transport-level error.
    async fn fetch(&self, url: &str) -> Result<FetchResponse>;
}

#[cfg(feature = "http")]
pub use http::HttpFetcher;
pub use mock::{MockFetcher, MockResponse};

//! reqwest-backed fetch client

use super::{FetchClient, FetchResponse};
use crate::error::{AssetError, Result};

/// Production fetch client over a shared reqwest connection pool.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl FetchClient for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AssetError::Fetch(e.to_string()))?;

        let status = response.status();
        let reason = status.canonical_reason().unwrap_or("").to_string();
        let body = response
            .bytes()
            .await
            .map_err(|e| AssetError::Fetch(e.to_string()))?
            .to_vec();

        Ok(FetchResponse {
            status: status.as_u16(),
            reason,
            body,
        })
    }
}

//! Mock fetch client for tests and headless environments
//!
//! Routes are matched by URL suffix so tests can key responses on asset paths
//! without caring about the base URL or project prefix.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::{FetchClient, FetchResponse};
use crate::error::Result;

/// Canned behavior for a mocked route.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Resolve immediately with a 200 and these bytes.
    Bytes(Vec<u8>),
    /// Resolve immediately with this status and reason, empty body.
    Status(u16, &'static str),
    /// Resolve with a 200 after the given delay.
    Delay(Duration, Vec<u8>),
    /// Never resolve. Pairs with the texture timeout.
    Hang,
}

#[derive(Default)]
struct MockState {
    routes: HashMap<String, MockResponse>,
    served: Vec<String>,
}

/// Programmable in-memory fetch client.
///
/// Unmatched URLs resolve to an empty 200 so scheduling tests do not have to
/// register every asset they touch.
#[derive(Clone, Default)]
pub struct MockFetcher {
    state: Arc<Mutex<MockState>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a canned response for any URL ending in `suffix`.
    pub fn route(self, suffix: impl Into<String>, response: MockResponse) -> Self {
        self.state.lock().routes.insert(suffix.into(), response);
        self
    }

    /// URLs in the order fetches were dispatched.
    pub fn served(&self) -> Vec<String> {
        self.state.lock().served.clone()
    }

    pub fn served_count(&self) -> usize {
        self.state.lock().served.len()
    }
}

#[async_trait::async_trait]
impl FetchClient for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse> {
        let response = {
            let mut state = self.state.lock();
            state.served.push(url.to_string());
            state
                .routes
                .iter()
                .find(|(suffix, _)| url.ends_with(suffix.as_str()))
                .map(|(_, r)| r.clone())
        };

        match response {
            None => Ok(FetchResponse::ok(Vec::new())),
            Some(MockResponse::Bytes(body)) => Ok(FetchResponse::ok(body)),
            Some(MockResponse::Status(status, reason)) => Ok(FetchResponse {
                status,
                reason: reason.to_string(),
                body: Vec::new(),
            }),
            Some(MockResponse::Delay(delay, body)) => {
                tokio::time::sleep(delay).await;
                Ok(FetchResponse::ok(body))
            }
            Some(MockResponse::Hang) => {
                futures::future::pending::<()>().await;
                unreachable!()
            }
        }
    }
}

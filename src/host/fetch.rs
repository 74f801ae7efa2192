//! Fragment fetching.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::time::Duration;

use rustc_hash::FxHashMap;
use serde_json::Value;
use thiserror::Error;

use super::LocalFuture;
use crate::config::RequestMethod;

/// One navigation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub method: RequestMethod,
    pub url: String,
    pub form_data: Option<BTreeMap<String, String>>,
    /// The caller handles the response itself; no default success handling.
    pub skip_default: bool,
}

/// Body of a completed request.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchResponse {
    /// Body parsed as JSON (any JSON value, not only objects).
    Json(Value),
    /// Body that was not JSON.
    Text(String),
}

impl FetchResponse {
    /// Classify a raw body.
    pub fn from_body(body: &str) -> Self {
        serde_json::from_str(body)
            .map(Self::Json)
            .unwrap_or_else(|_| Self::Text(body.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("no response for `{0}`")]
    NotFound(String),

    #[error("request to `{url}` failed: {reason}")]
    Transport { url: String, reason: String },
}

/// Performs the network round trip.
pub trait FragmentFetcher {
    fn fetch(&self, request: FetchRequest) -> LocalFuture<'_, Result<FetchResponse, FetchError>>;
}

// ============================================================================
// StaticFetcher
// ============================================================================

/// Serves canned responses keyed by absolute URL after a fixed latency.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    routes: FxHashMap<String, Result<FetchResponse, FetchError>>,
    latency: Duration,
    requests: RefCell<Vec<FetchRequest>>,
}

impl StaticFetcher {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    pub fn route(mut self, url: impl Into<String>, response: FetchResponse) -> Self {
        self.insert(url, response);
        self
    }

    pub fn insert(&mut self, url: impl Into<String>, response: FetchResponse) {
        self.routes.insert(url.into(), Ok(response));
    }

    /// Make requests to `url` fail at the transport level.
    pub fn fail(mut self, url: impl Into<String>, reason: impl Into<String>) -> Self {
        let url = url.into();
        let err = FetchError::Transport {
            url: url.clone(),
            reason: reason.into(),
        };
        self.routes.insert(url, Err(err));
        self
    }

    /// Requests received so far, in order.
    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.borrow().clone()
    }
}

impl FragmentFetcher for StaticFetcher {
    fn fetch(&self, request: FetchRequest) -> LocalFuture<'_, Result<FetchResponse, FetchError>> {
        let url = request.url.clone();
        self.requests.borrow_mut().push(request);
        Box::pin(async move {
            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }
            self.routes
                .get(&url)
                .cloned()
                .unwrap_or(Err(FetchError::NotFound(url)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(url: &str) -> FetchRequest {
        FetchRequest {
            method: RequestMethod::Get,
            url: url.into(),
            form_data: None,
            skip_default: true,
        }
    }

    #[test]
    fn test_from_body() {
        assert_eq!(
            FetchResponse::from_body(r#"{"html": "<p/>"}"#),
            FetchResponse::Json(json!({"html": "<p/>"}))
        );
        assert_eq!(
            FetchResponse::from_body("<html>"),
            FetchResponse::Text("<html>".into())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_static_fetcher_routes_and_records() {
        let fetcher = StaticFetcher::new(Duration::from_millis(50))
            .route("https://x.test/p/2", FetchResponse::Json(json!({})))
            .fail("https://x.test/down", "connection reset");

        let ok = fetcher.fetch(request("https://x.test/p/2")).await;
        assert_eq!(ok, Ok(FetchResponse::Json(json!({}))));

        let missing = fetcher.fetch(request("https://x.test/p/3")).await;
        assert_eq!(missing, Err(FetchError::NotFound("https://x.test/p/3".into())));

        let down = fetcher.fetch(request("https://x.test/down")).await;
        assert!(matches!(down, Err(FetchError::Transport { .. })));

        assert_eq!(fetcher.requests().len(), 3);
        assert!(fetcher.requests()[0].skip_default);
    }
}

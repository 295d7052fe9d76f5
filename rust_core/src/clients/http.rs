//! reqwest-backed `StatsFetcher`.
//!
//! This is the one place where network failures are turned into absence:
//! retries, the circuit breaker and non-2xx handling all happen here and the
//! caller only ever sees `Some(payload)` or `None`.

use super::breaker::{ApiCircuitBreaker, BreakerConfig, BreakerState};
use super::retry::{retry_with_backoff, RetryPolicy};
use super::StatsFetcher;
use crate::error::{Result, StatsError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36";

const ACCEPT_JSON: &str = "application/json, text/plain, */*";
const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout: Duration,
    pub user_agent: String,
    pub retry: RetryPolicy,
    pub breaker: BreakerConfig,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            retry: RetryPolicy::default(),
            breaker: BreakerConfig::default(),
        }
    }
}

/// Why a single attempt failed.
#[derive(Debug)]
enum AttemptError {
    Transport(reqwest::Error),
    Status(StatusCode),
}

impl AttemptError {
    /// Transport errors, 5xx and 429 are worth another attempt.
    fn is_retriable(&self) -> bool {
        match self {
            AttemptError::Transport(_) => true,
            AttemptError::Status(status) => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
        }
    }
}

impl fmt::Display for AttemptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptError::Transport(e) => write!(f, "{}", e),
            AttemptError::Status(status) => write!(f, "HTTP {}", status),
        }
    }
}

#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    retry: RetryPolicy,
    circuit_breaker: Arc<ApiCircuitBreaker>,
}

impl fmt::Debug for HttpFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpFetcher")
            .field("circuit_breaker_state", &self.circuit_breaker.state())
            .finish()
    }
}

impl HttpFetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|e| StatsError::Config(format!("invalid user agent: {}", e)))?;
        headers.insert(USER_AGENT, agent);
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            retry: config.retry,
            circuit_breaker: Arc::new(ApiCircuitBreaker::new("stats", config.breaker)),
        })
    }

    pub fn circuit_state(&self) -> BreakerState {
        self.circuit_breaker.state()
    }

    async fn attempt(&self, url: &str, accept: &'static str) -> std::result::Result<String, AttemptError> {
        let resp = self
            .client
            .get(url)
            .header(ACCEPT, accept)
            .send()
            .await
            .map_err(AttemptError::Transport)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(AttemptError::Status(status));
        }
        resp.text().await.map_err(AttemptError::Transport)
    }

    /// Body of `url`, or `None` once every attempt has failed.
    async fn fetch_text(&self, url: &str, accept: &'static str) -> Option<String> {
        if !self.circuit_breaker.allow_request() {
            debug!(url, "Circuit breaker open, skipping fetch");
            return None;
        }

        let result = retry_with_backoff(
            || self.attempt(url, accept),
            &self.retry,
            AttemptError::is_retriable,
            url,
        )
        .await;

        match result {
            Ok(body) => {
                self.circuit_breaker.record_success();
                Some(body)
            }
            Err(e) => {
                // A 404 for an unknown athlete says nothing about provider health.
                if e.is_retriable() {
                    self.circuit_breaker.record_failure();
                }
                warn!(url, error = %e, "Fetch failed");
                None
            }
        }
    }
}

#[async_trait]
impl StatsFetcher for HttpFetcher {
    async fn fetch_json(&self, url: &str) -> Option<Value> {
        let body = self.fetch_text(url, ACCEPT_JSON).await?;
        match serde_json::from_str(&body) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(url, error = %e, "Response is not valid JSON");
                None
            }
        }
    }

    async fn fetch_html(&self, url: &str) -> Option<String> {
        self.fetch_text(url, ACCEPT_HTML).await
    }
}

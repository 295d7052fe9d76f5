//! Upstream data access.
//!
//! `StatsFetcher` is the seam between the pipeline and the network. It never
//! fails: a payload is either present or absent.

pub mod breaker;
pub mod espn;
pub mod http;
pub mod pfr;
pub mod retry;

use async_trait::async_trait;
use serde_json::Value;

pub use breaker::{ApiCircuitBreaker, BreakerConfig, BreakerState};
pub use http::{FetchConfig, HttpFetcher, DEFAULT_USER_AGENT};
pub use retry::{retry_with_backoff, RetryPolicy};

#[async_trait]
pub trait StatsFetcher: Send + Sync {
    /// Parsed JSON body of `url`, or `None` on any failure.
    async fn fetch_json(&self, url: &str) -> Option<Value>;

    /// Raw markup of `url`, or `None` on any failure.
    async fn fetch_html(&self, url: &str) -> Option<String>;
}

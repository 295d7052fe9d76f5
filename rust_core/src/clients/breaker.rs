//! Circuit breaker for upstream stats providers.
//!
//! Counts consecutive failed fetches per provider. After `failure_threshold`
//! failures the breaker opens and every fetch is refused until
//! `recovery_timeout` has passed; the next fetch is then let through as a
//! probe. `success_threshold` successful probes close it again, one failed
//! probe reopens it.

use parking_lot::Mutex;
use std::time::{Duration, Instant};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    /// Fetches flow normally
    Closed,
    /// Fetches are refused
    Open,
    /// Probing whether the provider recovered
    HalfOpen,
}

#[derive(Debug, Clone)]
pub struct BreakerConfig {
    pub failure_threshold: u32,
    pub recovery_timeout: Duration,
    pub success_threshold: u32,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            recovery_timeout: Duration::from_secs(30),
            success_threshold: 2,
        }
    }
}

#[derive(Debug)]
struct BreakerInner {
    state: BreakerState,
    consecutive_failures: u32,
    probe_successes: u32,
    opened_at: Option<Instant>,
}

#[derive(Debug)]
pub struct ApiCircuitBreaker {
    provider: String,
    config: BreakerConfig,
    inner: Mutex<BreakerInner>,
}

impl ApiCircuitBreaker {
    pub fn new(provider: &str, config: BreakerConfig) -> Self {
        Self {
            provider: provider.to_string(),
            config,
            inner: Mutex::new(BreakerInner {
                state: BreakerState::Closed,
                consecutive_failures: 0,
                probe_successes: 0,
                opened_at: None,
            }),
        }
    }

    /// Whether a fetch may go out now. Moves Open -> HalfOpen once the
    /// recovery timeout has elapsed.
    pub fn allow_request(&self) -> bool {
        let mut inner = self.inner.lock();
        match inner.state {
            BreakerState::Closed | BreakerState::HalfOpen => true,
            BreakerState::Open => {
                let recovered = inner
                    .opened_at
                    .map_or(true, |t| t.elapsed() >= self.config.recovery_timeout);
                if recovered {
                    inner.state = BreakerState::HalfOpen;
                    inner.probe_successes = 0;
                }
                recovered
            }
        }
    }

    pub fn record_success(&self) {
        let mut inner = self.inner.lock();
        inner.consecutive_failures = 0;
        if inner.state == BreakerState::HalfOpen {
            inner.probe_successes += 1;
            if inner.probe_successes < self.config.success_threshold {
                return;
            }
            info!(
                provider = %self.provider,
                probes = inner.probe_successes,
                "Circuit breaker closed"
            );
        }
        inner.state = BreakerState::Closed;
        inner.opened_at = None;
    }

    pub fn record_failure(&self) {
        let mut inner = self.inner.lock();
        inner.consecutive_failures += 1;
        let trip = match inner.state {
            BreakerState::Closed => inner.consecutive_failures >= self.config.failure_threshold,
            BreakerState::HalfOpen => true,
            BreakerState::Open => false,
        };
        if trip {
            inner.state = BreakerState::Open;
            inner.opened_at = Some(Instant::now());
            warn!(
                provider = %self.provider,
                failures = inner.consecutive_failures,
                "Circuit breaker opened"
            );
        }
    }

    pub fn state(&self) -> BreakerState {
        self.inner.lock().state
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }
}

use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::data_source::{HealthState, HealthStatus};

/// Circuit state guarding upstream history calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub open_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            open_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Default)]
struct Breaker {
    open: bool,
    probing: bool,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
}

impl Breaker {
    fn state(&self) -> CircuitState {
        match (self.open, self.probing) {
            (false, false) => CircuitState::Closed,
            (_, true) => CircuitState::HalfOpen,
            (true, false) => CircuitState::Open,
        }
    }
}

/// Thread-safe circuit breaker shared by every request an adapter makes.
///
/// After `failure_threshold` consecutive failures the circuit opens and calls
/// are refused until `open_timeout` has elapsed; then a single probe is let
/// through. A failing probe reopens the circuit.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    inner: Mutex<Breaker>,
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(Breaker::default()),
        }
    }

    pub fn allow_request(&self) -> bool {
        let mut inner = self
            .inner
            .lock()
            .expect("circuit breaker lock is not poisoned");
        if !inner.open || inner.probing {
            return true;
        }

        let elapsed = inner
            .opened_at
            .is_some_and(|opened_at| opened_at.elapsed() >= self.config.open_timeout);
        if elapsed {
            tracing::debug!("circuit half-open; probing upstream");
            inner.probing = true;
            inner.opened_at = None;
        }
        elapsed
    }

    pub fn record_success(&self) {
        let mut inner = self
            .inner
            .lock()
            .expect("circuit breaker lock is not poisoned");
        *inner = Breaker::default();
    }

    pub fn record_failure(&self) {
        let mut inner = self
            .inner
            .lock()
            .expect("circuit breaker lock is not poisoned");
        inner.consecutive_failures = inner.consecutive_failures.saturating_add(1);

        if inner.probing || inner.consecutive_failures >= self.config.failure_threshold {
            if !inner.open || inner.probing {
                tracing::warn!(
                    failures = inner.consecutive_failures,
                    "circuit opened after upstream failures"
                );
            }
            inner.open = true;
            inner.probing = false;
            inner.opened_at = Some(Instant::now());
        }
    }

    pub fn state(&self) -> CircuitState {
        self.inner
            .lock()
            .expect("circuit breaker lock is not poisoned")
            .state()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.inner
            .lock()
            .expect("circuit breaker lock is not poisoned")
            .consecutive_failures
    }

    /// Health derived from the circuit: half-open degrades, open is unhealthy.
    pub fn health(&self) -> HealthStatus {
        match self.state() {
            CircuitState::Closed => HealthStatus::healthy(),
            CircuitState::HalfOpen => HealthStatus::new(HealthState::Degraded, true),
            CircuitState::Open => HealthStatus::new(HealthState::Unhealthy, false),
        }
    }
}

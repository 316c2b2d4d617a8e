//! Circuit breaker guarding calls to external collaborators

use crate::error::{OntologyError, OntologyResult};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

/// Circuit breaker state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitBreakerState {
    /// Calls go through
    Closed,
    /// Calls fail fast without reaching the service
    Open,
    /// A trial call is allowed to probe recovery
    HalfOpen,
}

#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Failures inside `failure_window` that open the circuit
    pub failure_threshold: u32,
    /// Successes in half-open state that close it again
    pub success_threshold: u32,
    /// How long the circuit stays open before probing
    pub open_for: Duration,
    pub failure_window: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 2,
            open_for: Duration::from_secs(60),
            failure_window: Duration::from_secs(120),
        }
    }
}

impl CircuitBreakerConfig {
    /// Synonym lookups are optional; give up on them quickly.
    pub fn synonym_lookup() -> Self {
        Self {
            failure_threshold: 3,
            success_threshold: 1,
            open_for: Duration::from_secs(30),
            failure_window: Duration::from_secs(60),
        }
    }

    pub fn consistency_validator() -> Self {
        Self {
            failure_threshold: 3,
            success_threshold: 1,
            open_for: Duration::from_secs(60),
            failure_window: Duration::from_secs(300),
        }
    }
}

#[derive(Debug)]
struct BreakerState {
    state: CircuitBreakerState,
    success_count: u32,
    state_changed_at: Instant,
    failures: Vec<Instant>,
}

impl BreakerState {
    fn transition(&mut self, to: CircuitBreakerState, now: Instant) {
        self.state = to;
        self.success_count = 0;
        self.state_changed_at = now;
        if to == CircuitBreakerState::Closed {
            self.failures.clear();
        }
    }
}

/// Wraps calls to one external service. Failures are reported as
/// [`OntologyError::External`] tagged with the service name.
#[derive(Debug, Clone)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    inner: Arc<Mutex<BreakerState>>,
    service: &'static str,
}

impl CircuitBreaker {
    pub fn new(service: &'static str, config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            inner: Arc::new(Mutex::new(BreakerState {
                state: CircuitBreakerState::Closed,
                success_count: 0,
                state_changed_at: Instant::now(),
                failures: Vec::new(),
            })),
            service,
        }
    }

    pub fn service(&self) -> &'static str {
        self.service
    }

    pub fn state(&self) -> CircuitBreakerState {
        self.inner.lock().state
    }

    /// Runs `operation` unless the circuit is open.
    pub fn execute<T, F>(&self, operation: F) -> OntologyResult<T>
    where
        F: FnOnce() -> OntologyResult<T>,
    {
        self.admit()?;
        match operation() {
            Ok(value) => {
                self.on_success();
                Ok(value)
            }
            Err(err) => {
                self.on_failure();
                Err(err)
            }
        }
    }

    fn admit(&self) -> OntologyResult<()> {
        let mut inner = self.inner.lock();
        if inner.state != CircuitBreakerState::Open {
            return Ok(());
        }
        if inner.state_changed_at.elapsed() >= self.config.open_for {
            debug!(service = self.service, "circuit half-open, probing service");
            inner.transition(CircuitBreakerState::HalfOpen, Instant::now());
            return Ok(());
        }
        Err(OntologyError::external(
            self.service,
            "circuit open, failing fast",
        ))
    }

    fn on_success(&self) {
        let mut inner = self.inner.lock();
        match inner.state {
            CircuitBreakerState::HalfOpen => {
                inner.success_count += 1;
                if inner.success_count >= self.config.success_threshold {
                    debug!(service = self.service, "circuit closed");
                    inner.transition(CircuitBreakerState::Closed, Instant::now());
                }
            }
            CircuitBreakerState::Closed => {
                let now = Instant::now();
                let window = self.config.failure_window;
                inner.failures.retain(|&at| now.duration_since(at) < window);
            }
            CircuitBreakerState::Open => {}
        }
    }

    fn on_failure(&self) {
        let mut inner = self.inner.lock();
        let now = Instant::now();
        match inner.state {
            CircuitBreakerState::HalfOpen => {
                warn!(service = self.service, "probe failed, reopening circuit");
                inner.transition(CircuitBreakerState::Open, now);
            }
            CircuitBreakerState::Closed => {
                let window = self.config.failure_window;
                inner.failures.push(now);
                inner.failures.retain(|&at| now.duration_since(at) < window);
                let failures = inner.failures.len() as u32;
                if failures >= self.config.failure_threshold {
                    error!(
                        service = self.service,
                        failures,
                        threshold = self.config.failure_threshold,
                        "failure threshold reached, opening circuit"
                    );
                    inner.transition(CircuitBreakerState::Open, now);
                }
            }
            CircuitBreakerState::Open => {}
        }
    }

    pub fn reset(&self) {
        debug!(service = self.service, "circuit reset");
        self.inner
            .lock()
            .transition(CircuitBreakerState::Closed, Instant::now());
    }
}

//! Failure gate in front of an upstream source.
//!
//! The breaker is **Closed** while calls succeed. Once `failure_threshold`
//! consecutive failures land within `window`, it goes **Open** and rejects
//! calls without touching the upstream. After `cool_down` it turns
//! **HalfOpen** and admits a single probe while other callers are still
//! rejected: a success closes it again, a failure reopens it.

use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

/// Outcome of asking the breaker for permission to call the upstream.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Admission {
    Rejected,
    Allowed,
    /// The one half-open trial call. Its holder must report an outcome or
    /// call [`CircuitBreaker::release_probe`].
    Probe,
}

impl Admission {
    pub fn is_rejected(self) -> bool {
        self == Admission::Rejected
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub window_secs: u64,
    pub cool_down_secs: u64,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            window_secs: 60,
            cool_down_secs: 30,
        }
    }
}

impl CircuitBreakerConfig {
    fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    fn cool_down(&self) -> Duration {
        Duration::from_secs(self.cool_down_secs)
    }
}

#[derive(Debug)]
struct Circuit {
    state: CircuitState,
    consecutive_failures: u32,
    streak_started: Option<Instant>,
    opened_at: Option<Instant>,
    probe_in_flight: bool,
}

pub struct CircuitBreaker {
    circuit: Mutex<Circuit>,
    config: CircuitBreakerConfig,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            circuit: Mutex::new(Circuit {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                streak_started: None,
                opened_at: None,
                probe_in_flight: false,
            }),
            config,
        }
    }

    /// A poisoned lock only means a panic elsewhere; the state is still usable.
    fn lock(&self) -> MutexGuard<'_, Circuit> {
        self.circuit.lock().unwrap_or_else(|poisoned| {
            warn!("Circuit breaker mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    /// Whether a call may go through. Moves Open to HalfOpen once cooled down
    /// and hands out at most one probe while HalfOpen.
    pub fn admit(&self) -> Admission {
        let mut circuit = self.lock();
        match circuit.state {
            CircuitState::Closed => Admission::Allowed,
            CircuitState::HalfOpen if circuit.probe_in_flight => Admission::Rejected,
            CircuitState::HalfOpen => {
                circuit.probe_in_flight = true;
                Admission::Probe
            }
            CircuitState::Open => {
                let cooled = circuit
                    .opened_at
                    .is_none_or(|at| at.elapsed() >= self.config.cool_down());
                if !cooled {
                    return Admission::Rejected;
                }
                info!("Circuit breaker: transitioning from Open to HalfOpen");
                circuit.state = CircuitState::HalfOpen;
                circuit.probe_in_flight = true;
                Admission::Probe
            }
        }
    }

    /// Gives the half-open probe slot back without recording an outcome.
    pub fn release_probe(&self) {
        let mut circuit = self.lock();
        if circuit.state == CircuitState::HalfOpen && circuit.probe_in_flight {
            debug!("Circuit breaker: probe abandoned, slot released");
            circuit.probe_in_flight = false;
        }
    }

    pub fn record_success(&self) {
        let mut circuit = self.lock();
        if circuit.state == CircuitState::HalfOpen {
            info!("Circuit breaker: probe succeeded, closing circuit");
        }
        circuit.state = CircuitState::Closed;
        circuit.consecutive_failures = 0;
        circuit.streak_started = None;
        circuit.opened_at = None;
        circuit.probe_in_flight = false;
    }

    pub fn record_failure(&self) {
        let mut circuit = self.lock();
        let now = Instant::now();
        circuit.probe_in_flight = false;

        if circuit.state == CircuitState::HalfOpen {
            warn!("Circuit breaker: probe failed, reopening circuit");
            circuit.state = CircuitState::Open;
            circuit.opened_at = Some(now);
            return;
        }

        // A streak older than the window starts over
        let stale = circuit
            .streak_started
            .is_none_or(|at| now.duration_since(at) > self.config.window());
        if stale {
            circuit.consecutive_failures = 0;
            circuit.streak_started = Some(now);
        }
        circuit.consecutive_failures += 1;
        debug!(
            "Circuit breaker: failure {}/{}",
            circuit.consecutive_failures, self.config.failure_threshold
        );

        if circuit.consecutive_failures >= self.config.failure_threshold {
            warn!(
                "Circuit breaker: opening after {} consecutive failures",
                circuit.consecutive_failures
            );
            circuit.state = CircuitState::Open;
            circuit.opened_at = Some(now);
        }
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}

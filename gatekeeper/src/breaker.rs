//! Circuit Breaker
//!
//! Guards against consecutive pipeline failures.
//!
//! ```text
//! CLOSED ──(failures reach threshold)──▶ OPEN
//!   ▲                                     │
//!   └──────────── reset() ◀───────────────┘
//! ```
//!
//! There is no cooldown timer. The router refuses to route content while the
//! breaker is open, so no run can record the success that would close it:
//! once opened, the breaker stays open until an operator calls
//! [`CircuitBreaker::reset`]. This is the intended fail-closed posture.
//!
//! Counters are atomics so one breaker can be shared by every worker in a
//! process. The breaker is per-process; replicas do not coordinate.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Threshold used when none is configured.
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;

/// Breaker position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakerState {
    /// Gates may run.
    Closed,
    /// Gates are suppressed.
    Open,
}

impl std::fmt::Display for BreakerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "closed"),
            Self::Open => write!(f, "open"),
        }
    }
}

/// Point-in-time view for status output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakerSnapshot {
    pub state: BreakerState,
    pub failures: u32,
    pub threshold: u32,
    /// Opened by the emergency kill switch rather than by failures.
    pub forced: bool,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    failures: AtomicU32,
    threshold: u32,
    /// Latched by `force_open`; blocks success resets until `reset`.
    forced: AtomicBool,
}

impl CircuitBreaker {
    pub fn new(threshold: u32) -> Self {
        Self {
            failures: AtomicU32::new(0),
            threshold: threshold.max(1),
            forced: AtomicBool::new(false),
        }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn failures(&self) -> u32 {
        self.failures.load(Ordering::Acquire)
    }

    pub fn is_open(&self) -> bool {
        self.failures() >= self.threshold
    }

    pub fn state(&self) -> BreakerState {
        if self.is_open() {
            BreakerState::Open
        } else {
            BreakerState::Closed
        }
    }

    /// Count a pipeline-level failure. Returns the new count.
    pub fn record_failure(&self) -> u32 {
        let count = self.failures.fetch_add(1, Ordering::AcqRel).saturating_add(1);
        if count == self.threshold {
            tracing::warn!(
                failures = count,
                threshold = self.threshold,
                "Circuit breaker OPEN - agents disabled due to failures"
            );
        }
        count
    }

    /// A full run finished without failing: clear the streak.
    ///
    /// No-op while force-opened.
    pub fn record_success(&self) {
        if self.forced.load(Ordering::Acquire) {
            return;
        }
        self.failures.store(0, Ordering::Release);
        // force_open may have landed between the check and the store.
        if self.forced.load(Ordering::Acquire) {
            self.failures.fetch_max(self.threshold, Ordering::AcqRel);
        }
    }

    /// Pin the breaker open regardless of recorded failures.
    pub fn force_open(&self) {
        self.forced.store(true, Ordering::Release);
        self.failures.fetch_max(self.threshold, Ordering::AcqRel);
    }

    /// Operator reset: close the breaker and clear the kill-switch latch.
    pub fn reset(&self) {
        self.forced.store(false, Ordering::Release);
        self.failures.store(0, Ordering::Release);
        tracing::info!("Circuit breaker reset");
    }

    pub fn snapshot(&self) -> BreakerSnapshot {
        let failures = self.failures();
        BreakerSnapshot {
            state: if failures >= self.threshold {
                BreakerState::Open
            } else {
                BreakerState::Closed
            },
            failures,
            threshold: self.threshold,
            forced: self.forced.load(Ordering::Acquire),
        }
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(DEFAULT_FAILURE_THRESHOLD)
    }
}

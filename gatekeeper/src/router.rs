//! Traffic router: canary-style sampling of content into the gate chain
//!
//! A record runs through the gates only when the pipeline is enabled, the
//! breaker is closed, and its identifier hashes into the configured
//! percentage. The hash is BLAKE3 reduced to its low 32 bits, so a given
//! URL lands in the same bucket in every process and on every call.

use crate::breaker::CircuitBreaker;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};

/// Why a record was or was not routed into the gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "decision")]
pub enum RouteDecision {
    /// Pipeline globally disabled.
    Disabled,
    /// Breaker open.
    BreakerOpen,
    /// Bucket below the percentage.
    Sampled { bucket: u8 },
    /// Bucket at or above the percentage.
    NotSampled { bucket: u8 },
}

impl RouteDecision {
    pub fn should_run(self) -> bool {
        matches!(self, Self::Sampled { .. })
    }
}

impl std::fmt::Display for RouteDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disabled => write!(f, "disabled"),
            Self::BreakerOpen => write!(f, "circuit breaker open"),
            Self::Sampled { bucket } => write!(f, "sampled (bucket {bucket})"),
            Self::NotSampled { bucket } => write!(f, "not sampled (bucket {bucket})"),
        }
    }
}

/// Stable bucket in `0..100` for an identifier.
pub fn bucket(identifier: &str) -> u8 {
    let digest = blake3::hash(identifier.as_bytes());
    let bytes = digest.as_bytes();
    let low = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    (low % 100) as u8
}

#[derive(Debug)]
pub struct TrafficRouter {
    enabled: AtomicBool,
    percentage: u8,
}

impl TrafficRouter {
    pub fn new(enabled: bool, percentage: u8) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
            percentage: percentage.min(100),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub fn percentage(&self) -> u8 {
        self.percentage
    }

    /// Kill switch. There is no way back short of a new pipeline.
    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Release);
    }

    /// Full routing decision for an identifier.
    pub fn decide(&self, identifier: &str, breaker: &CircuitBreaker) -> RouteDecision {
        if !self.is_enabled() {
            return RouteDecision::Disabled;
        }
        if breaker.is_open() {
            tracing::warn!(
                failures = breaker.failures(),
                "Circuit breaker open - skipping agent validation"
            );
            return RouteDecision::BreakerOpen;
        }
        let bucket = bucket(identifier);
        if bucket < self.percentage {
            RouteDecision::Sampled { bucket }
        } else {
            RouteDecision::NotSampled { bucket }
        }
    }

    pub fn should_run(&self, identifier: &str, breaker: &CircuitBreaker) -> bool {
        self.decide(identifier, breaker).should_run()
    }
}

//! Gate Agents: staged checks over a content record
//!
//! Each gate inspects a [`ContentRecord`], may repair named fields in place,
//! and reports a [`GateOutcome`]. Gates run in a fixed order:
//!
//! ```text
//! extraction → editorial → preview → publisher
//!   │ FAIL         (never fails)       │ FAIL
//!   └─ chain halts                     └─ chain halts
//! ```
//!
//! A gate signals an expected failure by returning a Fail outcome. An
//! unexpected one (an `Err` or a panic) is turned into a Fail outcome by
//! [`run_guarded`], the only place that boundary exists.

pub mod editorial;
pub mod extraction;
pub mod preview;
pub mod publisher;

pub use editorial::EditorialGate;
pub use extraction::ExtractionGate;
pub use preview::PreviewGate;
pub use publisher::PublisherGate;

use crate::error::{GateResult, ValidationFault};
use crate::record::ContentRecord;
use crate::rules::FixupRules;
use serde::{Deserialize, Serialize};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::{Duration, Instant};

/// Verdict of a single gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Nothing to fix.
    Pass,
    /// Issue found and repaired automatically.
    Warning,
    /// Irrecoverable for this gate; the chain halts here.
    Fail,
}

impl Verdict {
    pub fn is_fail(self) -> bool {
        self == Self::Fail
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pass => write!(f, "PASS"),
            Self::Warning => write!(f, "WARN"),
            Self::Fail => write!(f, "FAIL"),
        }
    }
}

/// Result of one gate over one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateOutcome {
    /// Gate name (extraction_agent, editorial_agent, ...)
    pub gate: String,
    pub verdict: Verdict,
    pub message: String,
    /// Human-readable description of each repair applied.
    #[serde(default)]
    pub fixes: Vec<String>,
    /// Trust in the record after this gate (0.0–1.0).
    pub confidence: f64,
    /// Elapsed seconds.
    #[serde(rename = "time")]
    pub elapsed_secs: f64,
}

impl GateOutcome {
    /// Pass, or Warning when `fixes` is non-empty.
    pub fn from_fixes(gate: &str, message: impl Into<String>, fixes: Vec<String>) -> Self {
        let verdict = if fixes.is_empty() {
            Verdict::Pass
        } else {
            Verdict::Warning
        };
        Self {
            gate: gate.to_string(),
            verdict,
            message: message.into(),
            fixes,
            confidence: 1.0,
            elapsed_secs: 0.0,
        }
    }

    pub fn pass(gate: &str, message: impl Into<String>) -> Self {
        Self::from_fixes(gate, message, Vec::new())
    }

    /// Expected failure. Confidence stays at the default of 1.0: the gate
    /// is certain the record cannot pass.
    pub fn fail(gate: &str, fault: &ValidationFault) -> Self {
        Self {
            gate: gate.to_string(),
            verdict: Verdict::Fail,
            message: fault.to_string(),
            fixes: Vec::new(),
            confidence: 1.0,
            elapsed_secs: 0.0,
        }
    }

    /// Synthetic failure for a crashed gate or pipeline.
    pub fn crashed(gate: &str, fault: &ValidationFault) -> Self {
        Self {
            confidence: 0.0,
            ..Self::fail(gate, fault)
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed_secs = elapsed.as_secs_f64();
        self
    }

    pub fn is_fail(&self) -> bool {
        self.verdict.is_fail()
    }
}

/// One staged check.
pub trait Gate: Send + Sync {
    /// Stable name used in reports.
    fn name(&self) -> &'static str;

    /// Inspect and possibly repair the record.
    fn check(&self, record: &mut ContentRecord, rules: &FixupRules) -> GateResult<GateOutcome>;
}

/// The four gates in execution order.
pub fn default_chain() -> Vec<Box<dyn Gate>> {
    vec![
        Box::new(ExtractionGate),
        Box::new(EditorialGate),
        Box::new(PreviewGate),
        Box::new(PublisherGate),
    ]
}

/// Run a gate, converting errors and panics into a Fail outcome.
///
/// Elapsed time is stamped on every outcome, including synthesized ones.
pub fn run_guarded(gate: &dyn Gate, record: &mut ContentRecord, rules: &FixupRules) -> GateOutcome {
    let start = Instant::now();
    let name = gate.name();

    let crash_message = match catch_unwind(AssertUnwindSafe(|| gate.check(record, rules))) {
        Ok(Ok(outcome)) => return outcome.with_elapsed(start.elapsed()),
        Ok(Err(e)) => e.to_string(),
        Err(panic) => panic_message(panic.as_ref()),
    };

    tracing::error!(gate = name, error = %crash_message, "Gate crashed");
    let fault = ValidationFault::GateCrash {
        gate: name.to_string(),
        message: crash_message,
    };
    GateOutcome::crashed(name, &fault).with_elapsed(start.elapsed())
}

/// Best-effort text from a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GateError;

    struct PanickingGate;

    impl Gate for PanickingGate {
        fn name(&self) -> &'static str {
            "panicking_agent"
        }

        fn check(&self, _: &mut ContentRecord, _: &FixupRules) -> GateResult<GateOutcome> {
            panic!("index out of bounds")
        }
    }

    struct ErroringGate;

    impl Gate for ErroringGate {
        fn name(&self) -> &'static str {
            "erroring_agent"
        }

        fn check(&self, _: &mut ContentRecord, _: &FixupRules) -> GateResult<GateOutcome> {
            Err(GateError::InvalidDate {
                value: "yesterday".into(),
            })
        }
    }

    #[test]
    fn test_default_chain_order() {
        let names: Vec<&str> = default_chain().iter().map(|g| g.name()).collect();
        assert_eq!(
            names,
            vec![
                "extraction_agent",
                "editorial_agent",
                "preview_agent",
                "publisher_agent"
            ]
        );
    }

    #[test]
    fn test_guarded_panic_becomes_fail() {
        let mut record = ContentRecord::default();
        let outcome = run_guarded(&PanickingGate, &mut record, &FixupRules::default());
        assert_eq!(outcome.gate, "panicking_agent");
        assert_eq!(outcome.verdict, Verdict::Fail);
        assert_eq!(outcome.confidence, 0.0);
        assert_eq!(outcome.message, "Agent crashed: index out of bounds");
    }

    #[test]
    fn test_guarded_error_becomes_fail() {
        let mut record = ContentRecord::default();
        let outcome = run_guarded(&ErroringGate, &mut record, &FixupRules::default());
        assert!(outcome.is_fail());
        assert_eq!(outcome.confidence, 0.0);
        assert!(outcome.message.contains("yesterday"));
    }

    #[test]
    fn test_from_fixes_verdict() {
        assert_eq!(GateOutcome::from_fixes("g", "m", vec![]).verdict, Verdict::Pass);
        assert_eq!(
            GateOutcome::from_fixes("g", "m", vec!["fixed".into()]).verdict,
            Verdict::Warning
        );
    }

    #[test]
    fn test_confidence_clamping() {
        assert_eq!(GateOutcome::pass("g", "m").with_confidence(1.5).confidence, 1.0);
        assert_eq!(GateOutcome::pass("g", "m").with_confidence(-0.2).confidence, 0.0);
    }

    #[test]
    fn test_verdict_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Verdict::Warning).unwrap(), "\"warning\"");
        let outcome = GateOutcome::pass("publisher_agent", "Ready for publication");
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["verdict"], "pass");
        assert!(json.get("time").is_some());
    }
}

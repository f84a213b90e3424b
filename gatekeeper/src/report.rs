//! Validation report attached to every record
//!
//! Downstream renderers read this shape:
//!
//! ```json
//! {
//!   "enabled": true,
//!   "shadow_mode": false,
//!   "status": "completed_in_0.01s",
//!   "results": [{"gate": "extraction_agent", "verdict": "pass", ...}],
//!   "overall_confidence": 0.925,
//!   "breaker_failures": 0
//! }
//! ```

use crate::gates::{GateOutcome, Verdict};
use crate::record::ContentRecord;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Status token for a run that never reached the gates.
pub const STATUS_DISABLED: &str = "agents_disabled";

/// Per-record validation report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub enabled: bool,
    pub shadow_mode: bool,
    pub status: String,
    pub results: Vec<GateOutcome>,
    pub overall_confidence: f64,
    pub breaker_failures: u32,
}

impl ValidationReport {
    /// Mean confidence of the executed gates; 1.0 when none ran.
    pub fn mean_confidence(outcomes: &[GateOutcome]) -> f64 {
        if outcomes.is_empty() {
            return 1.0;
        }
        outcomes.iter().map(|o| o.confidence).sum::<f64>() / outcomes.len() as f64
    }

    /// All repairs applied across gates, in order.
    pub fn fixes(&self) -> Vec<&str> {
        self.results
            .iter()
            .flat_map(|r| r.fixes.iter().map(String::as_str))
            .collect()
    }

    /// Gate that halted the chain, if any.
    pub fn first_failure(&self) -> Option<&GateOutcome> {
        self.results.iter().find(|r| r.verdict == Verdict::Fail)
    }

    /// Whether the gates were skipped entirely.
    pub fn skipped(&self) -> bool {
        self.status == STATUS_DISABLED
    }

    /// Compact one-line summary for logging.
    ///
    /// Example: `[PASS] 4 gates | 2 fixes | confidence 0.85 | completed_in_0.00s`
    pub fn summary(&self) -> String {
        let status = if self.skipped() {
            "SKIP"
        } else if self.first_failure().is_some() {
            "FAIL"
        } else {
            "PASS"
        };
        let mut parts = vec![format!("[{status}] {} gates", self.results.len())];
        let fixes = self.fixes().len();
        if fixes > 0 {
            parts.push(format!("{fixes} fixes"));
        }
        if let Some(failed) = self.first_failure() {
            parts.push(format!("halted at {}", failed.gate));
        }
        parts.push(format!("confidence {:.2}", self.overall_confidence));
        parts.push(self.status.clone());
        parts.join(" | ")
    }
}

/// Status token for a run that finished.
pub fn completed_status(elapsed: Duration) -> String {
    format!("completed_in_{:.2}s", elapsed.as_secs_f64())
}

/// Status token for a run the outer safety net caught.
pub fn crashed_status(elapsed: Duration) -> String {
    format!("crashed_in_{:.2}s", elapsed.as_secs_f64())
}

/// Pipeline-level values copied into every report.
#[derive(Debug, Clone, Copy)]
pub struct AnnotationContext {
    pub enabled: bool,
    pub shadow_mode: bool,
    pub breaker_failures: u32,
}

/// Attach a report to the record. No other field is touched.
pub fn annotate(
    mut record: ContentRecord,
    outcomes: Vec<GateOutcome>,
    status: String,
    ctx: AnnotationContext,
) -> ContentRecord {
    record.validation = Some(ValidationReport {
        enabled: ctx.enabled,
        shadow_mode: ctx.shadow_mode,
        status,
        overall_confidence: ValidationReport::mean_confidence(&outcomes),
        results: outcomes,
        breaker_failures: ctx.breaker_failures,
    });
    record
}

//! Pipeline Orchestrator
//!
//! Runs the routed, fail-fast gate chain with crash isolation.
//!
//! ```text
//! validate(record)
//!   ├─ router says no ──────────────▶ report { status: agents_disabled }
//!   └─ extraction → editorial → preview → publisher
//!        │ FAIL: breaker += 1, stop
//!        └─ last gate not FAIL: breaker = 0
//!                                  ──▶ report { status: completed_in_Ns }
//! ```
//!
//! [`ValidationPipeline::validate`] is total: it never returns an error and
//! never lets a panic escape. Gate crashes are converted by
//! [`run_guarded`]; anything outside that boundary is caught once more here
//! and reported as a synthetic `pipeline` failure.
//!
//! Shadow mode does not change which gates run or what they repair. Callers
//! that want observe-only behavior check `shadow_mode` in the report and
//! discard the mutated fields themselves.

use crate::breaker::{BreakerSnapshot, CircuitBreaker};
use crate::config::PipelineConfig;
use crate::emergency::EmergencyControl;
use crate::error::{ConfigError, ValidationFault};
use crate::gates::{default_chain, panic_message, run_guarded, Gate, GateOutcome};
use crate::record::ContentRecord;
use crate::report::{
    annotate, completed_status, crashed_status, AnnotationContext, STATUS_DISABLED,
};
use crate::router::{RouteDecision, TrafficRouter};
use crate::rules::FixupRules;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

/// Name used for faults outside any gate.
pub const PIPELINE_GATE_NAME: &str = "pipeline";

/// Process-lifetime mutable state shared by workers and the kill switch.
#[derive(Debug)]
pub struct PipelineState {
    pub router: TrafficRouter,
    pub breaker: CircuitBreaker,
    pub shadow_mode: bool,
}

impl PipelineState {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            router: TrafficRouter::new(config.enabled, config.percentage),
            breaker: CircuitBreaker::new(config.failure_threshold),
            shadow_mode: config.shadow_mode,
        }
    }

    fn annotation_context(&self) -> AnnotationContext {
        AnnotationContext {
            enabled: self.router.is_enabled(),
            shadow_mode: self.shadow_mode,
            breaker_failures: self.breaker.failures(),
        }
    }
}

/// Explicitly owned validation context.
///
/// Construct once per process (or per batch) and share by reference or
/// `Arc` across workers.
pub struct ValidationPipeline {
    config: PipelineConfig,
    state: Arc<PipelineState>,
    rules: Arc<FixupRules>,
    gates: Vec<Box<dyn Gate>>,
}

impl std::fmt::Debug for ValidationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationPipeline")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("gates", &self.gates.iter().map(|g| g.name()).collect::<Vec<_>>())
            .finish()
    }
}

impl ValidationPipeline {
    /// Pipeline with the built-in rule table and the standard four gates.
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_rules(config, FixupRules::default())
    }

    pub fn with_rules(config: PipelineConfig, rules: FixupRules) -> Self {
        Self::with_gates(config, rules, default_chain())
    }

    /// Pipeline with a custom gate chain, run in the given order.
    pub fn with_gates(config: PipelineConfig, rules: FixupRules, gates: Vec<Box<dyn Gate>>) -> Self {
        tracing::info!(
            enabled = config.enabled,
            percentage = config.percentage,
            shadow = config.shadow_mode,
            threshold = config.failure_threshold,
            gates = gates.len(),
            "Agent pipeline configured"
        );
        Self {
            state: Arc::new(PipelineState::new(&config)),
            config,
            rules: Arc::new(rules),
            gates,
        }
    }

    /// Pipeline configured from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(PipelineConfig::from_env()?))
    }

    /// Construction-time configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn rules(&self) -> &FixupRules {
        &self.rules
    }

    pub fn is_enabled(&self) -> bool {
        self.state.router.is_enabled()
    }

    pub fn shadow_mode(&self) -> bool {
        self.state.shadow_mode
    }

    pub fn breaker(&self) -> BreakerSnapshot {
        self.state.breaker.snapshot()
    }

    /// Routing decision for an identifier, with the reason.
    pub fn route(&self, identifier: &str) -> RouteDecision {
        self.state.router.decide(identifier, &self.state.breaker)
    }

    /// Whether content with this identifier would run through the gates.
    pub fn should_run(&self, identifier: &str) -> bool {
        self.route(identifier).should_run()
    }

    /// Handle for out-of-band kill-switch use.
    pub fn emergency_control(&self) -> EmergencyControl {
        EmergencyControl::new(Arc::clone(&self.state))
    }

    /// Operator reset of the circuit breaker.
    pub fn reset_breaker(&self) {
        self.state.breaker.reset();
    }

    /// Validate one record. Always returns the record with a report.
    pub fn validate(&self, mut record: ContentRecord) -> ContentRecord {
        let start = Instant::now();
        let mut log: Vec<GateOutcome> = Vec::new();

        let ran = catch_unwind(AssertUnwindSafe(|| self.run_chain(&mut record, &mut log)));

        let status = match ran {
            Ok(false) => STATUS_DISABLED.to_string(),
            Ok(true) => completed_status(start.elapsed()),
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!(error = %message, "Validation pipeline crashed");
                log.push(
                    GateOutcome::crashed(
                        PIPELINE_GATE_NAME,
                        &ValidationFault::PipelineCrash(message),
                    )
                    .with_elapsed(start.elapsed()),
                );
                crashed_status(start.elapsed())
            }
        };

        let record = annotate(record, log, status, self.state.annotation_context());
        if let Some(report) = record.validation.as_ref() {
            tracing::debug!(url = record.identifier(), summary = %report.summary(), "Validation finished");
        }
        record
    }

    /// Route and run the gates. Returns false when the record was not routed.
    fn run_chain(&self, record: &mut ContentRecord, log: &mut Vec<GateOutcome>) -> bool {
        let decision = self.route(record.identifier());
        if !decision.should_run() {
            tracing::debug!(url = record.identifier(), %decision, "Skipping agent validation");
            return false;
        }

        for gate in &self.gates {
            let outcome = run_guarded(gate.as_ref(), record, &self.rules);
            if !outcome.fixes.is_empty() {
                tracing::info!(gate = %outcome.gate, fixes = ?outcome.fixes, "Applied fixes");
            }

            let failed = outcome.is_fail();
            if failed {
                tracing::warn!(gate = %outcome.gate, message = %outcome.message, "Gate FAILED");
            }
            log.push(outcome);

            if failed {
                self.state.breaker.record_failure();
                break;
            }
        }

        if log.last().is_some_and(|o| !o.is_fail()) {
            self.state.breaker.record_success();
        }
        true
    }
}

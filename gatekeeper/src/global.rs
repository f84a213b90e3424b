//! Process-wide convenience accessor.
//!
//! Prefer constructing a [`ValidationPipeline`] and passing it around. This
//! module exists for callers (cron scripts, one-shot tools) that want a
//! single lazily built instance configured from the environment, and for
//! reaching that instance from an out-of-band kill switch.

use crate::config::PipelineConfig;
use crate::pipeline::ValidationPipeline;
use crate::record::ContentRecord;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

static PIPELINE: OnceLock<ValidationPipeline> = OnceLock::new();
/// Set by `force_disable`; observed by construction and every access.
///
/// SeqCst on both sides: `force_disable` stores the flag then reads the
/// cell, `pipeline` writes the cell then reads the flag, and at least one of
/// them must see the other's write.
static KILL_SWITCH: AtomicBool = AtomicBool::new(false);

/// The process-wide pipeline, built from the environment on first use.
///
/// Invalid environment values are logged and replaced by the conservative
/// default (disabled).
pub fn pipeline() -> &'static ValidationPipeline {
    let pipeline = PIPELINE.get_or_init(|| {
        let config = PipelineConfig::from_env().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Invalid agent pipeline configuration, using defaults");
            PipelineConfig::default()
        });
        ValidationPipeline::new(config)
    });
    if KILL_SWITCH.load(Ordering::SeqCst) {
        pipeline.emergency_control().force_disable();
    }
    pipeline
}

/// Validate with the process-wide pipeline.
pub fn validate(record: ContentRecord) -> ContentRecord {
    pipeline().validate(record)
}

/// Kill switch for the process-wide pipeline.
///
/// Safe to call before the pipeline exists: the next construction comes up
/// disabled with the breaker open.
pub fn force_disable() {
    KILL_SWITCH.store(true, Ordering::SeqCst);
    match PIPELINE.get() {
        Some(pipeline) => pipeline.emergency_control().force_disable(),
        None => tracing::error!("EMERGENCY: agent validation disabled before pipeline start"),
    }
}

/// Whether the process-wide kill switch has been thrown.
pub fn is_force_disabled() -> bool {
    KILL_SWITCH.load(Ordering::SeqCst)
}

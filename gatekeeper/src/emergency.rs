//! Emergency Control: the operational kill switch.
//!
//! `force_disable` turns the router off and pins the breaker open. Both
//! writes are to shared atomics, so it takes effect for every worker holding
//! the same pipeline, including runs already in flight: a success reset
//! racing with it cannot close a forced breaker.

use crate::pipeline::PipelineState;
use std::sync::Arc;

/// Cloneable handle onto a pipeline's shared state.
#[derive(Debug, Clone)]
pub struct EmergencyControl {
    state: Arc<PipelineState>,
}

impl EmergencyControl {
    pub(crate) fn new(state: Arc<PipelineState>) -> Self {
        Self { state }
    }

    /// Disable all agent validation. Idempotent.
    pub fn force_disable(&self) {
        let was_enabled = self.state.router.is_enabled();
        self.state.router.disable();
        self.state.breaker.force_open();
        if was_enabled {
            tracing::error!("EMERGENCY: All agent validation disabled");
        }
    }

    /// Whether the kill switch (or configuration) has the pipeline off.
    pub fn is_disabled(&self) -> bool {
        !self.state.router.is_enabled()
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{PipelineConfig, RolloutPreset};
    use crate::pipeline::ValidationPipeline;

    #[test]
    fn test_force_disable_blocks_routing() {
        let pipeline = ValidationPipeline::new(PipelineConfig::preset(RolloutPreset::Full));
        let control = pipeline.emergency_control();
        assert!(!control.is_disabled());
        control.force_disable();
        assert!(control.is_disabled());
        assert!(pipeline.breaker().forced);
        assert_eq!(pipeline.breaker().failures, 3);
        for i in 0..100 {
            assert!(!pipeline.should_run(&format!("test://{i}")));
        }
    }

    #[test]
    fn test_force_disable_twice() {
        let pipeline = ValidationPipeline::new(PipelineConfig::preset(RolloutPreset::Canary));
        let control = pipeline.emergency_control();
        control.force_disable();
        control.clone().force_disable();
        assert_eq!(pipeline.breaker().failures, 3);
        assert!(!pipeline.is_enabled());
    }

    #[test]
    fn test_reset_breaker_does_not_reenable() {
        let pipeline = ValidationPipeline::new(PipelineConfig::preset(RolloutPreset::Full));
        pipeline.emergency_control().force_disable();
        pipeline.reset_breaker();
        assert_eq!(pipeline.breaker().failures, 0);
        assert!(!pipeline.should_run("test://after-reset"));
    }
}

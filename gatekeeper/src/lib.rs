//! Content Validation Gates
//!
//! Checks and repairs generated digest content before publication, without
//! ever blocking the publish path.
//!
//! - **Gates**: extraction, editorial, preview and publisher checks, run in
//!   order and halted by the first failure
//! - **Circuit breaker**: suspends the gates after repeated pipeline failures
//! - **Traffic router**: canary-style sampling by URL hash
//! - **Emergency control**: kill switch shared with running workers
//!
//! # Usage
//!
//! ```rust,ignore
//! use gatekeeper::{ContentRecord, PipelineConfig, RolloutPreset, ValidationPipeline};
//!
//! let pipeline = ValidationPipeline::new(PipelineConfig::preset(RolloutPreset::Canary));
//! let record = pipeline.validate(record);
//! let report = record.validation.as_ref().unwrap();
//! println!("{}", report.summary());
//! ```

pub mod breaker;
pub mod config;
pub mod emergency;
pub mod error;
pub mod gates;
pub mod global;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod router;
pub mod rules;

pub use breaker::{BreakerSnapshot, BreakerState, CircuitBreaker};
pub use config::{PipelineConfig, RolloutPreset};
pub use emergency::EmergencyControl;
pub use error::{ConfigError, GateError, RulesError, ValidationFault};
pub use gates::{Gate, GateOutcome, Verdict};
pub use pipeline::ValidationPipeline;
pub use record::ContentRecord;
pub use report::ValidationReport;
pub use router::{RouteDecision, TrafficRouter};
pub use rules::FixupRules;

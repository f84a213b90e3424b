//! Error types
//!
//! Two families live here. [`ValidationFault`] is the taxonomy of reasons a
//! gate chain stops; faults are never returned to callers of
//! [`ValidationPipeline::validate`](crate::ValidationPipeline::validate), they
//! only ever appear as the message of a Fail outcome in the report.
//! [`ConfigError`] and [`RulesError`] are ordinary load-time errors returned
//! before any content flows.

use std::path::PathBuf;
use thiserror::Error;

/// Why a gate chain halted on a content record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationFault {
    /// No raw extraction file, or the path does not exist.
    #[error("Raw data file missing - cannot proceed")]
    MissingRawData { path: Option<PathBuf> },

    /// The raw extraction file exists but has zero length.
    #[error("Raw data empty - likely 404 URL")]
    EmptyRawData { path: PathBuf },

    /// Publication-critical fields are absent or empty.
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingRequiredFields(Vec<String>),

    /// A gate returned an error or panicked.
    #[error("Agent crashed: {message}")]
    GateCrash { gate: String, message: String },

    /// Something outside the per-gate boundary failed.
    #[error("Pipeline error: {0}")]
    PipelineCrash(String),
}

/// Internal gate failure. Converted to [`ValidationFault::GateCrash`] by the
/// guarded gate adapter.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("failed to stat {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("time data '{value}' does not match format '%Y-%m-%d'")]
    InvalidDate { value: String },
}

/// Result alias for gate execution.
pub type GateResult<T> = Result<T, GateError>;

/// Pipeline configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be an integer in 0..=100, got '{value}'")]
    InvalidPercentage { var: &'static str, value: String },

    #[error("sample percentage {0} is out of range (0..=100)")]
    PercentageOutOfRange(u32),

    #[error("{var} must be a positive integer, got '{value}'")]
    InvalidThreshold { var: &'static str, value: String },

    #[error("failure threshold must be at least 1")]
    ZeroThreshold,

    #[error("unknown rollout preset '{0}' (expected disabled, shadow, canary or full)")]
    UnknownPreset(String),
}

/// Fix-up rule table loading errors.
#[derive(Debug, Error)]
pub enum RulesError {
    #[error("failed to read rule table {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse rule table: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

//! Pipeline Configuration
//!
//! Read once when a [`ValidationPipeline`](crate::ValidationPipeline) is
//! constructed. There is no hot reload; the emergency kill switch is the
//! only runtime change.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `ENABLE_AGENT_VALIDATION` | `false` | Run the gate chain at all |
//! | `AGENT_VALIDATION_PERCENTAGE` | `0` | Share of content (by URL hash) routed through the gates |
//! | `AGENT_SHADOW_MODE` | `false` | Observe-only signal carried into the report |
//! | `AGENT_BREAKER_THRESHOLD` | `3` | Consecutive failures that open the breaker |
//!
//! # Rollout presets
//!
//! ```text
//! Disabled (off) → Shadow (100%, observe) → Canary (25%) → Full (100%)
//! ```

use crate::breaker::DEFAULT_FAILURE_THRESHOLD;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const ENV_ENABLED: &str = "ENABLE_AGENT_VALIDATION";
pub const ENV_PERCENTAGE: &str = "AGENT_VALIDATION_PERCENTAGE";
pub const ENV_SHADOW: &str = "AGENT_SHADOW_MODE";
pub const ENV_THRESHOLD: &str = "AGENT_BREAKER_THRESHOLD";

/// Construction-time pipeline settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub enabled: bool,
    /// 0–100.
    pub percentage: u8,
    pub shadow_mode: bool,
    pub failure_threshold: u32,
}

impl Default for PipelineConfig {
    /// Conservative: gates off.
    fn default() -> Self {
        Self {
            enabled: false,
            percentage: 0,
            shadow_mode: false,
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
        }
    }
}

impl PipelineConfig {
    /// Read from `ENABLE_AGENT_VALIDATION` and friends.
    ///
    /// Booleans accept "1", "true" or "yes" (case-insensitive); anything else
    /// is false. Numeric values must parse and be in range.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self {
            enabled: lookup(ENV_ENABLED)
                .map(|v| parse_bool_value(&v))
                .unwrap_or(false),
            shadow_mode: lookup(ENV_SHADOW)
                .map(|v| parse_bool_value(&v))
                .unwrap_or(false),
            ..Self::default()
        };

        if let Some(raw) = lookup(ENV_PERCENTAGE) {
            config.percentage = parse_percentage(ENV_PERCENTAGE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_THRESHOLD) {
            config.failure_threshold =
                raw.trim()
                    .parse::<u32>()
                    .map_err(|_| ConfigError::InvalidThreshold {
                        var: ENV_THRESHOLD,
                        value: raw.clone(),
                    })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Settings for a rollout preset, default threshold.
    pub fn preset(preset: RolloutPreset) -> Self {
        let (enabled, percentage, shadow_mode) = preset.settings();
        Self {
            enabled,
            percentage,
            shadow_mode,
            ..Self::default()
        }
    }

    /// Bounds checks for values that may come from files.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.percentage > 100 {
            return Err(ConfigError::PercentageOutOfRange(u32::from(self.percentage)));
        }
        if self.failure_threshold == 0 {
            return Err(ConfigError::ZeroThreshold);
        }
        Ok(())
    }

    /// Preset these settings correspond to, if any.
    pub fn matching_preset(&self) -> Option<RolloutPreset> {
        RolloutPreset::all()
            .iter()
            .copied()
            .find(|p| p.settings() == (self.enabled, self.percentage, self.shadow_mode))
    }

    /// One-line summary for logs.
    pub fn summary(&self) -> String {
        format!(
            "Agent pipeline: enabled={}, percentage={}%, shadow={}, breaker_threshold={}",
            self.enabled, self.percentage, self.shadow_mode, self.failure_threshold
        )
    }
}

impl std::fmt::Display for PipelineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.summary())
    }
}

/// Deployment ladder for the gate chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RolloutPreset {
    /// Gates off for all content.
    Disabled,
    /// All content, report marked observe-only.
    Shadow,
    /// A quarter of content.
    Canary,
    /// All content.
    Full,
}

impl RolloutPreset {
    pub fn all() -> &'static [Self] {
        &[Self::Disabled, Self::Shadow, Self::Canary, Self::Full]
    }

    /// (enabled, percentage, shadow_mode)
    pub fn settings(self) -> (bool, u8, bool) {
        match self {
            Self::Disabled => (false, 0, false),
            Self::Shadow => (true, 100, true),
            Self::Canary => (true, 25, false),
            Self::Full => (true, 100, false),
        }
    }

    pub fn next(self) -> Option<Self> {
        match self {
            Self::Disabled => Some(Self::Shadow),
            Self::Shadow => Some(Self::Canary),
            Self::Canary => Some(Self::Full),
            Self::Full => None,
        }
    }

    pub fn prev(self) -> Option<Self> {
        match self {
            Self::Disabled => None,
            Self::Shadow => Some(Self::Disabled),
            Self::Canary => Some(Self::Shadow),
            Self::Full => Some(Self::Canary),
        }
    }
}

impl std::fmt::Display for RolloutPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disabled => write!(f, "disabled"),
            Self::Shadow => write!(f, "shadow"),
            Self::Canary => write!(f, "canary"),
            Self::Full => write!(f, "full"),
        }
    }
}

impl FromStr for RolloutPreset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "disabled" => Ok(Self::Disabled),
            "shadow" => Ok(Self::Shadow),
            "canary" => Ok(Self::Canary),
            "full" => Ok(Self::Full),
            other => Err(ConfigError::UnknownPreset(other.to_string())),
        }
    }
}

/// Parse a boolean from a raw string value.
/// Accepts "1", "true", or "yes" (case-insensitive).
fn parse_bool_value(value: &str) -> bool {
    let v = value.trim().to_lowercase();
    v == "1" || v == "true" || v == "yes"
}

fn parse_percentage(var: &'static str, raw: &str) -> Result<u8, ConfigError> {
    raw.trim()
        .parse::<u8>()
        .ok()
        .filter(|p| *p <= 100)
        .ok_or_else(|| ConfigError::InvalidPercentage {
            var,
            value: raw.to_string(),
        })
}

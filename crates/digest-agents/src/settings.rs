//! Command-line overrides layered on top of the environment configuration.

use gatekeeper::{ConfigError, FixupRules, PipelineConfig, RolloutPreset, RulesError};
use std::path::PathBuf;

/// Settings given on the command line. Unset fields keep the base value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub preset: Option<RolloutPreset>,
    pub enabled: Option<bool>,
    pub percentage: Option<u8>,
    pub shadow: Option<bool>,
    pub failure_threshold: Option<u32>,
    pub rules: Option<PathBuf>,
}

impl Overrides {
    /// Resolve against the environment.
    ///
    /// A preset replaces the environment's rollout settings wholesale;
    /// individual flags then adjust the result.
    pub fn resolve(&self) -> Result<PipelineConfig, ConfigError> {
        let base = PipelineConfig::from_env()?;
        self.apply(base)
    }

    pub fn apply(&self, base: PipelineConfig) -> Result<PipelineConfig, ConfigError> {
        let mut config = match self.preset {
            Some(preset) => PipelineConfig {
                failure_threshold: base.failure_threshold,
                ..PipelineConfig::preset(preset)
            },
            None => base,
        };
        if let Some(enabled) = self.enabled {
            config.enabled = enabled;
        }
        if let Some(percentage) = self.percentage {
            config.percentage = percentage;
        }
        if let Some(shadow) = self.shadow {
            config.shadow_mode = shadow;
        }
        if let Some(threshold) = self.failure_threshold {
            config.failure_threshold = threshold;
        }
        config.validate()?;
        Ok(config)
    }

    /// The rule table from `--rules`, or the built-in one.
    pub fn load_rules(&self) -> Result<FixupRules, RulesError> {
        match &self.rules {
            Some(path) => FixupRules::from_toml_file(path),
            None => Ok(FixupRules::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_overrides_keeps_base() {
        let base = PipelineConfig::preset(RolloutPreset::Canary);
        assert_eq!(Overrides::default().apply(base.clone()).unwrap(), base);
    }

    #[test]
    fn test_preset_keeps_base_threshold() {
        let base = PipelineConfig {
            failure_threshold: 7,
            ..PipelineConfig::default()
        };
        let overrides = Overrides {
            preset: Some(RolloutPreset::Shadow),
            ..Default::default()
        };
        let config = overrides.apply(base).unwrap();
        assert!(config.enabled);
        assert!(config.shadow_mode);
        assert_eq!(config.percentage, 100);
        assert_eq!(config.failure_threshold, 7);
    }

    #[test]
    fn test_flags_adjust_preset() {
        let overrides = Overrides {
            preset: Some(RolloutPreset::Full),
            percentage: Some(10),
            ..Default::default()
        };
        let config = overrides.apply(PipelineConfig::default()).unwrap();
        assert_eq!(config.percentage, 10);
        assert_eq!(config.matching_preset(), None);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let overrides = Overrides {
            percentage: Some(150),
            ..Default::default()
        };
        assert!(matches!(
            overrides.apply(PipelineConfig::default()),
            Err(ConfigError::PercentageOutOfRange(150))
        ));
    }

    #[test]
    fn test_rules_file_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.toml");
        std::fs::write(&path, "default_preview = \"Hot stove notes\"\n").unwrap();
        let overrides = Overrides {
            rules: Some(path),
            ..Default::default()
        };
        let rules = overrides.load_rules().unwrap();
        assert_eq!(rules.default_preview, "Hot stove notes");
    }
}

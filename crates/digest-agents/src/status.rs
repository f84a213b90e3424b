//! `status` output.

use gatekeeper::ValidationPipeline;
use serde_json::{json, Value};

/// Human-readable status, one fact per line.
pub fn render_text(pipeline: &ValidationPipeline) -> String {
    let config = pipeline.config();
    let preset = match config.matching_preset() {
        Some(preset) => {
            let next = preset
                .next()
                .map_or_else(|| "none".to_string(), |p| p.to_string());
            format!("Preset: {preset} (next stage: {next})")
        }
        None => "Preset: custom".to_string(),
    };
    let breaker = pipeline.breaker();
    let rules = pipeline.rules();
    [
        config.to_string(),
        preset,
        format!(
            "Breaker: {} ({}/{} failures)",
            breaker.state, breaker.failures, breaker.threshold
        ),
        format!(
            "Rules: {} misattributions, {} organizations",
            rules.misattributions.len(),
            rules.organizations.len()
        ),
    ]
    .join("\n")
}

pub fn render_json(pipeline: &ValidationPipeline) -> Value {
    let config = pipeline.config();
    json!({
        "config": config,
        "preset": config.matching_preset(),
        "breaker": pipeline.breaker(),
        "rules": {
            "misattributions": pipeline.rules().misattributions.len(),
            "organizations": pipeline.rules().organizations.len(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatekeeper::{FixupRules, PipelineConfig, RolloutPreset};

    #[test]
    fn test_text_reports_rule_table_size() {
        let pipeline = ValidationPipeline::new(PipelineConfig::preset(RolloutPreset::Canary));
        let text = render_text(&pipeline);
        assert!(text.contains("Preset: canary (next stage: full)"));
        assert!(text.contains("Breaker: closed (0/3 failures)"));
        assert!(text.contains("Rules: 2 misattributions, 8 organizations"));
    }

    #[test]
    fn test_text_counts_custom_rules() {
        let rules = FixupRules::from_toml_str(
            "organizations = [\"Tigers\"]\nmisattributions = []\n",
        )
        .unwrap();
        let pipeline = ValidationPipeline::with_rules(
            PipelineConfig {
                percentage: 40,
                ..PipelineConfig::preset(RolloutPreset::Full)
            },
            rules,
        );
        let text = render_text(&pipeline);
        assert!(text.contains("Preset: custom"));
        assert!(text.contains("Rules: 0 misattributions, 1 organizations"));
    }

    #[test]
    fn test_json_shape() {
        let pipeline = ValidationPipeline::new(PipelineConfig::preset(RolloutPreset::Full));
        let status = render_json(&pipeline);
        assert_eq!(status["preset"], "full");
        assert_eq!(status["breaker"]["state"], "closed");
        assert_eq!(status["rules"]["organizations"], 8);
    }
}

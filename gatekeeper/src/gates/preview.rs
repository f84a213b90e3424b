//! Replaces empty or placeholder previews with a topic line built from the
//! summary. Never blocks.

use super::{Gate, GateOutcome};
use crate::error::GateResult;
use crate::record::ContentRecord;
use crate::rules::FixupRules;

pub const NAME: &str = "preview_agent";

const CONFIDENCE: f64 = 0.8;
const BULLETS_SCANNED: usize = 3;
const NAMES_PER_BULLET: usize = 2;
const MAX_TOPICS: usize = 4;
const FALLBACK_CHARS: usize = 100;

pub struct PreviewGate;

impl Gate for PreviewGate {
    fn name(&self) -> &'static str {
        NAME
    }

    fn check(&self, record: &mut ContentRecord, rules: &FixupRules) -> GateResult<GateOutcome> {
        let mut fixes = Vec::new();

        let current = record.preview.as_deref().unwrap_or_default();
        if current.is_empty() || rules.is_placeholder_preview(current) {
            let generated = generate_preview(record.bullets(), rules);
            if !generated.is_empty() {
                record.preview = Some(generated);
                fixes.push("Generated intelligent preview from content".to_string());
            }
        }

        Ok(
            GateOutcome::from_fixes(NAME, "Preview generation completed", fixes)
                .with_confidence(CONFIDENCE),
        )
    }
}

/// Build a preview from the leading summary bullets.
///
/// Collects person-like names and known organizations, deduplicated in
/// first-seen order. Falls back to the (truncated) first bullet, then to the
/// table's default phrase.
pub fn generate_preview(summary: &[String], rules: &FixupRules) -> String {
    let Some(first) = summary.first() else {
        return rules.default_preview.clone();
    };

    let mut topics: Vec<String> = Vec::new();
    for insight in summary.iter().take(BULLETS_SCANNED) {
        topics.extend(
            rules
                .name_pattern
                .find_iter(insight)
                .take(NAMES_PER_BULLET)
                .map(|m| m.as_str().to_string()),
        );

        if let Some(org) = rules
            .organizations
            .iter()
            .find(|org| insight.contains(org.as_str()) && !topics.contains(org))
        {
            topics.push(org.clone());
        }
    }

    let mut unique: Vec<String> = Vec::with_capacity(topics.len());
    for topic in topics {
        if !unique.contains(&topic) {
            unique.push(topic);
        }
    }

    if !unique.is_empty() {
        unique.truncate(MAX_TOPICS);
        return unique.join(", ");
    }

    if first.chars().count() > FALLBACK_CHARS {
        let truncated: String = first.chars().take(FALLBACK_CHARS).collect();
        format!("{truncated}...")
    } else {
        first.clone()
    }
}

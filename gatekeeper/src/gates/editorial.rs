//! Editorial gate: title format and entity attribution fixes.
//!
//! Never fails on content; only repairs. An unparseable date is a gate
//! error and is reported by the guarded adapter.

use super::{Gate, GateOutcome};
use crate::error::{GateError, GateResult};
use crate::record::ContentRecord;
use crate::rules::FixupRules;
use chrono::NaiveDate;

pub const NAME: &str = "editorial_agent";

const CLEAN_CONFIDENCE: f64 = 0.9;
const FIXED_CONFIDENCE: f64 = 0.7;

pub struct EditorialGate;

impl Gate for EditorialGate {
    fn name(&self) -> &'static str {
        NAME
    }

    fn check(&self, record: &mut ContentRecord, rules: &FixupRules) -> GateResult<GateOutcome> {
        let mut fixes = Vec::new();

        if let Some(title) = record.title_text() {
            if !rules.is_standard_title(title) {
                let new_title = canonical_title(title, record.date.as_deref())?;
                if new_title != title {
                    fixes.push(format!("Fixed title format: '{title}' -> '{new_title}'"));
                    record.title = Some(new_title);
                }
            }
        }

        if let Some(summary) = record.summary.as_mut() {
            for (i, insight) in summary.iter_mut().enumerate() {
                if !rules.has_misattribution(insight) {
                    continue;
                }
                let fixed = rules.repair_misattributions(insight);
                if fixed != *insight {
                    *insight = fixed;
                    fixes.push(format!("Fixed team assignment in insight {i}"));
                }
            }
        }

        let confidence = if fixes.is_empty() {
            CLEAN_CONFIDENCE
        } else {
            FIXED_CONFIDENCE
        };
        let message = format!("Editorial validation completed with {} fixes", fixes.len());
        Ok(GateOutcome::from_fixes(NAME, message, fixes).with_confidence(confidence))
    }
}

/// Rewrite a title as `Chat: Aug 5` / `Mailbag: Aug 5`.
///
/// The post kind comes from a case-insensitive substring match. Titles that
/// are neither are returned unchanged.
pub fn canonical_title(title: &str, date: Option<&str>) -> GateResult<String> {
    let lowered = title.to_lowercase();
    let kind = if lowered.contains("chat") {
        "Chat"
    } else if lowered.contains("mailbag") {
        "Mailbag"
    } else {
        return Ok(title.to_string());
    };

    match date.filter(|d| !d.is_empty()) {
        Some(date) => Ok(format!("{kind}: {}", short_date(date)?)),
        None => Ok(format!("{kind}: Recent")),
    }
}

/// `2025-08-05` → `Aug 5`.
fn short_date(date: &str) -> GateResult<String> {
    let parsed =
        NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| GateError::InvalidDate {
            value: date.to_string(),
        })?;
    Ok(parsed.format("%b %-d").to_string())
}

//! Final readiness check before rendering.

use super::{Gate, GateOutcome};
use crate::error::{GateResult, ValidationFault};
use crate::record::ContentRecord;
use crate::rules::FixupRules;

pub const NAME: &str = "publisher_agent";

pub struct PublisherGate;

impl Gate for PublisherGate {
    fn name(&self) -> &'static str {
        NAME
    }

    fn check(&self, record: &mut ContentRecord, _rules: &FixupRules) -> GateResult<GateOutcome> {
        let missing = missing_required_fields(record);
        if !missing.is_empty() {
            return Ok(GateOutcome::fail(
                NAME,
                &ValidationFault::MissingRequiredFields(missing),
            ));
        }
        Ok(GateOutcome::pass(NAME, "Ready for publication"))
    }
}

/// Names of required fields that are absent or empty, in check order.
pub fn missing_required_fields(record: &ContentRecord) -> Vec<String> {
    [
        ("title", record.has_title()),
        ("summary", record.has_summary()),
        ("pairs", record.has_pairs()),
    ]
    .into_iter()
    .filter(|(_, present)| !present)
    .map(|(name, _)| name.to_string())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gates::Verdict;

    fn complete() -> ContentRecord {
        ContentRecord {
            title: Some("Chat: Aug 27".into()),
            summary: Some(vec!["Cubs discussion ongoing".into()]),
            pairs: Some(vec![("Steve Adams".into(), "Hello".into())]),
            ..Default::default()
        }
    }

    #[test]
    fn test_complete_record_passes() {
        let mut record = complete();
        let outcome = PublisherGate
            .check(&mut record, &FixupRules::default())
            .unwrap();
        assert_eq!(outcome.verdict, Verdict::Pass);
        assert_eq!(outcome.confidence, 1.0);
    }

    #[test]
    fn test_missing_summary_fails() {
        let mut record = ContentRecord {
            summary: None,
            ..complete()
        };
        let outcome = PublisherGate
            .check(&mut record, &FixupRules::default())
            .unwrap();
        assert_eq!(outcome.verdict, Verdict::Fail);
        assert!(outcome.message.contains("summary"));
    }

    #[test]
    fn test_empty_values_count_as_missing() {
        let record = ContentRecord {
            title: Some(String::new()),
            summary: Some(Vec::new()),
            pairs: Some(Vec::new()),
            ..Default::default()
        };
        assert_eq!(
            missing_required_fields(&record),
            vec!["title", "summary", "pairs"]
        );
    }
}

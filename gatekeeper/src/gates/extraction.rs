//! Extraction gate (critical).
//!
//! Fails closed when the scraper produced nothing; patches an empty
//! transcript so downstream rendering has something to show.

use super::{Gate, GateOutcome};
use crate::error::{GateError, GateResult, ValidationFault};
use crate::record::ContentRecord;
use crate::rules::FixupRules;
use std::io::ErrorKind;

pub const NAME: &str = "extraction_agent";

pub const FALLBACK_SPEAKER: &str = "System";
pub const FALLBACK_TEXT: &str = "Content extraction in progress - please check back later.";

pub struct ExtractionGate;

impl Gate for ExtractionGate {
    fn name(&self) -> &'static str {
        NAME
    }

    fn check(&self, record: &mut ContentRecord, _rules: &FixupRules) -> GateResult<GateOutcome> {
        let Some(path) = record.raw_data_path.as_ref() else {
            return Ok(GateOutcome::fail(
                NAME,
                &ValidationFault::MissingRawData { path: None },
            ));
        };

        let metadata = match std::fs::metadata(path) {
            Ok(m) => m,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Ok(GateOutcome::fail(
                    NAME,
                    &ValidationFault::MissingRawData {
                        path: Some(path.clone()),
                    },
                ));
            }
            Err(source) => {
                return Err(GateError::Io {
                    path: path.clone(),
                    source,
                })
            }
        };

        if metadata.len() == 0 {
            return Ok(GateOutcome::fail(
                NAME,
                &ValidationFault::EmptyRawData { path: path.clone() },
            ));
        }

        let mut fixes = Vec::new();
        if !record.has_pairs() {
            record.pairs = Some(vec![(
                FALLBACK_SPEAKER.to_string(),
                FALLBACK_TEXT.to_string(),
            )]);
            fixes.push("Generated fallback content for empty transcript".to_string());
        }

        Ok(GateOutcome::from_fixes(
            NAME,
            "Content extraction validated",
            fixes,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gates::Verdict;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn raw_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn check(record: &mut ContentRecord) -> GateOutcome {
        ExtractionGate
            .check(record, &FixupRules::default())
            .unwrap()
    }

    #[test]
    fn test_missing_path_fails() {
        let mut record = ContentRecord::default();
        let outcome = check(&mut record);
        assert_eq!(outcome.verdict, Verdict::Fail);
        assert_eq!(outcome.message, "Raw data file missing - cannot proceed");
    }

    #[test]
    fn test_nonexistent_path_fails() {
        let mut record = ContentRecord {
            raw_data_path: Some("/nonexistent/raw_extracted_data.txt".into()),
            ..Default::default()
        };
        assert!(check(&mut record).is_fail());
    }

    #[test]
    fn test_empty_file_fails() {
        let file = raw_file("");
        let mut record = ContentRecord {
            raw_data_path: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let outcome = check(&mut record);
        assert!(outcome.is_fail());
        assert_eq!(outcome.message, "Raw data empty - likely 404 URL");
    }

    #[test]
    fn test_empty_pairs_get_fallback() {
        let file = raw_file("Q: who wins?\nA: nobody");
        let mut record = ContentRecord {
            raw_data_path: Some(file.path().to_path_buf()),
            pairs: Some(Vec::new()),
            ..Default::default()
        };
        let outcome = check(&mut record);
        assert_eq!(outcome.verdict, Verdict::Warning);
        assert_eq!(outcome.fixes.len(), 1);
        let pairs = record.pairs.unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].0, "System");
    }

    #[test]
    fn test_existing_pairs_pass_untouched() {
        let file = raw_file("transcript");
        let pairs = vec![("Steve Adams".to_string(), "Hi all".to_string())];
        let mut record = ContentRecord {
            raw_data_path: Some(file.path().to_path_buf()),
            pairs: Some(pairs.clone()),
            ..Default::default()
        };
        let outcome = check(&mut record);
        assert_eq!(outcome.verdict, Verdict::Pass);
        assert!(outcome.fixes.is_empty());
        assert_eq!(outcome.confidence, 1.0);
        assert_eq!(record.pairs, Some(pairs));
    }
}

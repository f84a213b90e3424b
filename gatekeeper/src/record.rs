//! The unit of work flowing through the gates.
//!
//! A record is produced upstream (feed poller, transcript scraper,
//! summariser) and consumed downstream by the page renderer. The gates
//! borrow it mutably and repair a handful of named fields in place.
//!
//! Every known field is optional so that an absent key stays absent after a
//! round trip, and unknown keys are carried through `extra` untouched.

use crate::report::ValidationReport;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Identifier used for routing when a record carries no URL.
pub const UNKNOWN_IDENTIFIER: &str = "unknown";

/// A single speaker/text exchange from a transcript.
pub type Pair = (String, String);

/// One piece of generated content awaiting publication.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Ordered (speaker, text) pairs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pairs: Option<Vec<Pair>>,
    /// Ordered summary bullets ("insights").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_data_path: Option<PathBuf>,
    /// Publication date, `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// `chat`, `mailbag`, ...
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_type: Option<String>,
    /// Written by the pipeline only, never read by it.
    #[serde(
        rename = "_agent_validation",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub validation: Option<ValidationReport>,
    /// Fields this crate does not know about.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ContentRecord {
    /// Routing identifier: the URL, or `"unknown"`.
    pub fn identifier(&self) -> &str {
        self.url.as_deref().unwrap_or(UNKNOWN_IDENTIFIER)
    }

    /// Title if present and non-empty.
    pub fn title_text(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.is_empty())
    }

    /// Summary bullets, empty slice when absent.
    pub fn bullets(&self) -> &[String] {
        self.summary.as_deref().unwrap_or(&[])
    }

    pub fn has_pairs(&self) -> bool {
        self.pairs.as_ref().is_some_and(|p| !p.is_empty())
    }

    pub fn has_summary(&self) -> bool {
        self.summary.as_ref().is_some_and(|s| !s.is_empty())
    }

    pub fn has_title(&self) -> bool {
        self.title_text().is_some()
    }

    /// Parse from a JSON value.
    pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identifier_falls_back_to_unknown() {
        let record = ContentRecord::default();
        assert_eq!(record.identifier(), "unknown");

        let record = ContentRecord {
            url: Some("https://example.com/chat".into()),
            ..Default::default()
        };
        assert_eq!(record.identifier(), "https://example.com/chat");
    }

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let input = json!({
            "url": "https://example.com/a",
            "title": "Chat: Aug 5",
            "pairs": [["Steve Adams", "Hello"]],
            "html_path": "out/chat/2025-08-05/index.html",
            "model_used": "gemini"
        });
        let record = ContentRecord::from_json(input.clone()).unwrap();
        assert_eq!(record.pairs.as_ref().unwrap()[0].0, "Steve Adams");
        assert_eq!(record.extra.len(), 2);

        let output = serde_json::to_value(&record).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn test_absent_fields_stay_absent() {
        let record = ContentRecord::from_json(json!({ "url": "x" })).unwrap();
        let output = serde_json::to_value(&record).unwrap();
        assert_eq!(output, json!({ "url": "x" }));
        assert!(!record.has_summary());
        assert!(!record.has_pairs());
        assert!(!record.has_title());
    }

    #[test]
    fn test_empty_title_is_not_present() {
        let record = ContentRecord {
            title: Some(String::new()),
            ..Default::default()
        };
        assert!(record.title_text().is_none());
    }
}

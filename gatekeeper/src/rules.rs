//! Fix-up Rule Table
//!
//! Data describing known content defects and their repairs. The gates read
//! this table and never hardcode domain values themselves, so a deployment
//! can swap the sample table for its own via [`FixupRules::from_toml_file`].
//!
//! # File format
//!
//! ```toml
//! title_pattern = '^(Chat|Mailbag): [A-Z][a-z]{2} \d{1,2}$'
//! placeholder_phrases = ["summary generation in progress", ""]
//! organizations = ["Red Sox", "Yankees"]
//! default_preview = "Latest MLB discussion and analysis"
//!
//! [[misattributions]]
//! detect = "Red Sox.*Rice"
//! find = "Red Sox.*Ben Rice"
//! replace = "Yankees' Ben Rice"
//! ```
//!
//! Every key is optional; missing keys take the built-in sample values.
//! Misattribution patterns are matched case-insensitively.

use crate::error::RulesError;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::path::Path;

const TITLE_PATTERN: &str = r"^(Chat|Mailbag): [A-Z][a-z]{2} \d{1,2}$";
const NAME_PATTERN: &str = r"\b[A-Z][a-z]+ [A-Z][a-z]+\b";

/// A known entity/organization mix-up and, optionally, its repair.
#[derive(Debug, Clone)]
pub struct MisattributionRule {
    /// Flags a bullet as suspicious.
    pub detect: Regex,
    /// Substitution applied to a flagged bullet. Detection-only when `None`.
    pub repair: Option<Repair>,
}

/// A regex substitution. `replacement` supports `$1`/`$name` group refs.
#[derive(Debug, Clone)]
pub struct Repair {
    pub find: Regex,
    pub replacement: String,
}

impl MisattributionRule {
    /// Apply this rule to a bullet, returning the rewritten text when the
    /// rule both detects and repairs something.
    pub fn apply(&self, text: &str) -> Option<String> {
        if !self.detect.is_match(text) {
            return None;
        }
        let repair = self.repair.as_ref()?;
        if !repair.find.is_match(text) {
            return None;
        }
        Some(
            repair
                .find
                .replace_all(text, repair.replacement.as_str())
                .into_owned(),
        )
    }
}

/// Serializable form of a misattribution rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MisattributionSpec {
    pub detect: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub find: Option<String>,
    #[serde(default)]
    pub replace: String,
}

/// Serializable rule table, as read from TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleTableSpec {
    pub title_pattern: String,
    pub misattributions: Vec<MisattributionSpec>,
    pub placeholder_phrases: Vec<String>,
    pub organizations: Vec<String>,
    pub default_preview: String,
}

impl Default for RuleTableSpec {
    /// The sample table the digest shipped with.
    fn default() -> Self {
        Self {
            title_pattern: TITLE_PATTERN.to_string(),
            misattributions: vec![
                // Ben Rice plays for the Yankees.
                MisattributionSpec {
                    detect: "Red Sox.*Rice".into(),
                    find: Some("Red Sox.*Ben Rice".into()),
                    replace: "Yankees' Ben Rice".into(),
                },
                // Kyle Teel is a Red Sox prospect. No safe rewrite yet.
                MisattributionSpec {
                    detect: "Yankees.*Teel".into(),
                    find: None,
                    replace: String::new(),
                },
            ],
            placeholder_phrases: vec![
                "summary generation in progress".into(),
                "click to read the full summary".into(),
                "processing...".into(),
                String::new(),
            ],
            organizations: [
                "Red Sox", "Yankees", "Cubs", "Dodgers", "Orioles", "Rays", "Phillies", "Mets",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            default_preview: "Latest MLB discussion and analysis".into(),
        }
    }
}

/// Compiled rule table consumed by the gates.
#[derive(Debug, Clone)]
pub struct FixupRules {
    /// Canonical title format.
    pub title_pattern: Regex,
    /// `Capitalized Capitalized` name tokens for preview topics.
    pub name_pattern: Regex,
    pub misattributions: Vec<MisattributionRule>,
    /// Lowercase placeholder phrases, matched as substrings.
    pub placeholder_phrases: Vec<String>,
    pub organizations: Vec<String>,
    pub default_preview: String,
}

impl Default for FixupRules {
    fn default() -> Self {
        // The sample table is a compile-time constant and always compiles.
        match Self::compile(&RuleTableSpec::default()) {
            Ok(rules) => rules,
            Err(e) => unreachable!("built-in rule table is invalid: {e}"),
        }
    }
}

impl FixupRules {
    /// Compile a serializable table.
    pub fn compile(spec: &RuleTableSpec) -> Result<Self, RulesError> {
        let misattributions = spec
            .misattributions
            .iter()
            .map(|m| {
                let repair = match &m.find {
                    Some(find) => Some(Repair {
                        find: case_insensitive(find)?,
                        replacement: m.replace.clone(),
                    }),
                    None => None,
                };
                Ok(MisattributionRule {
                    detect: case_insensitive(&m.detect)?,
                    repair,
                })
            })
            .collect::<Result<Vec<_>, RulesError>>()?;

        Ok(Self {
            title_pattern: compile(&spec.title_pattern)?,
            name_pattern: compile(NAME_PATTERN)?,
            misattributions,
            placeholder_phrases: spec
                .placeholder_phrases
                .iter()
                .map(|p| p.to_lowercase())
                .collect(),
            organizations: spec.organizations.clone(),
            default_preview: spec.default_preview.clone(),
        })
    }

    /// Parse and compile a TOML rule table.
    pub fn from_toml_str(content: &str) -> Result<Self, RulesError> {
        let spec: RuleTableSpec = toml::from_str(content)?;
        Self::compile(&spec)
    }

    /// Load a TOML rule table from disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, RulesError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| RulesError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let rules = Self::from_toml_str(&content)?;
        tracing::info!(
            path = %path.display(),
            misattributions = rules.misattributions.len(),
            organizations = rules.organizations.len(),
            "Loaded fix-up rule table"
        );
        Ok(rules)
    }

    /// Whether a title already has the canonical form.
    pub fn is_standard_title(&self, title: &str) -> bool {
        self.title_pattern.is_match(title)
    }

    /// Whether a preview contains any placeholder phrase (case-insensitive).
    ///
    /// An empty phrase is a substring of everything, so a table listing it
    /// treats every preview as replaceable.
    pub fn is_placeholder_preview(&self, preview: &str) -> bool {
        let lowered = preview.to_lowercase();
        self.placeholder_phrases
            .iter()
            .any(|phrase| lowered.contains(phrase.as_str()))
    }

    /// Whether any misattribution rule flags the bullet.
    pub fn has_misattribution(&self, text: &str) -> bool {
        self.misattributions.iter().any(|r| r.detect.is_match(text))
    }

    /// Apply every repairing rule in order.
    pub fn repair_misattributions(&self, text: &str) -> String {
        self.misattributions
            .iter()
            .fold(text.to_string(), |acc, rule| rule.apply(&acc).unwrap_or(acc))
    }
}

fn compile(pattern: &str) -> Result<Regex, RulesError> {
    Regex::new(pattern).map_err(|source| RulesError::Pattern {
        pattern: pattern.to_string(),
        source,
    })
}

fn case_insensitive(pattern: &str) -> Result<Regex, RulesError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| RulesError::Pattern {
            pattern: pattern.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_compiles() {
        let rules = FixupRules::default();
        assert_eq!(rules.misattributions.len(), 2);
        assert_eq!(rules.organizations.len(), 8);
    }

    #[test]
    fn test_standard_title() {
        let rules = FixupRules::default();
        assert!(rules.is_standard_title("Chat: Aug 5"));
        assert!(rules.is_standard_title("Mailbag: Dec 25"));
        assert!(!rules.is_standard_title("MLBTR Live Chat"));
        assert!(!rules.is_standard_title("Chat: August 5"));
        assert!(!rules.is_standard_title("chat: Aug 5"));
    }

    #[test]
    fn test_placeholder_preview() {
        let rules = FixupRules::default();
        assert!(rules.is_placeholder_preview(""));
        assert!(rules.is_placeholder_preview("Summary generation in progress..."));
        assert!(rules.is_placeholder_preview("PROCESSING..."));
        // The default table lists the empty phrase.
        assert!(rules.is_placeholder_preview("Aaron Judge, Red Sox"));
    }

    #[test]
    fn test_placeholder_table_without_empty_phrase() {
        let rules = FixupRules::from_toml_str(
            "placeholder_phrases = [\"Summary generation in progress\"]\n",
        )
        .unwrap();
        assert!(rules.is_placeholder_preview("summary generation in progress..."));
        assert!(!rules.is_placeholder_preview("Aaron Judge, Red Sox"));
        assert!(!rules.is_placeholder_preview(""));
    }

    #[test]
    fn test_misattribution_repair() {
        let rules = FixupRules::default();
        let bullet = "The Red Sox could call up Ben Rice soon";
        assert!(rules.has_misattribution(bullet));
        assert_eq!(
            rules.repair_misattributions(bullet),
            "The Yankees' Ben Rice soon"
        );
    }

    #[test]
    fn test_detection_only_rule_leaves_text() {
        let rules = FixupRules::default();
        let bullet = "Yankees prospect Kyle Teel is rising";
        assert!(rules.has_misattribution(bullet));
        assert_eq!(rules.repair_misattributions(bullet), bullet);
    }

    #[test]
    fn test_misattribution_is_case_insensitive() {
        let rules = FixupRules::default();
        assert!(rules.has_misattribution("red sox and ben rice"));
    }

    #[test]
    fn test_toml_overrides_and_defaults() {
        let rules = FixupRules::from_toml_str(
            r#"
            organizations = ["Cubs"]
            default_preview = "Fresh notes"

            [[misattributions]]
            detect = "Mets.*Soto"
            find = "Mets' (\\w+) Soto"
            replace = "Mets star $1 Soto"
            "#,
        )
        .unwrap();
        assert_eq!(rules.organizations, vec!["Cubs".to_string()]);
        assert_eq!(rules.default_preview, "Fresh notes");
        assert!(rules.is_standard_title("Chat: Aug 5"));
        assert_eq!(
            rules.repair_misattributions("The Mets' Juan Soto homered"),
            "The Mets star Juan Soto homered"
        );
    }

    #[test]
    fn test_bad_pattern_is_rejected() {
        let err = FixupRules::from_toml_str(
            r#"
            [[misattributions]]
            detect = "("
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, RulesError::Pattern { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = FixupRules::from_toml_file("/nonexistent/rules.toml").unwrap_err();
        assert!(matches!(err, RulesError::Read { .. }));
    }
}

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::extractor::Locator;

/// Maximum snippet length in chars; longer offending text is clipped.
pub const MAX_SNIPPET_CHARS: usize = 120;

/// Closed (but extensible) set of translation defect categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    LanguageLeakage,
    GrammarError,
    SpellingError,
    PlaceholderError,
    ConsistencyError,
    FormattingError,
}

impl IssueType {
    pub const ALL: [IssueType; 6] = [
        IssueType::LanguageLeakage,
        IssueType::GrammarError,
        IssueType::SpellingError,
        IssueType::PlaceholderError,
        IssueType::ConsistencyError,
        IssueType::FormattingError,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::LanguageLeakage => "language_leakage",
            IssueType::GrammarError => "grammar_error",
            IssueType::SpellingError => "spelling_error",
            IssueType::PlaceholderError => "placeholder_error",
            IssueType::ConsistencyError => "consistency_error",
            IssueType::FormattingError => "formatting_error",
        }
    }
}

impl Display for IssueType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordinal severity; affects report sort order and the CLI exit-code policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Low, Severity::Medium, Severity::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One located, typed, confidence-scored translation defect. The locator is
/// always traceable to an extracted block, or is the document locator for
/// whole-page findings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Unique within one report; stable for a given input and config.
    /// Assigned by the aggregator after final ordering.
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: IssueType,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    pub snippet: String,
    pub locator: Locator,
    pub confidence: f64,
}

/// Clip offending text to a bounded snippet, on a char boundary.
pub fn clip_snippet(text: &str) -> String {
    if text.chars().count() <= MAX_SNIPPET_CHARS {
        return text.to_string();
    }
    let clipped: String = text.chars().take(MAX_SNIPPET_CHARS).collect();
    format!("{clipped}…")
}

/// A verifier that failed; recorded for diagnostics only, never blocks
/// report delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifierFailure {
    pub verifier: String,
    pub error: String,
}

/// Summary tallies. Every enumerated severity and type key is present even
/// when its count is zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub total_issues: usize,
    pub issues_by_severity: BTreeMap<Severity, usize>,
    pub issues_by_type: BTreeMap<IssueType, usize>,
    pub total_text_blocks: usize,
    /// Share of the document in the configured target language, 0-100.
    pub target_language_percentage: f64,
    /// Full language mix as percentages 0-100.
    pub detected_languages: BTreeMap<String, f64>,
}

impl Stats {
    pub fn empty() -> Self {
        Self {
            total_issues: 0,
            issues_by_severity: Severity::ALL.iter().map(|s| (*s, 0)).collect(),
            issues_by_type: IssueType::ALL.iter().map(|t| (*t, 0)).collect(),
            total_text_blocks: 0,
            target_language_percentage: 0.0,
            detected_languages: BTreeMap::new(),
        }
    }
}

/// Final immutable analysis result. Constructed once per run by the
/// aggregator; downstream consumers (CLI/API/GUI) read it as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub url: String,
    pub target_language: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Wall-clock processing time in seconds.
    pub processing_time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_title: Option<String>,
    /// Ordered: severity high to low, then document order.
    pub issues: Vec<Issue>,
    pub stats: Stats,
    /// Diagnostics for verifiers that failed; does not affect `success`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub verifier_failures: Vec<VerifierFailure>,
}

impl AnalysisReport {
    /// Report for a fatal fetch/extraction failure: no issues, zeroed stats.
    pub fn failure(
        url: &str,
        target_language: &str,
        error_message: String,
        processing_time: f64,
    ) -> Self {
        Self {
            url: url.to_string(),
            target_language: target_language.to_string(),
            success: false,
            error_message: Some(error_message),
            processing_time,
            page_title: None,
            issues: Vec::new(),
            stats: Stats::empty(),
            verifier_failures: Vec::new(),
        }
    }

    pub fn has_high_severity(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::High)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
    }

    #[test]
    fn test_issue_type_serde_names() {
        let json = serde_json::to_string(&IssueType::LanguageLeakage).unwrap();
        assert_eq!(json, "\"language_leakage\"");
        assert_eq!(IssueType::SpellingError.to_string(), "spelling_error");
    }

    #[test]
    fn test_empty_stats_enumerates_all_keys() {
        let stats = Stats::empty();
        assert_eq!(stats.issues_by_severity.len(), Severity::ALL.len());
        assert_eq!(stats.issues_by_type.len(), IssueType::ALL.len());
        assert!(stats.issues_by_type.values().all(|&v| v == 0));
    }

    #[test]
    fn test_clip_snippet() {
        let short = "short text";
        assert_eq!(clip_snippet(short), short);
        let long = "x".repeat(500);
        let clipped = clip_snippet(&long);
        assert_eq!(clipped.chars().count(), MAX_SNIPPET_CHARS + 1);
        assert!(clipped.ends_with('…'));
    }
}

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::config::AnalyzerConfig;
use crate::extractor::{Locator, TextBlock};
use crate::language::{LanguageDetect, LanguageMix};
use crate::report::{Issue, IssueType, Severity, clip_snippet};
use crate::verify::{Verifier, VerifierError};

/// Detects residual foreign-language text, both per block and at document
/// scope via the aggregated language mix.
pub struct LanguageLeakageVerifier {
    detector: Arc<dyn LanguageDetect>,
}

impl LanguageLeakageVerifier {
    pub fn new(detector: Arc<dyn LanguageDetect>) -> Self {
        Self { detector }
    }

    fn block_issues(&self, blocks: &[TextBlock], config: &AnalyzerConfig) -> Vec<Issue> {
        let target = &config.target.language;
        let floor = config.confidence_floors.leakage;
        let mut issues = Vec::new();

        for block in blocks {
            if is_whitelisted(&block.text, &config.rules.whitelist) {
                continue;
            }
            let detection = self.detector.detect(&block.text);
            let Some((lang, confidence)) = detection.top() else {
                continue;
            };
            if lang == target.as_str() || confidence < floor {
                continue;
            }
            let severity = if confidence >= 0.95 {
                Severity::High
            } else {
                Severity::Medium
            };
            issues.push(Issue {
                id: String::new(),
                kind: IssueType::LanguageLeakage,
                severity,
                message: format!(
                    "text appears to be in '{}' instead of '{}'",
                    lang, target
                ),
                suggestion: None,
                snippet: clip_snippet(&block.text),
                locator: block.locator.clone(),
                confidence,
            });
        }
        issues
    }

    /// Single document-scope issue when the non-target share of the language
    /// mix exceeds the leak threshold. High severity when the non-target
    /// share exceeds 1.5x the threshold.
    fn document_issue(&self, mix: &LanguageMix, config: &AnalyzerConfig) -> Option<Issue> {
        if mix.is_empty() {
            return None;
        }
        let threshold = config.rules.leak_threshold;
        let target_share = mix.probability(&config.target.language);
        let non_target = (1.0 - target_share).max(0.0);
        if non_target <= threshold {
            return None;
        }

        let severity = if non_target > 1.5 * threshold {
            Severity::High
        } else {
            Severity::Medium
        };
        let confidence = if threshold > 0.0 {
            (non_target / (2.0 * threshold)).min(1.0)
        } else {
            1.0
        };
        debug!(
            "document leakage: target share {:.1}%, threshold {:.1}%",
            target_share * 100.0,
            threshold * 100.0
        );
        Some(Issue {
            id: String::new(),
            kind: IssueType::LanguageLeakage,
            severity,
            message: format!(
                "only {:.1}% of the page is in '{}' ({:.1}% non-target, threshold {:.1}%)",
                target_share * 100.0,
                config.target.language,
                non_target * 100.0,
                threshold * 100.0
            ),
            suggestion: None,
            snippet: String::new(),
            locator: Locator::document(),
            confidence,
        })
    }
}

#[async_trait]
impl Verifier for LanguageLeakageVerifier {
    fn name(&self) -> &'static str {
        "language_leakage"
    }

    async fn verify(
        &self,
        blocks: &[TextBlock],
        mix: &LanguageMix,
        config: &AnalyzerConfig,
    ) -> Result<Vec<Issue>, VerifierError> {
        let mut issues = Vec::new();
        if let Some(issue) = self.document_issue(mix, config) {
            issues.push(issue);
        }
        issues.extend(self.block_issues(blocks, config));
        Ok(issues)
    }
}

/// A block is covered by the whitelist when nothing alphabetic remains after
/// removing every whitelisted term or phrase (case-insensitively).
fn is_whitelisted(text: &str, whitelist: &BTreeSet<String>) -> bool {
    if whitelist.is_empty() {
        return false;
    }
    let mut remainder = text.to_lowercase();
    for term in whitelist {
        let term = term.to_lowercase();
        if term.is_empty() {
            continue;
        }
        remainder = remainder.replace(&term, " ");
    }
    !remainder.chars().any(|c| c.is_alphabetic())
}

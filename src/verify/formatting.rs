use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use crate::config::AnalyzerConfig;
use crate::extractor::TextBlock;
use crate::language::LanguageMix;
use crate::report::{Issue, IssueType, Severity, clip_snippet};
use crate::verify::{Verifier, VerifierError};

static SENTENCE_SPLIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]+\s+").unwrap());

// Letter glued to sentence punctuation, as in "visita.Gracias".
static MISSING_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?,:;][A-Za-z]").unwrap());

// Lowercase letter followed later by an uppercase one, as in "our Best offer".
static MIXED_CASE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\p{Ll}.*\p{Lu}").unwrap());

const HEADING_TAGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

/// Surface-level formatting checks: sentence capitalization, spacing after
/// punctuation, Spanish inverted marks, and heading capitalization. All
/// low-severity; these are style signals, not hard errors.
#[derive(Debug, Default)]
pub struct FormattingVerifier;

impl FormattingVerifier {
    pub fn new() -> Self {
        Self
    }

    fn scan_block(&self, block: &TextBlock, config: &AnalyzerConfig) -> Vec<Issue> {
        let mut issues = Vec::new();
        let text = block.text.as_str();

        for sentence in SENTENCE_SPLIT.split(text) {
            let sentence = sentence.trim();
            if sentence.chars().count() < 3 {
                continue;
            }
            if let Some(first) = sentence.chars().next()
                && first.is_lowercase()
                && first.is_alphabetic()
            {
                let capitalized: String = first
                    .to_uppercase()
                    .chain(sentence.chars().skip(1).take(30))
                    .collect();
                issues.push(self.issue(
                    block,
                    "sentence does not start with a capital letter",
                    Some(clip_snippet(&capitalized)),
                    sentence,
                    0.7,
                ));
            }
        }

        for m in MISSING_SPACE.find_iter(text) {
            let glued = m.as_str();
            let mut spaced = String::with_capacity(3);
            let mut chars = glued.chars();
            if let Some(punct) = chars.next() {
                spaced.push(punct);
                spaced.push(' ');
                spaced.extend(chars);
            }
            issues.push(self.issue(
                block,
                "missing space after punctuation",
                Some(spaced),
                glued,
                0.8,
            ));
        }

        if config.target.language == "es" {
            if text.contains('?') && !text.contains('¿') {
                issues.push(self.issue(
                    block,
                    "question without opening '¿'",
                    None,
                    text,
                    0.6,
                ));
            }
            if text.contains('!') && !text.contains('¡') {
                issues.push(self.issue(
                    block,
                    "exclamation without opening '¡'",
                    None,
                    text,
                    0.6,
                ));
            }
        }

        if HEADING_TAGS.contains(&block.tag.as_str()) && MIXED_CASE.is_match(text) {
            issues.push(self.issue(
                block,
                "heading uses inconsistent capitalization",
                None,
                text,
                0.4,
            ));
        }

        issues
    }

    fn issue(
        &self,
        block: &TextBlock,
        message: &str,
        suggestion: Option<String>,
        snippet: &str,
        confidence: f64,
    ) -> Issue {
        Issue {
            id: String::new(),
            kind: IssueType::FormattingError,
            severity: Severity::Low,
            message: message.to_string(),
            suggestion,
            snippet: clip_snippet(snippet),
            locator: block.locator.clone(),
            confidence,
        }
    }
}

#[async_trait]
impl Verifier for FormattingVerifier {
    fn name(&self) -> &'static str {
        "formatting"
    }

    async fn verify(
        &self,
        blocks: &[TextBlock],
        _mix: &LanguageMix,
        config: &AnalyzerConfig,
    ) -> Result<Vec<Issue>, VerifierError> {
        Ok(blocks
            .iter()
            .flat_map(|block| self.scan_block(block, config))
            .collect())
    }
}

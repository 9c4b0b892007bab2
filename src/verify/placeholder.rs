use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use crate::config::AnalyzerConfig;
use crate::extractor::TextBlock;
use crate::language::LanguageMix;
use crate::report::{Issue, IssueType, Severity};
use crate::verify::{Verifier, VerifierError};

// Unambiguous template syntaxes: these never belong in rendered text.
static DOUBLE_CURLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{[^{}]*\}\}").unwrap());
static DOLLAR_BRACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\{[^}]*\}").unwrap());
static PRINTF_STYLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%(?:\d+\$)?[sdifgeEGxX]\b").unwrap());

// Bare `{name}` is only flagged when the content is identifier-like, since
// plain braces occur in legitimate prose.
static SINGLE_CURLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[A-Za-z_][A-Za-z0-9_.]*\}").unwrap());

/// Flags template placeholders that survived into rendered visible text:
/// `{{name}}`, `${var}`, printf-style `%s`, and identifier-like `{name}`.
#[derive(Debug, Default)]
pub struct PlaceholderVerifier;

impl PlaceholderVerifier {
    pub fn new() -> Self {
        Self
    }

    fn scan_block(&self, block: &TextBlock, config: &AnalyzerConfig) -> Vec<Issue> {
        let mut issues = Vec::new();
        let mut scratch = block.text.clone();

        // Scan the unambiguous syntaxes first and blank out their matches so
        // the bare-brace pattern cannot re-match inside them.
        for pattern in [&*DOUBLE_CURLY, &*DOLLAR_BRACES, &*PRINTF_STYLE] {
            let found: Vec<(usize, usize, String)> = pattern
                .find_iter(&scratch)
                .map(|m| (m.start(), m.end(), m.as_str().to_string()))
                .collect();
            for (start, end, token) in found {
                scratch.replace_range(start..end, &" ".repeat(end - start));
                if let Some(issue) = self.issue_for(block, &token, 0.9, config) {
                    issues.push(issue);
                }
            }
        }

        for m in SINGLE_CURLY.find_iter(&scratch) {
            if let Some(issue) = self.issue_for(block, m.as_str(), 0.6, config) {
                issues.push(issue);
            }
        }
        issues
    }

    fn issue_for(
        &self,
        block: &TextBlock,
        token: &str,
        confidence: f64,
        config: &AnalyzerConfig,
    ) -> Option<Issue> {
        if confidence < config.confidence_floors.placeholder {
            return None;
        }
        if config.rules.whitelist.contains(&token.to_lowercase()) {
            return None;
        }
        Some(Issue {
            id: String::new(),
            kind: IssueType::PlaceholderError,
            severity: Severity::Medium,
            message: format!("untranslated template placeholder '{token}'"),
            suggestion: None,
            snippet: token.to_string(),
            locator: block.locator.clone(),
            confidence,
        })
    }
}

#[async_trait]
impl Verifier for PlaceholderVerifier {
    fn name(&self) -> &'static str {
        "placeholder"
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::Locator;
    use std::collections::BTreeMap;

    fn block(text: &str) -> TextBlock {
        TextBlock {
            text: text.to_string(),
            locator: Locator::document().child("p", 1),
            tag: "p".to_string(),
            attributes: BTreeMap::new(),
            is_visible: true,
        }
    }

    async fn scan(text: &str) -> Vec<Issue> {
        let cfg = AnalyzerConfig::default();
        PlaceholderVerifier::new()
            .verify(&[block(text)], &LanguageMix::default(), &cfg)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_handlebars_flagged() {
        let issues = scan("Bienvenido {{user_name}} a nuestro sitio").await;
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].snippet, "{{user_name}}");
        assert_eq!(issues[0].confidence, 0.9);
        assert_eq!(issues[0].kind, IssueType::PlaceholderError);
    }

    #[tokio::test]
    async fn test_dollar_and_printf_flagged() {
        let issues = scan("Hay ${count} artículos, %s restantes").await;
        assert_eq!(issues.len(), 2);
        let snippets: Vec<&str> = issues.iter().map(|i| i.snippet.as_str()).collect();
        assert!(snippets.contains(&"${count}"));
        assert!(snippets.contains(&"%s"));
    }

    #[tokio::test]
    async fn test_identifier_like_single_braces_flagged() {
        let issues = scan("Hola {firstName}, gracias por venir").await;
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].snippet, "{firstName}");
        assert_eq!(issues[0].confidence, 0.6);
    }

    #[tokio::test]
    async fn test_prose_braces_not_flagged() {
        let issues = scan("el conjunto {1, 2, 3} es finito").await;
        assert!(issues.is_empty());
    }

    #[tokio::test]
    async fn test_double_braces_not_double_counted() {
        let issues = scan("texto {{solo_uno}} aquí").await;
        assert_eq!(issues.len(), 1);
    }

    #[tokio::test]
    async fn test_whitelisted_token_skipped() {
        let mut cfg = AnalyzerConfig::default();
        cfg.rules.whitelist.insert("{enter}".to_string());
        let issues = PlaceholderVerifier::new()
            .verify(
                &[block("pulse {enter} para continuar")],
                &LanguageMix::default(),
                &cfg,
            )
            .await
            .unwrap();
        assert!(issues.is_empty());
    }

    #[tokio::test]
    async fn test_floor_suppresses_low_confidence_tokens() {
        let mut cfg = AnalyzerConfig::default();
        cfg.confidence_floors.placeholder = 0.8;
        let issues = PlaceholderVerifier::new()
            .verify(
                &[block("Hola {firstName}, gracias")],
                &LanguageMix::default(),
                &cfg,
            )
            .await
            .unwrap();
        assert!(issues.is_empty());
    }
}

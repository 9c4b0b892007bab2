use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::config::AnalyzerConfig;
use crate::extractor::TextBlock;
use crate::language::LanguageMix;
use crate::report::{Issue, IssueType, Severity, clip_snippet};
use crate::verify::{Verifier, VerifierError};

/// Detects terminology inconsistency: blocks sharing one translation key
/// (`data-i18n`) rendered with two or more distinct translations. Each
/// minority-variant occurrence gets its own issue, pointing at its locator.
#[derive(Debug, Default)]
pub struct ConsistencyVerifier;

impl ConsistencyVerifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Verifier for ConsistencyVerifier {
    fn name(&self) -> &'static str {
        "consistency"
    }

    async fn verify(
        &self,
        blocks: &[TextBlock],
        _mix: &LanguageMix,
        config: &AnalyzerConfig,
    ) -> Result<Vec<Issue>, VerifierError> {
        // term key -> occurrences of (normalized translation, block index)
        let mut by_key: BTreeMap<String, Vec<(String, usize)>> = BTreeMap::new();
        for (idx, block) in blocks.iter().enumerate() {
            let Some(key) = block.term_key() else {
                continue;
            };
            by_key
                .entry(normalize_term(key))
                .or_default()
                .push((normalize_term(&block.text), idx));
        }

        let mut issues = Vec::new();
        for (key, occurrences) in by_key {
            issues.extend(check_key(&key, &occurrences, blocks, config));
        }
        Ok(issues)
    }
}

fn check_key(
    key: &str,
    occurrences: &[(String, usize)],
    blocks: &[TextBlock],
    config: &AnalyzerConfig,
) -> Vec<Issue> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for (variant, _) in occurrences {
        *counts.entry(variant.as_str()).or_insert(0) += 1;
    }
    if counts.len() < 2 {
        return Vec::new();
    }

    // Majority variant: highest count, lexically smallest on ties.
    let Some((majority, majority_count)) = counts
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
        .map(|(v, c)| (*v, *c))
    else {
        return Vec::new();
    };

    if majority_count < config.rules.repetition_threshold {
        return Vec::new();
    }

    let total = occurrences.len();
    let confidence = majority_count as f64 / total as f64;
    let majority_text = occurrences
        .iter()
        .find(|(variant, _)| variant == majority)
        .map(|&(_, idx)| blocks[idx].text.clone())
        .unwrap_or_else(|| majority.to_string());

    occurrences
        .iter()
        .filter(|(variant, _)| variant != majority)
        .map(|&(_, idx)| {
            let block = &blocks[idx];
            Issue {
                id: String::new(),
                kind: IssueType::ConsistencyError,
                severity: Severity::Medium,
                message: format!(
                    "term '{}' is translated as '{}' here but as '{}' in {} of {} occurrences",
                    key, block.text, majority_text, majority_count, total
                ),
                suggestion: Some(majority_text.clone()),
                snippet: clip_snippet(&block.text),
                locator: block.locator.clone(),
                confidence,
            }
        })
        .collect()
}

fn normalize_term(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::Locator;
    use std::collections::BTreeMap as Map;

    fn keyed_block(text: &str, key: &str, index: usize) -> TextBlock {
        let mut attributes = Map::new();
        attributes.insert("data-i18n".to_string(), key.to_string());
        TextBlock {
            text: text.to_string(),
            locator: Locator::document().child("button", index),
            tag: "button".to_string(),
            attributes,
            is_visible: true,
        }
    }

    async fn run(blocks: &[TextBlock]) -> Vec<Issue> {
        ConsistencyVerifier::new()
            .verify(blocks, &LanguageMix::default(), &AnalyzerConfig::default())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_minority_variant_flagged() {
        // "Submit" rendered as "Enviar" three times and "Mandar" once.
        let blocks = vec![
            keyed_block("Enviar", "submit", 1),
            keyed_block("Enviar", "submit", 2),
            keyed_block("Enviar", "submit", 3),
            keyed_block("Mandar", "submit", 4),
        ];
        let issues = run(&blocks).await;

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueType::ConsistencyError);
        assert_eq!(issues[0].locator, blocks[3].locator);
        assert_eq!(issues[0].suggestion.as_deref(), Some("Enviar"));
        assert!((issues[0].confidence - 0.75).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_consistent_translations_pass() {
        let blocks = vec![
            keyed_block("Enviar", "submit", 1),
            keyed_block("Enviar", "submit", 2),
            keyed_block("enviar", "submit", 3), // case-insensitive match
        ];
        assert!(run(&blocks).await.is_empty());
    }

    #[tokio::test]
    async fn test_below_repetition_threshold_ignored() {
        // One occurrence each: no majority reaches the threshold of 2.
        let blocks = vec![
            keyed_block("Enviar", "submit", 1),
            keyed_block("Mandar", "submit", 2),
        ];
        assert!(run(&blocks).await.is_empty());
    }

    #[tokio::test]
    async fn test_blocks_without_keys_ignored() {
        let blocks = vec![
            TextBlock {
                text: "Enviar".to_string(),
                locator: Locator::document().child("p", 1),
                tag: "p".to_string(),
                attributes: Map::new(),
                is_visible: true,
            },
            keyed_block("Mandar", "submit", 2),
        ];
        assert!(run(&blocks).await.is_empty());
    }

    #[tokio::test]
    async fn test_distinct_keys_do_not_interfere() {
        let blocks = vec![
            keyed_block("Enviar", "submit", 1),
            keyed_block("Enviar", "submit", 2),
            keyed_block("Cancelar", "cancel", 3),
            keyed_block("Cancelar", "cancel", 4),
        ];
        assert!(run(&blocks).await.is_empty());
    }
}

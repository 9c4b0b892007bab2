use async_trait::async_trait;
use tracing::debug;

use crate::config::{AnalyzerConfig, GrammarConfig};
use crate::extractor::TextBlock;
use crate::language::LanguageMix;
use crate::report::{Issue, IssueType, Severity, clip_snippet};
use crate::verify::{
    Verifier, VerifierError,
    languagetool::{GrammarMatch, LanguageToolClient},
};

/// Separator between block texts in the corpus sent to the grammar service.
/// Two newlines keep sentence boundaries intact for the rule engine.
const BLOCK_SEPARATOR: &str = "\n\n";

/// Delegates grammar and spelling scoring to an external
/// LanguageTool-compatible service and maps each returned match back to the
/// owning block by offset range.
pub struct GrammarVerifier {
    client: LanguageToolClient,
}

impl GrammarVerifier {
    pub fn new(config: &GrammarConfig) -> Self {
        Self {
            client: LanguageToolClient::new(config),
        }
    }
}

#[async_trait]
impl Verifier for GrammarVerifier {
    fn name(&self) -> &'static str {
        "grammar"
    }

    async fn verify(
        &self,
        blocks: &[TextBlock],
        _mix: &LanguageMix,
        config: &AnalyzerConfig,
    ) -> Result<Vec<Issue>, VerifierError> {
        if !config.grammar.enabled {
            debug!("grammar verification disabled by configuration");
            return Ok(Vec::new());
        }
        if blocks.is_empty() {
            return Ok(Vec::new());
        }

        let (corpus, ranges) = build_corpus(blocks);
        let matches = self
            .client
            .check(&corpus, &config.target.language)
            .await?;

        let issues = matches
            .iter()
            .filter_map(|m| to_issue(m, &corpus, &ranges, blocks, config))
            .collect();
        Ok(issues)
    }
}

/// Join block texts into one corpus, remembering each block's span. The
/// service reports offsets in characters, not bytes, so the spans are
/// char positions.
fn build_corpus(blocks: &[TextBlock]) -> (String, Vec<(usize, usize)>) {
    let mut corpus = String::new();
    let mut ranges = Vec::with_capacity(blocks.len());
    let mut chars = 0usize;
    for (i, block) in blocks.iter().enumerate() {
        if i > 0 {
            corpus.push_str(BLOCK_SEPARATOR);
            chars += BLOCK_SEPARATOR.chars().count();
        }
        let start = chars;
        corpus.push_str(&block.text);
        chars += block.text.chars().count();
        ranges.push((start, chars));
    }
    (corpus, ranges)
}

/// Locate the block whose text span contains the match's char offset.
/// Matches that fall on a separator (service artifacts) are dropped.
fn owning_block(ranges: &[(usize, usize)], offset: usize) -> Option<usize> {
    ranges
        .iter()
        .position(|&(start, end)| offset >= start && offset < end)
}

fn to_issue(
    m: &GrammarMatch,
    corpus: &str,
    ranges: &[(usize, usize)],
    blocks: &[TextBlock],
    config: &AnalyzerConfig,
) -> Option<Issue> {
    let block_idx = owning_block(ranges, m.offset)?;
    let block = &blocks[block_idx];

    let kind = classify(m);
    let matched: String = corpus.chars().skip(m.offset).take(m.length).collect();
    let snippet = clip_snippet(&matched);

    Some(Issue {
        id: String::new(),
        kind,
        severity: severity_for(m, kind),
        message: format!("{} [{}]", m.message, m.rule.id),
        suggestion: m.replacements.first().map(|r| r.value.clone()),
        snippet,
        locator: block.locator.clone(),
        confidence: m
            .rule
            .confidence
            .unwrap_or(config.grammar.default_confidence),
    })
}

fn classify(m: &GrammarMatch) -> IssueType {
    let is_spelling = m.rule.issue_type.as_deref() == Some("misspelling")
        || m.rule
            .category
            .as_ref()
            .is_some_and(|c| c.id.eq_ignore_ascii_case("TYPOS"));
    if is_spelling {
        IssueType::SpellingError
    } else {
        IssueType::GrammarError
    }
}

fn severity_for(m: &GrammarMatch, kind: IssueType) -> Severity {
    match kind {
        IssueType::SpellingError => Severity::Medium,
        _ => {
            let category = m
                .rule
                .category
                .as_ref()
                .map(|c| c.id.to_ascii_uppercase())
                .unwrap_or_default();
            if category == "GRAMMAR" || category == "PUNCTUATION" || category == "CASING" {
                Severity::Medium
            } else {
                Severity::Low
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::Locator;
    use crate::verify::languagetool::{GrammarCategory, GrammarRule, Replacement};
    use std::collections::BTreeMap;

    fn block(text: &str, index: usize) -> TextBlock {
        TextBlock {
            text: text.to_string(),
            locator: Locator::document().child("p", index),
            tag: "p".to_string(),
            attributes: BTreeMap::new(),
            is_visible: true,
        }
    }

    fn spelling_match(offset: usize, length: usize) -> GrammarMatch {
        GrammarMatch {
            message: "Possible spelling mistake found.".to_string(),
            offset,
            length,
            replacements: vec![Replacement {
                value: "right".to_string(),
            }],
            rule: GrammarRule {
                id: "MORFOLOGIK_RULE".to_string(),
                issue_type: Some("misspelling".to_string()),
                category: Some(GrammarCategory {
                    id: "TYPOS".to_string(),
                }),
                confidence: None,
            },
        }
    }

    #[test]
    fn test_corpus_ranges() {
        let blocks = vec![block("first part", 1), block("second part", 2)];
        let (corpus, ranges) = build_corpus(&blocks);
        assert_eq!(corpus, "first part\n\nsecond part");
        assert_eq!(ranges, vec![(0, 10), (12, 23)]);
        assert_eq!(owning_block(&ranges, 0), Some(0));
        assert_eq!(owning_block(&ranges, 11), None); // separator
        assert_eq!(owning_block(&ranges, 12), Some(1));
    }

    #[test]
    fn test_match_maps_to_owning_block() {
        let blocks = vec![block("first part", 1), block("secnod part", 2)];
        let (corpus, ranges) = build_corpus(&blocks);
        let config = AnalyzerConfig::default();

        let m = spelling_match(12, 6); // "secnod"
        let issue = to_issue(&m, &corpus, &ranges, &blocks, &config).unwrap();
        assert_eq!(issue.kind, IssueType::SpellingError);
        assert_eq!(issue.locator, blocks[1].locator);
        assert_eq!(issue.snippet, "secnod");
        assert_eq!(issue.suggestion.as_deref(), Some("right"));
        // No certainty from the service: the configured default applies.
        assert_eq!(issue.confidence, config.grammar.default_confidence);
    }

    #[test]
    fn test_non_ascii_offsets_counted_in_chars() {
        // Accented text makes char and byte positions diverge; the service
        // counts chars. Byte-counted, offset 27 would still sit inside the
        // first block.
        let blocks = vec![
            block("Aquí hay información útil", 1),
            block("errror aquí es", 2),
        ];
        let (corpus, ranges) = build_corpus(&blocks);
        assert_eq!(ranges, vec![(0, 25), (27, 41)]);
        assert_eq!(owning_block(&ranges, 27), Some(1));

        let config = AnalyzerConfig::default();
        let m = spelling_match(27, 6); // "errror"
        let issue = to_issue(&m, &corpus, &ranges, &blocks, &config).unwrap();
        assert_eq!(issue.locator, blocks[1].locator);
        assert_eq!(issue.snippet, "errror");
    }

    #[test]
    fn test_reported_certainty_overrides_default() {
        let blocks = vec![block("some words here", 1)];
        let (corpus, ranges) = build_corpus(&blocks);
        let config = AnalyzerConfig::default();

        let mut m = spelling_match(0, 4);
        m.rule.confidence = Some(0.95);
        let issue = to_issue(&m, &corpus, &ranges, &blocks, &config).unwrap();
        assert_eq!(issue.confidence, 0.95);
    }

    #[test]
    fn test_grammar_category_severity() {
        let m = GrammarMatch {
            message: "Agreement error.".to_string(),
            offset: 0,
            length: 4,
            replacements: vec![],
            rule: GrammarRule {
                id: "AGREEMENT".to_string(),
                issue_type: Some("grammar".to_string()),
                category: Some(GrammarCategory {
                    id: "GRAMMAR".to_string(),
                }),
                confidence: None,
            },
        };
        assert_eq!(classify(&m), IssueType::GrammarError);
        assert_eq!(severity_for(&m, IssueType::GrammarError), Severity::Medium);
    }
}

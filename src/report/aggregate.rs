use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::debug;

use crate::extractor::{Locator, TextBlock};
use crate::language::LanguageMix;
use crate::report::{AnalysisReport, Issue, IssueType, Severity, Stats, VerifierFailure};

/// Everything the aggregator needs to assemble the final report.
pub struct AggregateInput<'a> {
    pub url: &'a str,
    pub target_language: &'a str,
    pub page_title: Option<String>,
    pub blocks: &'a [TextBlock],
    pub mix: &'a LanguageMix,
    /// Per-verifier issue lists, in declared chain order.
    pub issue_sets: Vec<Vec<Issue>>,
    pub verifier_failures: Vec<VerifierFailure>,
    pub processing_time: f64,
}

/// Merge verifier outputs into one deterministic report.
///
/// Issues are concatenated in declared verifier order, de-duplicated (first
/// occurrence wins), sorted by severity descending then document order, and
/// only then given their sequential ids.
pub fn aggregate(input: AggregateInput<'_>) -> AnalysisReport {
    let order = document_order(input.blocks);

    let mut seen: HashSet<(IssueType, String, String)> = HashSet::new();
    let mut issues: Vec<Issue> = Vec::new();
    for set in input.issue_sets {
        for issue in set {
            let key = (
                issue.kind,
                issue.locator.to_string(),
                normalize_snippet(&issue.snippet),
            );
            if seen.insert(key) {
                issues.push(issue);
            }
        }
    }

    // Stable sort keeps declared verifier order among equals.
    issues.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| position_of(&order, &a.locator).cmp(&position_of(&order, &b.locator)))
    });

    for (i, issue) in issues.iter_mut().enumerate() {
        issue.id = format!("ISS-{:04}", i + 1);
    }

    debug!(
        issue_count = issues.len(),
        block_count = input.blocks.len(),
        "aggregated analysis report"
    );

    let stats = tally(&issues, input.blocks.len(), input.mix, input.target_language);
    AnalysisReport {
        url: input.url.to_string(),
        target_language: input.target_language.to_string(),
        success: true,
        error_message: None,
        processing_time: input.processing_time,
        page_title: input.page_title,
        issues,
        stats,
        verifier_failures: input.verifier_failures,
    }
}

/// Map each block locator to its document position. The document locator
/// sorts before every block.
fn document_order(blocks: &[TextBlock]) -> HashMap<Locator, usize> {
    let mut order = HashMap::with_capacity(blocks.len() + 1);
    order.insert(Locator::document(), 0);
    for (i, block) in blocks.iter().enumerate() {
        order.entry(block.locator.clone()).or_insert(i + 1);
    }
    order
}

fn position_of(order: &HashMap<Locator, usize>, locator: &Locator) -> usize {
    order.get(locator).copied().unwrap_or(usize::MAX)
}

fn normalize_snippet(snippet: &str) -> String {
    snippet
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn tally(
    issues: &[Issue],
    total_text_blocks: usize,
    mix: &LanguageMix,
    target_language: &str,
) -> Stats {
    let mut by_severity: BTreeMap<Severity, usize> =
        Severity::ALL.iter().map(|s| (*s, 0)).collect();
    let mut by_type: BTreeMap<IssueType, usize> = IssueType::ALL.iter().map(|t| (*t, 0)).collect();
    for issue in issues {
        *by_severity.entry(issue.severity).or_insert(0) += 1;
        *by_type.entry(issue.kind).or_insert(0) += 1;
    }
    Stats {
        total_issues: issues.len(),
        issues_by_severity: by_severity,
        issues_by_type: by_type,
        total_text_blocks,
        target_language_percentage: mix.probability(target_language) * 100.0,
        detected_languages: mix.percentages(),
    }
}

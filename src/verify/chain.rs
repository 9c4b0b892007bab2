use std::sync::Arc;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::AnalyzerConfig;
use crate::extractor::TextBlock;
use crate::language::LanguageMix;
use crate::report::{Issue, VerifierFailure};
use crate::verify::Verifier;

/// Result of running the whole chain: per-verifier issue lists in declared
/// order, plus diagnostics for verifiers that failed.
#[derive(Debug, Default)]
pub struct ChainOutcome {
    pub issue_sets: Vec<Vec<Issue>>,
    pub failures: Vec<VerifierFailure>,
}

/// Run all verifiers concurrently against the shared immutable input.
///
/// A failing (or panicking, or cancelled) verifier is caught here: its error
/// is recorded and it contributes zero issues; the others are unaffected.
/// Issue sets come back indexed by the declared verifier order regardless of
/// completion order.
pub async fn run_chain(
    verifiers: &[Arc<dyn Verifier>],
    blocks: Arc<Vec<TextBlock>>,
    mix: Arc<LanguageMix>,
    config: Arc<AnalyzerConfig>,
    token: &CancellationToken,
) -> ChainOutcome {
    let mut join_set = JoinSet::new();
    for (idx, verifier) in verifiers.iter().enumerate() {
        let verifier = verifier.clone();
        let blocks = blocks.clone();
        let mix = mix.clone();
        let config = config.clone();
        let token = token.clone();
        join_set.spawn(async move {
            let name = verifier.name();
            let result = tokio::select! {
                _ = token.cancelled() => Err(crate::verify::VerifierError::Cancelled),
                result = verifier.verify(&blocks, &mix, &config) => result,
            };
            (idx, name, result)
        });
    }

    let mut issue_sets: Vec<Vec<Issue>> = (0..verifiers.len()).map(|_| Vec::new()).collect();
    let mut failures = Vec::new();

    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((idx, name, Ok(issues))) => {
                debug!("verifier '{}' produced {} issues", name, issues.len());
                issue_sets[idx] = issues;
            }
            Ok((_, name, Err(err))) => {
                warn!("verifier '{}' failed: {}", name, err);
                failures.push(VerifierFailure {
                    verifier: name.to_string(),
                    error: err.to_string(),
                });
            }
            Err(join_err) => {
                warn!("verifier task aborted: {}", join_err);
                failures.push(VerifierFailure {
                    verifier: "unknown".to_string(),
                    error: join_err.to_string(),
                });
            }
        }
    }

    ChainOutcome {
        issue_sets,
        failures,
    }
}

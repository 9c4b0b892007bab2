//! The verifier chain: independent rule engines consuming the shared
//! extracted blocks and language mix, each producing zero or more issues.
//!
//! Verifiers never mutate their input and never see each other's output;
//! issue ordering in the final report is decided solely by the aggregator.

pub mod chain;
pub mod consistency;
pub mod errors;
pub mod formatting;
pub mod grammar;
pub mod languagetool;
pub mod leakage;
pub mod placeholder;

pub use chain::{ChainOutcome, run_chain};
pub use consistency::ConsistencyVerifier;
pub use errors::VerifierError;
pub use formatting::FormattingVerifier;
pub use grammar::GrammarVerifier;
pub use leakage::LanguageLeakageVerifier;
pub use placeholder::PlaceholderVerifier;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::AnalyzerConfig;
use crate::extractor::TextBlock;
use crate::language::{LanguageDetect, LanguageMix};
use crate::report::Issue;

/// One independent rule engine. Shared-read, no-write: implementations MUST
/// NOT mutate the block sequence or the mix.
#[async_trait]
pub trait Verifier: Send + Sync {
    fn name(&self) -> &'static str;

    async fn verify(
        &self,
        blocks: &[TextBlock],
        mix: &LanguageMix,
        config: &AnalyzerConfig,
    ) -> Result<Vec<Issue>, VerifierError>;
}

/// The canonical chain in declared order: leakage, grammar, placeholder,
/// consistency, formatting. Declared order only matters for dedup
/// keep-first; execution is concurrent.
pub fn default_chain(
    detector: Arc<dyn LanguageDetect>,
    config: &AnalyzerConfig,
) -> Vec<Arc<dyn Verifier>> {
    vec![
        Arc::new(LanguageLeakageVerifier::new(detector)),
        Arc::new(GrammarVerifier::new(&config.grammar)),
        Arc::new(PlaceholderVerifier::new()),
        Arc::new(ConsistencyVerifier::new()),
        Arc::new(FormattingVerifier::new()),
    ]
}

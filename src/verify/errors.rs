use thiserror::Error;

/// Failure scoped to one verifier. Recovered at the chain boundary: logged,
/// recorded for diagnostics, zero issues contributed. Never flips the
/// report's `success` flag.
#[derive(Error, Debug)]
pub enum VerifierError {
    #[error("grammar service error: {0}")]
    GrammarService(String),

    #[error("verifier cancelled")]
    Cancelled,

    #[error("{0}")]
    Internal(String),
}

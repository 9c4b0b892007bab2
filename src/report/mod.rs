mod aggregate;
mod model;

pub use aggregate::{AggregateInput, aggregate};
pub use model::{
    AnalysisReport, Issue, IssueType, MAX_SNIPPET_CHARS, Severity, Stats, VerifierFailure,
    clip_snippet,
};

//! translint: translation quality analysis for rendered web pages.
//!
//! The pipeline flows strictly forward: a [`fetcher::ContentSource`] loads
//! raw markup, the [`extractor`] turns it into an ordered sequence of visible
//! text blocks, the [`language`] module aggregates a per-document language
//! mix, the [`verify`] chain produces typed issues, and the [`report`]
//! aggregator assembles everything into one immutable [`report::AnalysisReport`].

pub mod analyzer;
pub mod batch;
pub mod config;
pub mod extractor;
pub mod fetcher;
pub mod language;
pub mod report;
pub mod verify;

pub use analyzer::Analyzer;
pub use config::AnalyzerConfig;
pub use report::{AnalysisReport, Issue, IssueType, Severity, Stats};

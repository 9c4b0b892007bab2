//! The analysis pipeline driver: fetch, extract, detect, verify, aggregate.

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::config::AnalyzerConfig;
use crate::extractor::{self, ExtractionError};
use crate::fetcher::{ContentSource, FetchError, FetchOptions, HttpSource};
use crate::language::{self, LanguageDetect, WhatlangDetector};
use crate::report::{AggregateInput, AnalysisReport, aggregate};
use crate::verify::{self, Verifier, run_chain};

/// Fatal pipeline failures. Verifier-local failures never surface here; they
/// are recorded in the report's diagnostics instead.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("fetch failed ({kind}): {err}", kind = .0.kind(), err = .0)]
    Fetch(#[from] FetchError),
    #[error("extraction failed: {0}")]
    Extraction(#[from] ExtractionError),
    #[error("analysis cancelled")]
    Cancelled,
}

/// One-URL analysis pipeline. Construction wires the default components;
/// [`Analyzer::with_components`] swaps any of them out behind their traits.
pub struct Analyzer {
    config: Arc<AnalyzerConfig>,
    source: Arc<dyn ContentSource>,
    detector: Arc<dyn LanguageDetect>,
    verifiers: Vec<Arc<dyn Verifier>>,
}

impl Analyzer {
    /// Default wiring: static HTTP fetching, trigram detection, the full
    /// verifier chain.
    pub fn new(config: AnalyzerConfig) -> Self {
        let detector: Arc<dyn LanguageDetect> = Arc::new(WhatlangDetector);
        let verifiers = verify::default_chain(detector.clone(), &config);
        let source = Arc::new(HttpSource::new(&config.fetch));
        Self {
            config: Arc::new(config),
            source,
            detector,
            verifiers,
        }
    }

    pub fn with_components(
        config: AnalyzerConfig,
        source: Arc<dyn ContentSource>,
        detector: Arc<dyn LanguageDetect>,
        verifiers: Vec<Arc<dyn Verifier>>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            source,
            detector,
            verifiers,
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze one URL to completion. Fatal stage failures come back as a
    /// failure report, not an `Err`; `Err` is reserved for cancellation.
    pub async fn analyze_url(&self, url: &str) -> AnalysisReport {
        let token = CancellationToken::new();
        // A fresh token is never cancelled, so this cannot fail.
        match self.analyze_url_cancellable(url, &token).await {
            Ok(report) => report,
            Err(err) => AnalysisReport::failure(url, &self.config.target.language, err.to_string(), 0.0),
        }
    }

    /// Like [`Analyzer::analyze_url`], stopping early when `token` fires.
    #[instrument(skip(self, token), fields(target = %self.config.target.language))]
    pub async fn analyze_url_cancellable(
        &self,
        url: &str,
        token: &CancellationToken,
    ) -> Result<AnalysisReport, AnalyzeError> {
        let started = Instant::now();
        let target = self.config.target.language.clone();

        let options = FetchOptions::from_config(&self.config);
        let fetched = tokio::select! {
            _ = token.cancelled() => return Err(AnalyzeError::Cancelled),
            result = self.source.fetch(url, &options) => result,
        };
        let page = match fetched {
            Ok(page) => page,
            Err(err) => {
                warn!("fetch failed for {}: {}", url, err);
                let message = AnalyzeError::Fetch(err).to_string();
                return Ok(AnalysisReport::failure(
                    url,
                    &target,
                    message,
                    started.elapsed().as_secs_f64(),
                ));
            }
        };

        // Extraction and detection are synchronous; the parsed DOM never
        // crosses an await point.
        let extraction = match extractor::extract(&page.raw_markup, &self.config) {
            Ok(extraction) => extraction,
            Err(err) => {
                warn!("extraction failed for {}: {}", url, err);
                let message = AnalyzeError::Extraction(err).to_string();
                return Ok(AnalysisReport::failure(
                    url,
                    &target,
                    message,
                    started.elapsed().as_secs_f64(),
                ));
            }
        };

        let blocks = Arc::new(extraction.blocks);
        let mix = Arc::new(language::aggregate(
            &blocks,
            self.detector.as_ref(),
            &self.config,
        ));

        let outcome = run_chain(
            &self.verifiers,
            blocks.clone(),
            mix.clone(),
            self.config.clone(),
            token,
        )
        .await;

        if token.is_cancelled() {
            return Err(AnalyzeError::Cancelled);
        }

        let report = aggregate(AggregateInput {
            url: page.final_url.as_str(),
            target_language: &target,
            page_title: extraction.title,
            blocks: &blocks,
            mix: &mix,
            issue_sets: outcome.issue_sets,
            verifier_failures: outcome.failures,
            processing_time: started.elapsed().as_secs_f64(),
        });
        info!(
            issues = report.stats.total_issues,
            blocks = report.stats.total_text_blocks,
            elapsed = report.processing_time,
            "analysis complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::{Charset, MockContentSource, PageContent};

    fn page(html: &str) -> PageContent {
        PageContent {
            final_url: url::Url::parse("https://example.com/page").expect("static url"),
            status: reqwest::StatusCode::OK,
            raw_markup: html.to_string(),
            charset: Charset::Utf8,
            fetched_at: chrono::Utc::now(),
        }
    }

    fn analyzer_with_source(source: MockContentSource) -> Analyzer {
        Analyzer::with_components(
            AnalyzerConfig::default(),
            Arc::new(source),
            Arc::new(WhatlangDetector),
            Vec::new(),
        )
    }

    #[test]
    fn test_fetch_error_message_names_kind() {
        let err = AnalyzeError::Fetch(FetchError::RequestTimeout);
        assert_eq!(err.to_string(), "fetch failed (timeout): request timeout");
        let err = AnalyzeError::Fetch(FetchError::RenderFailure("browser crashed".into()));
        assert_eq!(
            err.to_string(),
            "fetch failed (render_failure): render failure: browser crashed"
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_becomes_failure_report() {
        let mut source = MockContentSource::new();
        source
            .expect_fetch()
            .returning(|_, _| Err(FetchError::RequestTimeout));

        let report = analyzer_with_source(source)
            .analyze_url("https://example.com")
            .await;
        assert!(!report.success);
        assert!(report.error_message.unwrap().contains("timeout"));
        assert!(report.issues.is_empty());
    }

    #[tokio::test]
    async fn test_extraction_failure_becomes_failure_report() {
        let mut source = MockContentSource::new();
        source
            .expect_fetch()
            .returning(|_, _| Ok(page("no markup here at all")));

        let report = analyzer_with_source(source)
            .analyze_url("https://example.com")
            .await;
        assert!(!report.success);
        assert!(report.error_message.unwrap().contains("extraction failed"));
    }

    #[tokio::test]
    async fn test_success_report_carries_page_metadata() {
        let mut source = MockContentSource::new();
        source.expect_fetch().returning(|_, _| {
            Ok(page(
                "<html lang=\"en\"><head><title>Hello</title></head>\
                 <body><p>Some visible english text here.</p></body></html>",
            ))
        });

        let report = analyzer_with_source(source)
            .analyze_url("https://example.com")
            .await;
        assert!(report.success);
        assert_eq!(report.page_title.as_deref(), Some("Hello"));
        assert_eq!(report.url, "https://example.com/page");
        assert_eq!(report.stats.total_text_blocks, 1);
        assert!(report.issues.is_empty());
    }
}

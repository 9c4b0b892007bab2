//! Bounded-concurrency batch analysis over many URLs.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::analyzer::Analyzer;
use crate::report::AnalysisReport;

/// Analyze every URL with at most `config.batch.concurrency` in flight.
///
/// Results come back in input order regardless of completion order. One URL
/// failing (or being cancelled) yields a failure report in its slot; the
/// rest of the batch is unaffected.
pub async fn analyze_many(
    analyzer: Arc<Analyzer>,
    urls: &[String],
    token: &CancellationToken,
) -> Vec<AnalysisReport> {
    let concurrency = analyzer.config().batch.concurrency.max(1);
    let semaphore = Arc::new(Semaphore::new(concurrency));
    let target = analyzer.config().target.language.clone();

    let mut join_set = JoinSet::new();
    for (idx, url) in urls.iter().enumerate() {
        let analyzer = analyzer.clone();
        let semaphore = semaphore.clone();
        let token = token.clone();
        let url = url.clone();
        join_set.spawn(async move {
            // Closed semaphore is unreachable: we never close it.
            let _permit = semaphore.acquire_owned().await;
            let report = analyzer.analyze_url_cancellable(&url, &token).await;
            (idx, url, report)
        });
    }

    let mut slots: Vec<Option<AnalysisReport>> = (0..urls.len()).map(|_| None).collect();
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((idx, _, Ok(report))) => {
                slots[idx] = Some(report);
            }
            Ok((idx, url, Err(err))) => {
                warn!("analysis of {} did not complete: {}", url, err);
                slots[idx] = Some(AnalysisReport::failure(&url, &target, err.to_string(), 0.0));
            }
            Err(join_err) => {
                warn!("batch task aborted: {}", join_err);
            }
        }
    }

    let reports: Vec<AnalysisReport> = slots
        .into_iter()
        .zip(urls)
        .map(|(slot, url)| {
            slot.unwrap_or_else(|| {
                AnalysisReport::failure(url, &target, "analysis task aborted".to_string(), 0.0)
            })
        })
        .collect();

    info!(
        total = reports.len(),
        failed = reports.iter().filter(|r| !r.success).count(),
        "batch analysis complete"
    );
    reports
}

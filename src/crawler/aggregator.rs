//! Result aggregation
//!
//! Workers push every terminal [`CrawlResult`] into a shared collector. When
//! the run ends the collector is turned into a [`SiteReport`], with the seed
//! page's analysis promoted to the main report.

use crate::crawler::analyzer::PageAnalyzer;
use crate::crawler::types::{CrawlResult, SiteReport, StopReason};
use crate::PageError;
use chrono::{DateTime, Utc};
use std::sync::{Mutex, PoisonError};

/// Thread-safe sink for per-page results
pub struct ResultCollector<R> {
    results: Mutex<Vec<CrawlResult<R>>>,
}

impl<R> Default for ResultCollector<R> {
    fn default() -> Self {
        Self {
            results: Mutex::new(Vec::new()),
        }
    }
}

impl<R> ResultCollector<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, result: CrawlResult<R>) {
        self.results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(result);
    }

    pub fn len(&self) -> usize {
        self.results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Takes the collected results, sorted by depth then URL
    pub fn drain_sorted(&self) -> Vec<CrawlResult<R>> {
        let mut results =
            std::mem::take(&mut *self.results.lock().unwrap_or_else(PoisonError::into_inner));
        results.sort_by(|a, b| a.depth.cmp(&b.depth).then_with(|| a.url.cmp(&b.url)));
        results
    }
}

/// Run metadata handed to the aggregator alongside the results
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub stop_reason: StopReason,
    pub pages_admitted: usize,
    pub started_at: DateTime<Utc>,
}

/// Builds the site report for a finished run
///
/// The main report is taken from the result whose URL equals the seed. If the
/// seed was never analyzed (robots-denied, or the run stopped first) it is
/// analyzed once directly. A seed whose own analysis failed is not retried and
/// leaves the main report empty.
pub async fn build_site_report<A>(
    seed: &str,
    sub_reports: Vec<CrawlResult<A::Report>>,
    analyzer: &A,
    summary: RunSummary,
) -> SiteReport<A::Report>
where
    A: PageAnalyzer + ?Sized,
    A::Report: Clone,
{
    let seed_result = sub_reports.iter().find(|result| result.url == seed);

    let main_report = match seed_result {
        Some(result) if result.report.is_some() => result.report.clone(),
        Some(result) if matches!(result.error, Some(PageError::FetchFailure { .. })) => {
            tracing::warn!("Seed {} failed during the run, no main report", seed);
            None
        }
        _ => {
            tracing::info!("Seed {} was not analyzed during the run, analyzing it directly", seed);
            match analyzer.analyze(seed).await {
                Ok(report) => Some(report),
                Err(e) => {
                    tracing::warn!("Fallback analysis of seed {} failed: {}", seed, e);
                    None
                }
            }
        }
    };

    SiteReport {
        main_url: seed.to_string(),
        main_report,
        sub_reports,
        stop_reason: summary.stop_reason,
        pages_admitted: summary.pages_admitted,
        started_at: summary.started_at,
        finished_at: Utc::now(),
    }
}

//! Shared crawl data types
//!
//! Tasks flow from the frontier to workers; results flow from workers to the
//! aggregator, which assembles them into a [`SiteReport`].

use crate::url::normalize_url;
use crate::PageError;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::fmt;

/// A unit of work: one URL discovered at a given link depth
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    pub url: String,
    pub depth: u32,
}

impl CrawlTask {
    /// Creates the depth-0 task for the seed URL
    pub fn seed(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            depth: 0,
        }
    }

    /// Creates a task for a link discovered on this task's page
    pub fn child(&self, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            depth: self.depth + 1,
        }
    }
}

/// Terminal outcome of one admitted task
///
/// Exactly one of `report` and `error` is set.
#[derive(Debug, Clone)]
pub struct CrawlResult<R> {
    pub url: String,
    pub depth: u32,
    pub report: Option<R>,
    pub error: Option<PageError>,
}

impl<R> CrawlResult<R> {
    pub fn success(task: &CrawlTask, report: R) -> Self {
        Self {
            url: task.url.clone(),
            depth: task.depth,
            report: Some(report),
            error: None,
        }
    }

    pub fn failure(task: &CrawlTask, error: PageError) -> Self {
        Self {
            url: task.url.clone(),
            depth: task.depth,
            report: None,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.report.is_some()
    }

    /// Returns true if robots.txt kept this page from being analyzed
    pub fn is_policy_rejection(&self) -> bool {
        self.error
            .as_ref()
            .map_or(false, PageError::is_policy_rejection)
    }
}

/// Why a crawl run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// No more work could arrive; the frontier drained naturally
    Exhausted,
    /// The page budget was fully admitted
    PageBudget,
    /// The wall-clock budget expired
    TimeBudget,
    /// The caller cancelled the run
    Cancelled,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Exhausted => "frontier exhausted",
            Self::PageBudget => "page budget reached",
            Self::TimeBudget => "time budget expired",
            Self::Cancelled => "cancelled",
        };
        f.write_str(text)
    }
}

/// Run-level crawl report
#[derive(Debug, Clone)]
pub struct SiteReport<R> {
    /// The seed URL as given by the caller
    pub main_url: String,

    /// Analysis of the seed page
    ///
    /// `None` only if the seed could not be analyzed even by the fallback
    /// analysis performed after the run.
    pub main_report: Option<R>,

    /// One entry per admitted task, sorted by depth then URL
    pub sub_reports: Vec<CrawlResult<R>>,

    pub stop_reason: StopReason,

    /// Number of normalized URLs admitted by the frontier
    pub pages_admitted: usize,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl<R> SiteReport<R> {
    /// Normalized keys of every page that produced a result
    pub fn visited_keys(&self) -> BTreeSet<String> {
        self.sub_reports
            .iter()
            .map(|result| normalize_url(&result.url))
            .collect()
    }

    /// Looks up the result for a URL by its normalized key
    pub fn result_for(&self, url: &str) -> Option<&CrawlResult<R>> {
        let key = normalize_url(url);
        self.sub_reports
            .iter()
            .find(|result| normalize_url(&result.url) == key)
    }

    pub fn successes(&self) -> impl Iterator<Item = &CrawlResult<R>> {
        self.sub_reports.iter().filter(|r| r.is_success())
    }

    pub fn failures(&self) -> impl Iterator<Item = &CrawlResult<R>> {
        self.sub_reports
            .iter()
            .filter(|r| !r.is_success() && !r.is_policy_rejection())
    }

    pub fn policy_rejections(&self) -> impl Iterator<Item = &CrawlResult<R>> {
        self.sub_reports.iter().filter(|r| r.is_policy_rejection())
    }

    /// Wall-clock duration of the run
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

//! Crawler coordinator - worker pool and run lifetime
//!
//! This module contains the crawl loop that ties the pieces together:
//! - Validating the seed and seeding the frontier
//! - Running a fixed pool of workers that gate, analyze and expand tasks
//! - Enforcing the wall-clock budget through a shared cancellation token
//! - Handing every recorded outcome to the aggregator

use crate::config::RunConfig;
use crate::crawler::aggregator::{build_site_report, ResultCollector, RunSummary};
use crate::crawler::analyzer::{AnalyzedPage, PageAnalyzer};
use crate::crawler::fetcher::{HttpAnalyzer, PageReport};
use crate::crawler::frontier::Frontier;
use crate::crawler::types::{CrawlResult, CrawlTask, SiteReport, StopReason};
use crate::robots::RobotsGate;
use crate::url::{extract_authority, is_same_host, normalize_url};
use crate::{PageError, ScoutError};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Main crawler coordinator structure
///
/// A coordinator can run several crawls; the robots gate (and its cache) is
/// shared between them.
pub struct Coordinator<A: PageAnalyzer> {
    config: Arc<RunConfig>,
    analyzer: Arc<A>,
    robots: Arc<RobotsGate>,
}

impl<A> Coordinator<A>
where
    A: PageAnalyzer + 'static,
    A::Report: Clone,
{
    /// Creates a coordinator with a fresh robots gate
    ///
    /// # Arguments
    ///
    /// * `config` - Immutable settings for every run of this coordinator
    /// * `analyzer` - Page analyzer invoked for each allowed page
    pub fn new(config: RunConfig, analyzer: A) -> Result<Self, ScoutError> {
        let robots = RobotsGate::new(&config.user_agent, config.robots_timeout)?;
        Ok(Self::with_robots_gate(
            config,
            Arc::new(analyzer),
            Arc::new(robots),
        ))
    }

    /// Creates a coordinator around an existing analyzer and robots gate
    pub fn with_robots_gate(config: RunConfig, analyzer: Arc<A>, robots: Arc<RobotsGate>) -> Self {
        Self {
            config: Arc::new(config),
            analyzer,
            robots,
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn robots_gate(&self) -> &Arc<RobotsGate> {
        &self.robots
    }

    /// Crawls the site rooted at `seed`
    ///
    /// Fails only if the seed URL is unusable; every per-page problem is
    /// recorded in the returned report.
    pub async fn run(&self, seed: &str) -> Result<SiteReport<A::Report>, ScoutError> {
        self.run_with_cancellation(seed, CancellationToken::new())
            .await
    }

    /// Crawls the site rooted at `seed`, stopping early if `cancel` fires
    ///
    /// Cancellation behaves like the time budget expiring: nothing new is
    /// admitted, in-flight pages finish, and the partial report is returned.
    pub async fn run_with_cancellation(
        &self,
        seed: &str,
        cancel: CancellationToken,
    ) -> Result<SiteReport<A::Report>, ScoutError> {
        let seed_authority = validate_seed(seed)?;
        let started_at = Utc::now();

        tracing::info!(
            "Starting crawl of {} (max depth {}, max pages {}, {} workers, budget {:?})",
            seed,
            self.config.max_depth,
            self.config.max_pages,
            self.config.concurrency,
            self.config.time_budget
        );

        let run_token = cancel.child_token();
        let frontier = Arc::new(Frontier::new(
            self.config.max_pages,
            self.config.queue_capacity,
            run_token.clone(),
        ));
        let results = Arc::new(ResultCollector::new());

        let budget_expired = Arc::new(AtomicBool::new(false));
        let watchdog = {
            let token = run_token.clone();
            let expired = Arc::clone(&budget_expired);
            let budget = self.config.time_budget;
            tokio::spawn(async move {
                tokio::select! {
                    _ = tokio::time::sleep(budget) => {
                        tracing::info!("Time budget of {:?} expired, stopping crawl", budget);
                        expired.store(true, Ordering::SeqCst);
                        token.cancel();
                    }
                    _ = token.cancelled() => {}
                }
            })
        };

        if !frontier.enqueue(CrawlTask::seed(seed)) {
            frontier.close();
        }

        let mut workers = JoinSet::new();
        for id in 0..self.config.concurrency.max(1) {
            let worker = Worker {
                id,
                config: Arc::clone(&self.config),
                analyzer: Arc::clone(&self.analyzer),
                robots: Arc::clone(&self.robots),
                frontier: Arc::clone(&frontier),
                results: Arc::clone(&results),
                seed_authority: seed_authority.clone(),
            };
            workers.spawn(worker.run());
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Crawl worker failed: {}", e);
            }
        }
        watchdog.abort();

        let pages_admitted = frontier.admitted_count();
        let stop_reason = if budget_expired.load(Ordering::SeqCst) {
            StopReason::TimeBudget
        } else if cancel.is_cancelled() {
            StopReason::Cancelled
        } else if pages_admitted >= self.config.max_pages {
            StopReason::PageBudget
        } else {
            StopReason::Exhausted
        };

        let sub_reports = results.drain_sorted();
        tracing::info!(
            "Crawl finished: {} pages recorded, {} admitted ({})",
            sub_reports.len(),
            pages_admitted,
            stop_reason
        );

        let summary = RunSummary {
            stop_reason,
            pages_admitted,
            started_at,
        };
        Ok(build_site_report(seed, sub_reports, self.analyzer.as_ref(), summary).await)
    }
}

/// Checks that the seed is an absolute http(s) URL with a host
///
/// Returns the seed's authority, used to restrict expansion to the same host.
fn validate_seed(seed: &str) -> Result<String, ScoutError> {
    let invalid = |reason: String| ScoutError::InvalidSeed {
        url: seed.to_string(),
        reason,
    };

    let url = Url::parse(seed).map_err(|e| invalid(e.to_string()))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    extract_authority(&url).ok_or_else(|| invalid("missing host".to_string()))
}

/// One member of the worker pool
struct Worker<A: PageAnalyzer> {
    id: usize,
    config: Arc<RunConfig>,
    analyzer: Arc<A>,
    robots: Arc<RobotsGate>,
    frontier: Arc<Frontier>,
    results: Arc<ResultCollector<A::Report>>,
    seed_authority: String,
}

/// Marks a dequeued task done when dropped, including during unwinding
struct TaskDone<'a>(&'a Frontier);

impl Drop for TaskDone<'_> {
    fn drop(&mut self) {
        self.0.task_done();
    }
}

impl<A: PageAnalyzer + 'static> Worker<A> {
    async fn run(self) {
        tracing::trace!("Worker {} started", self.id);

        while let Some(task) = self.frontier.dequeue().await {
            let visited = {
                let _done = TaskDone(&self.frontier);
                self.process(&task).await
            };

            if visited && !self.config.politeness_delay.is_zero() {
                tokio::select! {
                    _ = tokio::time::sleep(self.config.politeness_delay) => {}
                    _ = self.frontier.closed() => {}
                }
            }
        }

        tracing::trace!("Worker {} exiting", self.id);
    }

    /// Runs one task to its terminal state
    ///
    /// Returns true if the task was admitted (and so touched the network).
    async fn process(&self, task: &CrawlTask) -> bool {
        if task.depth > self.config.max_depth {
            tracing::debug!("Discarding {} at depth {}", task.url, task.depth);
            return false;
        }

        let key = normalize_url(&task.url);
        if !self.frontier.try_admit(&key) {
            tracing::debug!("Skipping {} (already visited or over budget)", task.url);
            return false;
        }

        tracing::info!(
            "Analyzing {} ({}/{})",
            task.url,
            self.frontier.admitted_count(),
            self.config.max_pages
        );

        if !self.robots.allowed(&self.config.user_agent, &task.url).await {
            tracing::info!("URL {} disallowed by robots.txt", task.url);
            self.results.record(CrawlResult::failure(
                task,
                PageError::PolicyRejection {
                    url: task.url.clone(),
                },
            ));
            return true;
        }

        match self.analyze(&task.url).await {
            Ok(report) => {
                if report.is_expandable() && task.depth < self.config.max_depth {
                    let queued = self.expand(task, report.outbound_links());
                    tracing::debug!("Queued {} links from {}", queued, task.url);
                }
                self.results.record(CrawlResult::success(task, report));
            }
            Err(message) => {
                tracing::warn!("Failed to analyze {}: {}", task.url, message);
                self.results.record(CrawlResult::failure(
                    task,
                    PageError::FetchFailure {
                        url: task.url.clone(),
                        message,
                    },
                ));
            }
        }

        true
    }

    /// Runs the analyzer in its own task so a panic becomes a page failure
    async fn analyze(&self, url: &str) -> Result<A::Report, String> {
        let analyzer = Arc::clone(&self.analyzer);
        let owned = url.to_string();

        match tokio::spawn(async move { analyzer.analyze(&owned).await }).await {
            Ok(Ok(report)) => Ok(report),
            Ok(Err(e)) => Err(e.to_string()),
            Err(e) if e.is_panic() => Err(format!("analyzer panicked on {}", url)),
            Err(e) => Err(format!("analysis of {} was aborted: {}", url, e)),
        }
    }

    /// Enqueues same-host children of `parent`, returning how many were queued
    fn expand(&self, parent: &CrawlTask, links: &[String]) -> usize {
        let mut seen = HashSet::new();
        let mut queued = 0;

        for link in links {
            if !is_same_host(link, &self.seed_authority) {
                continue;
            }

            let key = normalize_url(link);
            if !seen.insert(key.clone()) || self.frontier.is_visited(&key) {
                continue;
            }
            if !self.frontier.has_capacity() {
                tracing::debug!("Page budget reached, not expanding {}", parent.url);
                break;
            }

            if self.frontier.enqueue(parent.child(link.as_str())) {
                queued += 1;
            }
        }

        queued
    }
}

/// Crawls a site with the default HTTP analyzer
///
/// # Example
///
/// ```no_run
/// use site_scout::config::RunConfig;
/// use site_scout::crawler::crawl_site;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let report = crawl_site("https://example.com", RunConfig::default()).await?;
/// println!("Visited {} pages", report.sub_reports.len());
/// # Ok(())
/// # }
/// ```
pub async fn crawl_site(seed: &str, config: RunConfig) -> Result<SiteReport<PageReport>, ScoutError> {
    let analyzer = HttpAnalyzer::new(&config.user_agent)?;
    let coordinator = Coordinator::new(config, analyzer)?;
    coordinator.run(seed).await
}

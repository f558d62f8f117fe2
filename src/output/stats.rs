//! Statistics derived from a finished crawl
//!
//! This module condenses a [`SiteReport`] into counts and rates and prints
//! them for the command-line front end.

use crate::crawler::{AnalyzedPage, SiteReport, StopReason};
use std::collections::BTreeMap;

/// Crawl statistics summary
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlStatistics {
    /// Number of recorded results (one per admitted page)
    pub total_pages: usize,

    /// Pages the analyzer returned a report for
    pub analyzed: usize,

    /// Pages whose analysis failed
    pub failed: usize,

    /// Pages robots.txt kept us from analyzing
    pub robots_denied: usize,

    /// Count of analyzed pages by HTTP status
    pub pages_by_status: BTreeMap<u16, usize>,

    /// Analyzed pages whose links were eligible for expansion
    pub expandable: usize,

    /// Total outbound links seen on analyzed pages
    pub total_links: usize,

    /// Deepest link depth that produced a result
    pub max_depth_reached: u32,

    /// Wall-clock run time in milliseconds
    pub elapsed_ms: i64,

    pub stop_reason: StopReason,
}

impl CrawlStatistics {
    /// Computes statistics from a site report
    pub fn from_report<R: AnalyzedPage>(report: &SiteReport<R>) -> Self {
        let mut stats = Self {
            total_pages: report.sub_reports.len(),
            analyzed: 0,
            failed: 0,
            robots_denied: 0,
            pages_by_status: BTreeMap::new(),
            expandable: 0,
            total_links: 0,
            max_depth_reached: 0,
            elapsed_ms: report.elapsed().num_milliseconds(),
            stop_reason: report.stop_reason,
        };

        for result in &report.sub_reports {
            stats.max_depth_reached = stats.max_depth_reached.max(result.depth);

            match &result.report {
                Some(page) => {
                    stats.analyzed += 1;
                    *stats.pages_by_status.entry(page.status_code()).or_insert(0) += 1;
                    stats.total_links += page.outbound_links().len();
                    if page.is_expandable() {
                        stats.expandable += 1;
                    }
                }
                None if result.is_policy_rejection() => stats.robots_denied += 1,
                None => stats.failed += 1,
            }
        }

        stats
    }

    /// Percentage of attempted pages that were analyzed
    ///
    /// Robots-denied pages are not attempted and do not count against the rate.
    pub fn success_rate(&self) -> f64 {
        let attempted = self.analyzed + self.failed;
        if attempted == 0 {
            return 0.0;
        }
        (self.analyzed as f64 / attempted as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Pages recorded: {}", stats.total_pages);
    println!("  Analyzed: {}", stats.analyzed);
    println!("  Failed: {}", stats.failed);
    println!("  Denied by robots.txt: {}", stats.robots_denied);
    println!("  Links found: {}", stats.total_links);
    println!("  Deepest level: {}", stats.max_depth_reached);
    println!(
        "  Elapsed: {:.2}s ({})",
        stats.elapsed_ms as f64 / 1000.0,
        stats.stop_reason
    );
    println!();

    if !stats.pages_by_status.is_empty() {
        println!("Pages by Status:");
        for (status, count) in &stats.pages_by_status {
            println!("  {}: {}", status, count);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} pages analyzed)",
        stats.success_rate(),
        stats.analyzed,
        stats.analyzed + stats.failed
    );
}

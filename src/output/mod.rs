//! Output module for crawl summaries and reports
//!
//! This module handles:
//! - Computing and printing crawl statistics
//! - The seed page report and one-line-per-page listings for the terminal
//! - Markdown summaries written to disk

mod markdown;
pub mod stats;

pub use markdown::{format_markdown_summary, write_markdown_summary};
pub use stats::{print_statistics, CrawlStatistics};

use crate::crawler::{CrawlResult, PageReport, SiteReport};

/// Formats the full analysis of one page
pub fn format_page_report(page: &PageReport) -> String {
    let mut out = String::from("=== Page Report ===\n\n");
    out.push_str(&format!("  URL: {}\n", page.url));
    if page.was_redirected() {
        out.push_str(&format!("  Redirected to: {}\n", page.final_url));
    }
    out.push_str(&format!("  Status: {}\n", page.status_code));
    out.push_str(&format!("  Response time: {} ms\n", page.response_time_ms));
    let optional = [
        ("Content type", &page.content_type),
        ("Title", &page.title),
        ("Description", &page.description),
        ("Canonical", &page.canonical),
        ("Language", &page.lang),
    ];
    for (label, value) in optional {
        if let Some(value) = value {
            out.push_str(&format!("  {}: {}\n", label, value));
        }
    }
    out.push_str(&format!("  Links: {}\n", page.links.len()));

    if !page.missing_security_headers.is_empty() {
        out.push_str("\nMissing Security Headers:\n");
        for header in &page.missing_security_headers {
            out.push_str(&format!("  - {}\n", header));
        }
    }
    out
}

/// Formats the seed page's report, which leads the crawl output
pub fn format_main_report(report: &SiteReport<PageReport>) -> String {
    match &report.main_report {
        Some(page) => format_page_report(page),
        None => format!(
            "=== Page Report ===\n\n  {} could not be analyzed\n",
            report.main_url
        ),
    }
}

/// Prints the seed page's report followed by one line per page
pub fn print_site_report(report: &SiteReport<PageReport>) {
    println!("{}", format_main_report(report));
    print_pages(&report.sub_reports);
}

/// Formats one result as a single terminal line
///
/// Analyzed pages show status, response time and title; failures show the
/// recorded error.
pub fn format_page_line(result: &CrawlResult<PageReport>) -> String {
    let indent = "  ".repeat(result.depth as usize);

    match (&result.report, &result.error) {
        (Some(page), _) => {
            let mut line = format!(
                "{}[{}] {} ({} ms)",
                indent, page.status_code, result.url, page.response_time_ms
            );
            if let Some(title) = &page.title {
                line.push_str(&format!(" - {}", title));
            }
            line
        }
        (None, Some(e)) if e.is_policy_rejection() => {
            format!("{}[robots] {}", indent, result.url)
        }
        (None, Some(e)) => format!("{}[error] {}", indent, e),
        (None, None) => format!("{}[?] {}", indent, result.url),
    }
}

/// Prints one line per recorded page
pub fn print_pages(results: &[CrawlResult<PageReport>]) {
    println!("=== Pages ===\n");
    for result in results {
        println!("{}", format_page_line(result));
    }
    println!();
}

//! Markdown summary generation
//!
//! This module renders a finished site crawl as a markdown document: run
//! information, statistics, the seed page's analysis, and a table of every
//! page that was visited.

use crate::crawler::{PageReport, SiteReport};
use crate::output::stats::CrawlStatistics;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

/// Writes a markdown summary of a crawl to `output_path`
///
/// # Arguments
///
/// * `report` - The finished site report
/// * `config_hash` - Hash of the configuration file, if one was used
/// * `output_path` - Path where the markdown file should be written
pub fn write_markdown_summary(
    report: &SiteReport<PageReport>,
    config_hash: Option<&str>,
    output_path: &Path,
) -> io::Result<()> {
    let markdown = format_markdown_summary(report, config_hash);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a site report as markdown
pub fn format_markdown_summary(report: &SiteReport<PageReport>, config_hash: Option<&str>) -> String {
    let stats = CrawlStatistics::from_report(report);
    let mut md = String::new();

    md.push_str("# Site-Scout Crawl Summary\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Seed**: {}\n", report.main_url));
    md.push_str(&format!("- **Started**: {}\n", report.started_at.to_rfc3339()));
    md.push_str(&format!("- **Finished**: {}\n", report.finished_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Duration**: {:.2} seconds\n",
        stats.elapsed_ms as f64 / 1000.0
    ));
    md.push_str(&format!("- **Stopped**: {}\n", stats.stop_reason));
    if let Some(hash) = config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    md.push('\n');

    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Pages Recorded**: {}\n", stats.total_pages));
    md.push_str(&format!("- **Analyzed**: {}\n", stats.analyzed));
    md.push_str(&format!("- **Failed**: {}\n", stats.failed));
    md.push_str(&format!("- **Denied by robots.txt**: {}\n", stats.robots_denied));
    md.push_str(&format!("- **Links Found**: {}\n", stats.total_links));
    md.push_str(&format!("- **Success Rate**: {:.2}%\n\n", stats.success_rate()));

    if !stats.pages_by_status.is_empty() {
        md.push_str("## Status Breakdown\n\n");
        md.push_str("| Status | Pages |\n");
        md.push_str("|--------|-------|\n");
        for (status, count) in &stats.pages_by_status {
            md.push_str(&format!("| {} | {} |\n", status, count));
        }
        md.push('\n');
    }

    md.push_str("## Seed Page\n\n");
    match &report.main_report {
        Some(page) => {
            md.push_str(&format!("- **Status**: {}\n", page.status_code));
            if page.was_redirected() {
                md.push_str(&format!("- **Redirected To**: {}\n", page.final_url));
            }
            if let Some(title) = &page.title {
                md.push_str(&format!("- **Title**: {}\n", title));
            }
            if let Some(description) = &page.description {
                md.push_str(&format!("- **Description**: {}\n", description));
            }
            if let Some(lang) = &page.lang {
                md.push_str(&format!("- **Language**: {}\n", lang));
            }
            md.push_str(&format!("- **Response Time**: {} ms\n", page.response_time_ms));
            if !page.missing_security_headers.is_empty() {
                md.push_str(&format!(
                    "- **Missing Security Headers**: {}\n",
                    page.missing_security_headers.join(", ")
                ));
            }
        }
        None => md.push_str("The seed page could not be analyzed.\n"),
    }
    md.push('\n');

    if !report.sub_reports.is_empty() {
        md.push_str("## Pages\n\n");
        md.push_str("| Depth | URL | Result | Title |\n");
        md.push_str("|-------|-----|--------|-------|\n");
        for result in &report.sub_reports {
            let (outcome, title) = match (&result.report, &result.error) {
                (Some(page), _) => (
                    page.status_code.to_string(),
                    page.title.as_deref().unwrap_or(""),
                ),
                (None, Some(e)) if e.is_policy_rejection() => ("robots.txt".to_string(), ""),
                (None, _) => ("error".to_string(), ""),
            };
            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                result.depth,
                result.url,
                outcome,
                title.replace('|', "\\|")
            ));
        }
        md.push('\n');
    }

    let failures: Vec<_> = report.failures().collect();
    if !failures.is_empty() {
        md.push_str("## Errors\n\n");
        for result in failures {
            if let Some(e) = &result.error {
                md.push_str(&format!("- {}\n", e));
            }
        }
        md.push('\n');
    }

    md
}

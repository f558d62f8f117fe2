//! Crawler module for site traversal and page analysis
//!
//! This module contains the core crawling logic, including:
//! - The frontier (visit-once admission and the bounded task queue)
//! - The worker pool and run lifetime in the coordinator
//! - The pluggable page analyzer and its default HTTP implementation
//! - HTML parsing and link extraction
//! - Aggregation of per-page results into a site report

mod aggregator;
mod analyzer;
mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod types;

pub use aggregator::{build_site_report, ResultCollector, RunSummary};
pub use analyzer::{AnalyzeError, AnalyzedPage, PageAnalyzer};
pub use coordinator::{crawl_site, Coordinator};
pub use fetcher::{build_http_client, HttpAnalyzer, PageReport, PAGE_TIMEOUT};
pub use frontier::Frontier;
pub use parser::{parse_html, ParsedPage};
pub use types::{CrawlResult, CrawlTask, SiteReport, StopReason};

//! HTTP page analyzer
//!
//! This module provides the default [`PageAnalyzer`]: it fetches a page with
//! reqwest, records transport-level facts (status, timing, redirects, security
//! headers) and extracts metadata and links from HTML bodies.

use crate::crawler::analyzer::{AnalyzeError, AnalyzedPage, PageAnalyzer};
use crate::crawler::parser::parse_html;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::Client;
use std::time::{Duration, Instant};
use url::Url;

/// Per-request timeout used by the default analyzer
pub const PAGE_TIMEOUT: Duration = Duration::from_secs(15);

/// Analysis of a single fetched page
#[derive(Debug, Clone, Default)]
pub struct PageReport {
    /// The URL that was requested
    pub url: String,

    /// URL after following redirects
    pub final_url: String,

    pub status_code: u16,

    /// Time until response headers arrived (milliseconds)
    pub response_time_ms: u64,

    pub content_type: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub canonical: Option<String>,
    pub lang: Option<String>,

    /// Absolute URLs of `<a href>` links, in document order
    pub links: Vec<String>,

    /// Security response headers that were absent or misconfigured
    pub missing_security_headers: Vec<String>,
}

impl PageReport {
    /// Returns true if the request ended on a different URL
    pub fn was_redirected(&self) -> bool {
        self.final_url != self.url
    }
}

impl AnalyzedPage for PageReport {
    fn status_code(&self) -> u16 {
        self.status_code
    }

    fn outbound_links(&self) -> &[String] {
        &self.links
    }
}

/// Builds an HTTP client for page fetches
///
/// # Example
///
/// ```no_run
/// use site_scout::crawler::build_http_client;
///
/// let client = build_http_client("SiteScout/0.1.0").unwrap();
/// ```
pub fn build_http_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(PAGE_TIMEOUT)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Default analyzer: one GET per page, no retries
#[derive(Debug, Clone)]
pub struct HttpAnalyzer {
    client: Client,
}

impl HttpAnalyzer {
    pub fn new(user_agent: &str) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_http_client(user_agent)?))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageAnalyzer for HttpAnalyzer {
    type Report = PageReport;

    async fn analyze(&self, url: &str) -> Result<PageReport, AnalyzeError> {
        let parsed = Url::parse(url).map_err(|e| AnalyzeError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let start = Instant::now();
        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;
        let response_time_ms = start.elapsed().as_millis() as u64;

        let status = response.status();
        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let missing_security_headers =
            check_security_headers(response.headers(), final_url.scheme() == "https");

        let mut report = PageReport {
            url: url.to_string(),
            final_url: final_url.to_string(),
            status_code: status.as_u16(),
            response_time_ms,
            content_type,
            missing_security_headers,
            ..PageReport::default()
        };

        let is_html = report
            .content_type
            .as_deref()
            .map_or(false, |ct| ct.contains("text/html"));
        if !status.is_success() || !is_html {
            tracing::debug!(
                "Not parsing {} (HTTP {}, content-type {:?})",
                url,
                report.status_code,
                report.content_type
            );
            return Ok(report);
        }

        let body = response.text().await.map_err(|e| AnalyzeError::Body {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let page = parse_html(&body, &final_url);
        report.title = page.title;
        report.description = page.description;
        report.canonical = page.canonical;
        report.lang = page.lang;
        report.links = page.links;

        Ok(report)
    }
}

fn classify_error(url: &str, e: reqwest::Error) -> AnalyzeError {
    if e.is_timeout() {
        AnalyzeError::Timeout {
            url: url.to_string(),
        }
    } else {
        AnalyzeError::Network {
            url: url.to_string(),
            message: e.to_string(),
        }
    }
}

/// Lists the security headers a response is missing
fn check_security_headers(headers: &HeaderMap, is_https: bool) -> Vec<String> {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    let mut missing = Vec::new();
    if header("content-security-policy").is_none() {
        missing.push("Content-Security-Policy".to_string());
    }
    if header("x-frame-options").is_none() {
        missing.push("X-Frame-Options".to_string());
    }
    if !header("x-content-type-options").map_or(false, |v| v.eq_ignore_ascii_case("nosniff")) {
        missing.push("X-Content-Type-Options".to_string());
    }
    if is_https && header("strict-transport-security").is_none() {
        missing.push("Strict-Transport-Security".to_string());
    }
    missing
}

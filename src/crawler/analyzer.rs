//! Page analyzer boundary
//!
//! The crawl engine treats page analysis as an opaque, possibly slow,
//! possibly failing async function. It only looks at the status code and
//! outbound links of a report; everything else passes through untouched.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Errors returned by a page analyzer
#[derive(Debug, Clone, Error)]
pub enum AnalyzeError {
    #[error("Invalid URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("Failed to read body of {url}: {message}")]
    Body { url: String, message: String },
}

/// The parts of an analysis report the crawler inspects
pub trait AnalyzedPage {
    /// HTTP status code of the analyzed page
    fn status_code(&self) -> u16;

    /// Absolute URLs of every outbound link found on the page
    fn outbound_links(&self) -> &[String];

    /// Only exact 200 responses have their links followed
    fn is_expandable(&self) -> bool {
        self.status_code() == 200
    }
}

/// Fetches and analyzes a single page
#[async_trait]
pub trait PageAnalyzer: Send + Sync {
    type Report: AnalyzedPage + Send + Sync + 'static;

    async fn analyze(&self, url: &str) -> Result<Self::Report, AnalyzeError>;
}

#[async_trait]
impl<A> PageAnalyzer for Arc<A>
where
    A: PageAnalyzer + ?Sized,
{
    type Report = A::Report;

    async fn analyze(&self, url: &str) -> Result<Self::Report, AnalyzeError> {
        (**self).analyze(url).await
    }
}

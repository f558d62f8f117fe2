//! Site-Scout: a polite single-site crawler
//!
//! This crate crawls one website from a seed page, following same-host links
//! within depth, page-count and wall-clock budgets while respecting robots.txt.
//! Each accepted page is handed to a [`crawler::PageAnalyzer`] and the per-page
//! outcomes are aggregated into a single [`crawler::SiteReport`].

pub mod config;
pub mod crawler;
pub mod output;
pub mod robots;
pub mod url;

use thiserror::Error;

/// Run-level error type for Site-Scout operations
///
/// Only these errors abort a crawl. Per-page problems are recorded as
/// [`PageError`] values inside the returned report instead.
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Invalid seed URL {url}: {reason}")]
    InvalidSeed { url: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Failure recorded against a single crawled page
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    /// robots.txt disallows the URL; the page was never analyzed
    #[error("URL disallowed by robots.txt: {url}")]
    PolicyRejection { url: String },

    /// The page analyzer could not retrieve or process the page
    #[error("Failed to analyze {url}: {message}")]
    FetchFailure { url: String, message: String },
}

impl PageError {
    /// Returns true for robots.txt rejections, which are not counted as errors
    /// when judging the health of a run
    pub fn is_policy_rejection(&self) -> bool {
        matches!(self, Self::PolicyRejection { .. })
    }
}

/// Result type alias for Site-Scout operations
pub type Result<T> = std::result::Result<T, ScoutError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{Config, RunConfig};
pub use crawler::{crawl_site, AnalyzedPage, Coordinator, CrawlResult, PageAnalyzer, SiteReport};
pub use robots::RobotsGate;
pub use url::normalize_url;

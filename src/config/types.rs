use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Site-Scout
///
/// Every field has a default, so an empty TOML document is a valid config.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub robots: RobotsConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Maximum link depth from the seed page (seed is depth 0)
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,

    /// Maximum number of pages admitted during one run
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Number of concurrent workers
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Wall-clock budget for the whole run (milliseconds)
    #[serde(default = "default_time_budget_ms")]
    pub time_budget_ms: u64,

    /// Pause between consecutive fetches of one worker (milliseconds)
    #[serde(default = "default_politeness_delay_ms")]
    pub politeness_delay_ms: u64,

    /// Capacity of the task queue; defaults to `max-pages`
    #[serde(default)]
    pub queue_capacity: Option<usize>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_pages: default_max_pages(),
            concurrency: default_concurrency(),
            time_budget_ms: default_time_budget_ms(),
            politeness_delay_ms: default_politeness_delay_ms(),
            queue_capacity: None,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the crawler, also the robots.txt product token
    #[serde(default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(default = "default_crawler_version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(default)]
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the full user agent header value
    ///
    /// Format: `CrawlerName/Version` or `CrawlerName/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

/// robots.txt handling configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RobotsConfig {
    /// Timeout for fetching a host's robots.txt (milliseconds)
    #[serde(default = "default_robots_timeout_ms")]
    pub fetch_timeout_ms: u64,
}

impl Default for RobotsConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: default_robots_timeout_ms(),
        }
    }
}

/// Immutable settings for one crawl run
///
/// Built once from a [`Config`] (or [`RunConfig::default`]) before the run
/// starts and never mutated while workers are active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub max_depth: u32,
    pub max_pages: usize,
    pub concurrency: usize,
    pub user_agent: String,
    pub time_budget: Duration,
    pub politeness_delay: Duration,
    pub robots_timeout: Duration,
    pub queue_capacity: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig::from(&Config::default())
    }
}

impl From<&Config> for RunConfig {
    fn from(config: &Config) -> Self {
        let crawler = &config.crawler;
        Self {
            max_depth: crawler.max_depth,
            max_pages: crawler.max_pages,
            concurrency: crawler.concurrency,
            user_agent: config.user_agent.header_value(),
            time_budget: Duration::from_millis(crawler.time_budget_ms),
            politeness_delay: Duration::from_millis(crawler.politeness_delay_ms),
            robots_timeout: Duration::from_millis(config.robots.fetch_timeout_ms),
            queue_capacity: crawler.queue_capacity.unwrap_or(crawler.max_pages).max(1),
        }
    }
}

fn default_max_depth() -> u32 {
    2
}

fn default_max_pages() -> usize {
    30
}

fn default_concurrency() -> usize {
    5
}

fn default_time_budget_ms() -> u64 {
    15_000
}

fn default_politeness_delay_ms() -> u64 {
    200
}

fn default_robots_timeout_ms() -> u64 {
    10_000
}

fn default_crawler_name() -> String {
    "SiteScout".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

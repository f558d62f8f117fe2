//! Robots gate: cached, fail-open robots.txt authorization
//!
//! The gate owns a per-host cache. Each host key maps to a shared
//! `OnceCell`, so concurrent callers asking about the same uncached host wait
//! on a single in-flight fetch instead of each hitting the network.

use crate::robots::{CachedRobots, ParsedRobots, RobotsEntry};
use crate::url::host_key;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::OnceCell;
use url::Url;

type HostCell = Arc<OnceCell<CachedRobots>>;

/// Per-host robots.txt cache answering allow/deny questions
///
/// `allowed` never fails: network errors, error statuses and unusable content
/// are cached as [`RobotsEntry::Unavailable`] and resolve to "allowed".
pub struct RobotsGate {
    client: Client,
    cache: Mutex<HashMap<String, HostCell>>,
}

impl RobotsGate {
    /// Creates a gate with its own HTTP client
    ///
    /// # Arguments
    ///
    /// * `user_agent` - User agent header sent with robots.txt requests
    /// * `timeout` - Timeout for a single robots.txt fetch
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self::with_client(client))
    }

    /// Creates a gate around an existing HTTP client
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Returns whether `user_agent` may fetch `url`
    ///
    /// Fetches and caches `<scheme>://<authority>/robots.txt` on first use
    /// of a host. Any failure along the way means "allowed".
    pub async fn allowed(&self, user_agent: &str, url: &str) -> bool {
        let key = match Url::parse(url).ok().as_ref().and_then(host_key) {
            Some(key) => key,
            None => {
                tracing::debug!("Cannot derive robots host key for {}, allowing", url);
                return true;
            }
        };

        let cell = self.cell_for(&key);
        let cached = cell.get_or_init(|| self.fetch(&key)).await;
        cached.is_allowed(url, user_agent)
    }

    /// Pre-populates the cache for a host key (`scheme://authority`)
    ///
    /// `Some(content)` installs parsed rules; `None` installs the fail-open
    /// sentinel. Primed hosts are never fetched until the entry goes stale.
    pub fn prime(&self, host_key: &str, content: Option<&str>) {
        let entry = match content {
            Some(content) => RobotsEntry::Rules(ParsedRobots::from_content(content)),
            None => RobotsEntry::Unavailable,
        };
        let cell = Arc::new(OnceCell::new_with(Some(CachedRobots::new(entry))));
        self.lock_cache().insert(host_key.to_string(), cell);
    }

    /// Number of hosts with a cache slot (fetched, primed, or in flight)
    pub fn cached_hosts(&self) -> usize {
        self.lock_cache().len()
    }

    /// Returns the cache slot for a host, replacing it if it went stale
    fn cell_for(&self, key: &str) -> HostCell {
        let mut cache = self.lock_cache();
        if let Some(cell) = cache.get(key) {
            let stale = cell.get().map_or(false, CachedRobots::is_stale);
            if !stale {
                return Arc::clone(cell);
            }
            tracing::debug!("robots.txt for {} is stale, refetching", key);
        }

        let cell: HostCell = Arc::new(OnceCell::new());
        cache.insert(key.to_string(), Arc::clone(&cell));
        cell
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, HashMap<String, HostCell>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn fetch(&self, key: &str) -> CachedRobots {
        let robots_url = format!("{}/robots.txt", key);
        tracing::debug!("Fetching {}", robots_url);

        let entry = match self.client.get(&robots_url).send().await {
            Err(e) => {
                tracing::debug!("robots.txt unavailable for {}: {}", key, e);
                RobotsEntry::Unavailable
            }
            Ok(response) if !response.status().is_success() => {
                tracing::debug!(
                    "robots.txt for {} returned HTTP {}, allowing all",
                    key,
                    response.status().as_u16()
                );
                RobotsEntry::Unavailable
            }
            Ok(response) => {
                let is_html = response
                    .headers()
                    .get(CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .map_or(false, |ct| ct.contains("text/html"));

                if is_html {
                    tracing::debug!("robots.txt for {} is an HTML page, allowing all", key);
                    RobotsEntry::Unavailable
                } else {
                    match response.text().await {
                        Ok(body) => RobotsEntry::Rules(ParsedRobots::from_content(&body)),
                        Err(e) => {
                            tracing::debug!("Failed to read robots.txt for {}: {}", key, e);
                            RobotsEntry::Unavailable
                        }
                    }
                }
            }
        };

        CachedRobots::new(entry)
    }
}

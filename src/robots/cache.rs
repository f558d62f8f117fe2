//! Robots.txt cache entries
//!
//! A cache entry is either a parsed ruleset or the sentinel recorded when the
//! file could not be fetched or parsed. Entries expire after 24 hours so a
//! long-lived gate picks up changes made by the site owner.

use crate::robots::ParsedRobots;
use chrono::{DateTime, Duration, Utc};

/// Outcome of fetching a host's robots.txt
#[derive(Debug, Clone)]
pub enum RobotsEntry {
    /// robots.txt was fetched and parsed
    Rules(ParsedRobots),

    /// No usable robots.txt; every URL on the host is allowed
    Unavailable,
}

/// Cached robots.txt data for a host
#[derive(Debug, Clone)]
pub struct CachedRobots {
    /// The parsed rules or the fail-open sentinel
    pub entry: RobotsEntry,

    /// When the robots.txt was fetched
    pub fetched_at: DateTime<Utc>,
}

impl CachedRobots {
    /// Creates a new CachedRobots stamped with the current time
    pub fn new(entry: RobotsEntry) -> Self {
        Self {
            entry,
            fetched_at: Utc::now(),
        }
    }

    /// Checks if the cached robots.txt is stale (older than 24 hours)
    pub fn is_stale(&self) -> bool {
        self.age() > Duration::hours(24)
    }

    /// Returns the age of the cached robots.txt
    pub fn age(&self) -> Duration {
        Utc::now() - self.fetched_at
    }

    /// Returns true if this entry is the fail-open sentinel
    pub fn is_unavailable(&self) -> bool {
        matches!(self.entry, RobotsEntry::Unavailable)
    }

    /// Checks if a URL is allowed according to the cached entry
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        match &self.entry {
            RobotsEntry::Rules(rules) => rules.is_allowed(url, user_agent),
            RobotsEntry::Unavailable => true,
        }
    }
}

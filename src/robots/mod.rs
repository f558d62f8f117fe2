//! Robots.txt handling module
//!
//! This module provides functionality for fetching, parsing, and caching robots.txt files.
//! The [`RobotsGate`] is the single entry point the crawler uses: it answers
//! allow/deny per URL and fails open whenever a host's policy is unknown.

mod cache;
mod gate;
mod parser;

pub use cache::{CachedRobots, RobotsEntry};
pub use gate::RobotsGate;
pub use parser::{product_token, ParsedRobots};

//! Configuration module for Site-Scout
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, and turning them into the immutable [`RunConfig`] used by a crawl.
//!
//! # Example
//!
//! ```no_run
//! use site_scout::config::{load_config, RunConfig};
//! use std::path::Path;
//!
//! let config = load_config(Path::new("scout.toml")).unwrap();
//! let run = RunConfig::from(&config);
//! println!("Crawler will use max depth: {}", run.max_depth);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{Config, CrawlerConfig, RobotsConfig, RunConfig, UserAgentConfig};

pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;

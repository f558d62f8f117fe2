//! URL handling module for Site-Scout
//!
//! This module provides dedup-key normalization, the host/authority helpers
//! used for robots.txt caching and same-host link filtering, and the target
//! helpers used by the command line.

mod domain;
mod normalize;
mod target;

pub use domain::{extract_authority, host_key, is_same_host};
pub use normalize::normalize_url;
pub use target::{ensure_scheme, is_site_root};

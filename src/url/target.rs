//! Command-line target handling
//!
//! Users type bare hostnames as often as full URLs, and a site root means
//! "crawl the site" while any deeper path means "look at this one page".

use url::Url;

/// Index documents that count as the root of a site, trailing slashes removed
const ROOT_DOCUMENTS: &[&str] = &["", "/index.html", "/index.htm"];

/// Prepends `https://` when the input carries no http(s) scheme
///
/// # Examples
///
/// ```
/// use site_scout::url::ensure_scheme;
///
/// assert_eq!(ensure_scheme("example.com"), "https://example.com");
/// assert_eq!(ensure_scheme("http://example.com"), "http://example.com");
/// ```
pub fn ensure_scheme(input: &str) -> String {
    let trimmed = input.trim();
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

/// Returns true if the URL points at the root of a site
///
/// Trailing slashes are ignored, so `/index.html/` is a root too. Unparsable
/// input is never a site root.
pub fn is_site_root(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => ROOT_DOCUMENTS.contains(&parsed.path().trim_end_matches('/')),
        Err(_) => false,
    }
}

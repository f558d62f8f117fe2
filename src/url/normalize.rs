use url::Url;

/// Normalizes a URL into the key used for visit deduplication
///
/// # Normalization Steps
///
/// 1. Parse the URL; if parsing fails the raw input is returned unchanged
/// 2. Remove fragment (everything after #)
/// 3. Remove the query string
/// 4. Serialize, which collapses an empty path to the root `/`
/// 5. Trim one trailing slash, so the root path becomes empty
///
/// The result is only ever used as a dedup key. The original URL string is
/// what gets fetched and reported.
///
/// # Examples
///
/// ```
/// use site_scout::url::normalize_url;
///
/// assert_eq!(normalize_url("http://x.test/"), normalize_url("http://x.test"));
/// assert_eq!(normalize_url("http://x.test/a?x=1#f"), "http://x.test/a");
/// ```
pub fn normalize_url(url_str: &str) -> String {
    let mut url = match Url::parse(url_str) {
        Ok(url) => url,
        Err(_) => return url_str.to_string(),
    };

    url.set_fragment(None);
    url.set_query(None);

    let serialized = String::from(url);
    match serialized.strip_suffix('/') {
        Some(trimmed) => trimmed.to_string(),
        None => serialized,
    }
}

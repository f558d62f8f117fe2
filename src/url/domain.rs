use url::Url;

/// Extracts the authority (lowercase host plus explicit port) from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_scout::url::extract_authority;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_authority(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(extract_authority(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn extract_authority(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host),
    }
}

/// Builds the robots cache key for a URL: `scheme://authority`
pub fn host_key(url: &Url) -> Option<String> {
    extract_authority(url).map(|authority| format!("{}://{}", url.scheme(), authority))
}

/// Returns true if `link` parses and lives on the given authority
pub fn is_same_host(link: &str, authority: &str) -> bool {
    Url::parse(link)
        .ok()
        .and_then(|url| extract_authority(&url))
        .map_or(false, |link_authority| link_authority == authority)
}

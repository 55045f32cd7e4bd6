use url::Url;

/// Extracts the hostname from a URL
///
/// The host is lowercased and never includes the port. URLs without a host
/// (`mailto:`, `data:` and friends) yield `None`.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use link_tally::url::extract_host;
///
/// let url = Url::parse("https://EXAMPLE.COM:8443/path").unwrap();
/// assert_eq!(extract_host(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("mailto:someone@example.com").unwrap();
/// assert_eq!(extract_host(&url), None);
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns true when both URLs carry the same hostname
///
/// Scheme and port are ignored. A URL without a host is never on the same
/// host as anything.
pub fn is_same_host(a: &Url, b: &Url) -> bool {
    match (extract_host(a), extract_host(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

use crate::UrlError;
use std::borrow::Borrow;
use std::fmt;
use url::Url;

/// Canonical page key: host (plus any explicit port) followed by the path
///
/// Scheme, query and fragment are dropped and a single trailing `/` is
/// removed, so `https://a.com/path/` and `http://a.com/path#top` share the
/// key `a.com/path`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedUrl(String);

impl NormalizedUrl {
    /// Returns the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Rebuilds an absolute URL from the key
    ///
    /// The scheme is not part of the key, so `https` is assumed. Normalizing
    /// the returned URL gives back the same key.
    pub fn to_url(&self) -> Result<Url, UrlError> {
        let rebuilt = format!("https://{}", self.0);
        Url::parse(&rebuilt).map_err(|e| UrlError::Parse(format!("{}: {}", rebuilt, e)))
    }

    #[cfg(test)]
    pub(crate) fn from_key(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl fmt::Display for NormalizedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for NormalizedUrl {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<NormalizedUrl> for String {
    fn from(key: NormalizedUrl) -> Self {
        key.0
    }
}

/// Normalizes a URL string into a page key
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Reject URLs without a host
/// 3. Keep the lowercase host and any explicit port other than 80 or 443
/// 4. Keep the path, dropping a single trailing slash
/// 5. Discard scheme, query and fragment
///
/// # Arguments
///
/// * `url_str` - The absolute URL to normalize
///
/// # Returns
///
/// * `Ok(NormalizedUrl)` - The page key
/// * `Err(UrlError)` - The URL could not be parsed or has no host
///
/// # Examples
///
/// ```
/// use link_tally::url::normalize_url;
///
/// let key = normalize_url("https://blog.example.com/path/").unwrap();
/// assert_eq!(key.as_str(), "blog.example.com/path");
/// ```
pub fn normalize_url(url_str: &str) -> Result<NormalizedUrl, UrlError> {
    let url = Url::parse(url_str).map_err(|e| UrlError::Parse(format!("{}: {}", url_str, e)))?;
    normalize_parsed(&url)
}

/// Normalizes an already parsed URL into a page key
pub fn normalize_parsed(url: &Url) -> Result<NormalizedUrl, UrlError> {
    let host = url
        .host_str()
        .ok_or_else(|| UrlError::MissingHost(url.to_string()))?
        .to_lowercase();

    let path = url.path();
    let path = path.strip_suffix('/').unwrap_or(path);

    // 80 and 443 are dropped whatever the scheme
    let key = match url.port() {
        Some(80 | 443) | None => format!("{}{}", host, path),
        Some(port) => format!("{}:{}{}", host, port, path),
    };

    Ok(NormalizedUrl(key))
}

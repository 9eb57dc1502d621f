use crate::UrlError;
use std::fmt::Write;
use url::Url;

/// Normalizes a URL into the key used to deduplicate pages
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed or if it has no host
/// 2. Drop the scheme
/// 3. Lowercase the host and remove a leading `www.`
/// 4. Keep a non-default port as `host:port`
/// 5. Drop query string and fragment
/// 6. Remove exactly one trailing `/` from the path (so the root path
///    normalizes to the bare host)
///
/// The result is never used for network requests; the original absolute
/// URL is kept for fetching.
///
/// # Examples
///
/// ```
/// use sitewalk::url::normalize_url;
///
/// assert_eq!(normalize_url("https://EX.com/a/").unwrap(), "ex.com/a");
/// assert_eq!(normalize_url("http://www.ex.com/a?x=1#top").unwrap(), "ex.com/a");
/// assert_eq!(normalize_url("https://example.com/").unwrap(), "example.com");
/// ```
pub fn normalize_url(url_str: &str) -> Result<String, UrlError> {
    let url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;
    normalize_parsed(&url)
}

/// Same as [`normalize_url`] for an already parsed URL
pub fn normalize_parsed(url: &Url) -> Result<String, UrlError> {
    let host = match url.host_str() {
        Some(h) if !h.is_empty() => h.to_lowercase(),
        _ => return Err(UrlError::MissingDomain),
    };

    let mut key = String::from(host.strip_prefix("www.").unwrap_or(&host));

    if let Some(port) = url.port() {
        // Writing into a String cannot fail
        let _ = write!(key, ":{}", port);
    }

    let path = url.path();
    key.push_str(path.strip_suffix('/').unwrap_or(path));

    Ok(key)
}

use url::Url;

/// Extracts the lowercase host of a URL, without port
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sitewalk::url::extract_host;
///
/// let url = Url::parse("https://EXAMPLE.COM:8443/path").unwrap();
/// assert_eq!(extract_host(&url), Some("example.com".to_string()));
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str()
        .filter(|h| !h.is_empty())
        .map(|h| h.to_lowercase())
}

/// Whether `host` belongs to the same site as `seed_host`
///
/// Hosts must match exactly, so `www.example.com` is another site than
/// `example.com`. Both arguments are expected to be lowercase, as returned
/// by [`extract_host`].
pub fn is_same_site(host: &str, seed_host: &str) -> bool {
    host == seed_host
}

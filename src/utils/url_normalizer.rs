//! Target URL normalization.
//!
//! Runs in the HTTP adapter before a target reaches the shorten flow, so that
//! deduplication by exact target sees one canonical spelling per URL.

use url::Url;

/// Errors that can occur during URL normalization.
#[derive(Debug, thiserror::Error)]
pub enum UrlNormalizationError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL must contain a host")]
    MissingHost,
}

/// Normalizes a target URL to its canonical form.
///
/// # Rules
///
/// 1. Only `http` and `https` schemes are accepted
/// 2. The host is lowercased (the `url` parser already does this for
///    special schemes)
/// 3. Default ports are dropped (80 for HTTP, 443 for HTTPS)
/// 4. The fragment is dropped
/// 5. A trailing `/` on a non-root path is trimmed
///
/// Query strings and path case are preserved.
///
/// # Errors
///
/// Returns [`UrlNormalizationError::InvalidFormat`] for malformed URLs,
/// [`UrlNormalizationError::UnsupportedProtocol`] for other schemes and
/// [`UrlNormalizationError::MissingHost`] when no host is present.
///
/// # Examples
///
/// ```
/// use shortlink::utils::url_normalizer::normalize_url;
///
/// assert_eq!(
///     normalize_url("HTTPS://Example.COM:443/Docs/#top").unwrap(),
///     "https://example.com/Docs"
/// );
/// ```
pub fn normalize_url(input: &str) -> Result<String, UrlNormalizationError> {
    let mut url =
        Url::parse(input.trim()).map_err(|e| UrlNormalizationError::InvalidFormat(e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(UrlNormalizationError::UnsupportedProtocol);
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(UrlNormalizationError::MissingHost);
    }

    // Host case and default ports are already canonical after parsing.
    url.set_fragment(None);

    let path = url.path();
    if path.len() > 1 && path.ends_with('/') {
        let trimmed = path.trim_end_matches('/').to_string();
        url.set_path(if trimmed.is_empty() { "/" } else { &trimmed });
    }

    Ok(url.to_string())
}

//! URL resolution for manifest entries, fallbacks and intercepted requests.

use url::Url;

/// Browser-extension schemes the router never intercepts.
pub const EXTENSION_SCHEMES: &[&str] = &["chrome-extension", "moz-extension", "safari-web-extension"];

/// Error type for URL resolution failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Parse the site origin every relative path is resolved against.
pub fn parse_origin(input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }
    let origin = Url::parse(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    match origin.scheme() {
        "http" | "https" => Ok(origin),
        scheme => Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }
}

/// Resolve a path or absolute URL against the site origin.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Join relative input onto `origin`; absolute input replaces it
/// 3. Remove fragment (#...)
/// 4. Keep query string intact (do not reorder)
///
/// The host is lowercased by the URL parser itself.
pub fn resolve(origin: &Url, input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = origin.join(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

/// Whether the router may intercept a request to this URL at all.
///
/// Extension pages and any other non-HTTP scheme fall through untouched.
pub fn is_interceptable(url: &Url) -> bool {
    let scheme = url.scheme();
    !EXTENSION_SCHEMES.contains(&scheme) && matches!(scheme, "http" | "https")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Url {
        parse_origin("http://localhost:3000").unwrap()
    }

    #[test]
    fn test_resolve_relative_path() {
        let url = resolve(&origin(), "/styles.min.css").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/styles.min.css");
    }

    #[test]
    fn test_resolve_root() {
        let url = resolve(&origin(), "/").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/");
    }

    #[test]
    fn test_resolve_absolute_replaces_origin() {
        let url = resolve(&origin(), "https://fonts.gstatic.com/s/inter.woff2").unwrap();
        assert_eq!(url.host_str(), Some("fonts.gstatic.com"));
    }

    #[test]
    fn test_resolve_lowercase_host() {
        let url = resolve(&origin(), "https://FONTS.GOOGLEAPIS.COM/css2").unwrap();
        assert_eq!(url.host_str(), Some("fonts.googleapis.com"));
    }

    #[test]
    fn test_resolve_remove_fragment() {
        let url = resolve(&origin(), "/index.html#contact").unwrap();
        assert_eq!(url.fragment(), None);
        assert_eq!(url.path(), "/index.html");
    }

    #[test]
    fn test_resolve_preserve_query() {
        let url = resolve(&origin(), "/api/orders?username=a&b=2").unwrap();
        assert_eq!(url.query(), Some("username=a&b=2"));
    }

    #[test]
    fn test_resolve_trim_whitespace() {
        let url = resolve(&origin(), "  /offline.html  ").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/offline.html");
    }

    #[test]
    fn test_resolve_unsupported_scheme() {
        let result = resolve(&origin(), "file:///etc/passwd");
        assert!(matches!(result, Err(UrlError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_resolve_empty() {
        assert!(matches!(resolve(&origin(), ""), Err(UrlError::Empty)));
        assert!(matches!(resolve(&origin(), "   "), Err(UrlError::Empty)));
    }

    #[test]
    fn test_parse_origin_rejects_non_http() {
        assert!(matches!(parse_origin("ftp://example.com"), Err(UrlError::UnsupportedScheme(_))));
        assert!(matches!(parse_origin(""), Err(UrlError::Empty)));
    }

    #[test]
    fn test_is_interceptable() {
        assert!(is_interceptable(&Url::parse("http://localhost:3000/").unwrap()));
        assert!(is_interceptable(&Url::parse("https://fonts.gstatic.com/x").unwrap()));
        assert!(!is_interceptable(&Url::parse("chrome-extension://abcdef/popup.html").unwrap()));
        assert!(!is_interceptable(&Url::parse("moz-extension://abcdef/icon.png").unwrap()));
        assert!(!is_interceptable(&Url::parse("data:text/plain,hi").unwrap()));
    }
}

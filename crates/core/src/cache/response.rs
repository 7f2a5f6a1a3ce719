//! Response values held in cache stores and returned to the page.

use http::StatusCode;
use serde::{Deserialize, Serialize};

/// An HTTP response as stored in, or served from, a cache store.
///
/// A response is a plain value: caching a response and returning it to the
/// caller is a `clone()`, never a second read of a network body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedResponse {
    /// URL the response answers.
    pub url: String,
    pub status: u16,
    pub status_text: String,
    /// Header name/value pairs in arrival order.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl CachedResponse {
    /// Build a response with no headers and the canonical reason phrase for `status`.
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<Vec<u8>>) -> Self {
        let status_text = StatusCode::from_u16(status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .unwrap_or_default();
        Self { url: url.into(), status, status_text: status_text.to_string(), headers: Vec::new(), body: body.into() }
    }

    /// The synthetic 503 served when every fallback is exhausted.
    pub fn unavailable(url: impl Into<String>, body: &str) -> Self {
        Self::new(url, StatusCode::SERVICE_UNAVAILABLE.as_u16(), body)
            .with_header("content-type", "text/plain; charset=utf-8")
    }

    /// Add a header, keeping any existing values.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Whether the status is in the 2xx range.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First value of the named header, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Declared body length from `content-length`, if present and numeric.
    pub fn content_length(&self) -> Option<u64> {
        self.header("content-length").and_then(|v| v.trim().parse().ok())
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable() {
        let response = CachedResponse::unavailable("https://example.com/api/data", "Offline");
        assert_eq!(response.status, 503);
        assert_eq!(response.status_text, "Service Unavailable");
        assert_eq!(response.text(), "Offline");
        assert!(!response.is_ok());
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let response = CachedResponse::new("https://example.com/", 200, "hi").with_header("Content-Length", "2");
        assert_eq!(response.header("content-length"), Some("2"));
        assert_eq!(response.content_length(), Some(2));
        assert_eq!(response.header("etag"), None);
    }

    #[test]
    fn test_content_length_unparseable() {
        let response = CachedResponse::new("https://example.com/", 200, "").with_header("content-length", "lots");
        assert_eq!(response.content_length(), None);
    }

    #[test]
    fn test_reason_phrase_follows_status() {
        assert_eq!(CachedResponse::new("u", 200, "").status_text, "OK");
        assert_eq!(CachedResponse::new("u", 418, "").status_text, "I'm a teapot");
        assert_eq!(CachedResponse::new("u", 599, "").status_text, "");
    }

    #[test]
    fn test_is_ok_range() {
        assert!(CachedResponse::new("u", 200, "").is_ok());
        assert!(CachedResponse::new("u", 204, "").is_ok());
        assert!(!CachedResponse::new("u", 304, "").is_ok());
        assert!(!CachedResponse::new("u", 404, "").is_ok());
    }
}

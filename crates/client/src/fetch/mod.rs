//! Network access for the router.
//!
//! ### Requests
//! - `Request` is the router's view of a page request: method, resolved URL
//!   and an optional body for background-sync POSTs.
//!
//! ### Network seam
//! - Strategies only talk to the `Network` trait, so tests script the network
//!   and production uses the reqwest-backed `FetchClient`.
//! - Any HTTP status is a response; only transport failures are errors.
//!
//! ### URL handling
//! - Relative paths resolve against the configured site origin.
//! - Extension and other non-HTTP schemes are never intercepted.

pub mod url;

use async_trait::async_trait;
use reqwest::{Client, Method, header};
use std::time::{Duration, Instant};

pub use self::url::{EXTENSION_SCHEMES, UrlError, is_interceptable, parse_origin, resolve};

use ::url::Url;
use windhelm_core::{AppConfig, CachedResponse, Error};

/// A request as seen by the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub url: Url,
    pub body: Option<Vec<u8>>,
    pub content_type: Option<String>,
}

impl Request {
    /// A GET request with no body.
    pub fn get(url: Url) -> Self {
        Self { method: "GET".into(), url, body: None, content_type: None }
    }

    /// A POST request carrying `body`.
    pub fn post(url: Url, body: Vec<u8>, content_type: Option<String>) -> Self {
        Self { method: "POST".into(), url, body: Some(body), content_type }
    }

    /// Whether this is a GET, the only method the router caches.
    pub fn is_get(&self) -> bool {
        self.method.eq_ignore_ascii_case("GET")
    }
}

/// The network as the router sees it: request in, response or failure out.
#[async_trait]
pub trait Network: Send + Sync {
    /// Send a request.
    ///
    /// Returns `Error::FetchFailed` or `Error::FetchTimeout` when no response
    /// arrived; an HTTP error status is still `Ok`.
    async fn fetch(&self, request: &Request) -> Result<CachedResponse, Error>;
}

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "windhelm-sw/0.1")
    pub user_agent: String,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { user_agent: "windhelm-sw/0.1".to_string(), timeout: Duration::from_millis(20000), max_redirects: 5 }
    }
}

impl FetchConfig {
    /// Fetch settings taken from the application config.
    pub fn from_app(config: &AppConfig) -> Self {
        Self { user_agent: config.user_agent.clone(), timeout: config.fetch_timeout(), ..Default::default() }
    }
}

/// HTTP fetch client backed by reqwest.
pub struct FetchClient {
    http: Client,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::FetchFailed(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http })
    }
}

#[async_trait]
impl Network for FetchClient {
    async fn fetch(&self, request: &Request) -> Result<CachedResponse, Error> {
        let start = Instant::now();
        let method = Method::from_bytes(request.method.to_ascii_uppercase().as_bytes())
            .map_err(|_| Error::InvalidInput(format!("unsupported method: {}", request.method)))?;

        let mut builder = self.http.request(method, request.url.as_str());
        if let Some(content_type) = &request.content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::FetchTimeout(format!("{}: {}", request.url, e))
            } else {
                Error::FetchFailed(format!("{}: {}", request.url, e))
            }
        })?;

        let status = response.status();
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string())))
            .collect();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::FetchFailed(format!("failed to read response: {}", e)))?;

        tracing::debug!(
            "fetched {} {} -> {} in {}ms ({} bytes)",
            request.method,
            request.url,
            status.as_u16(),
            start.elapsed().as_millis(),
            bytes.len()
        );

        Ok(CachedResponse { headers, ..CachedResponse::new(request.url.as_str(), status.as_u16(), bytes.to_vec()) })
    }
}

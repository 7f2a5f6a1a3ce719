//! Caching strategies.
//!
//! - cache-first: static manifest entries and fonts, written to the static store
//! - cache-first with size guard: images, written to the dynamic store
//! - network-first with timeout: everything else, written to the dynamic store
//!
//! Each strategy performs at most one network fetch and at most one cache
//! write. When every fallback is exhausted the caller gets a synthetic 503.

use serde::{Deserialize, Serialize};
use url::Url;
use windhelm_core::CachedResponse;

use super::CacheRouter;
use super::classify::AssetClass;
use crate::fetch::Request;

/// Where the served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    /// A cached entry for the request URL.
    Cache,
    Network,
    /// A cached stand-in: the offline page or the default image.
    Fallback,
    /// Generated 503.
    Synthetic,
}

/// A request the router intercepted, and how it was served.
#[derive(Debug, Clone)]
pub struct Handled {
    pub class: AssetClass,
    pub source: ResponseSource,
    pub response: CachedResponse,
    pub network_fetches: u8,
    /// Store the response was written to, if any.
    pub cache_write: Option<String>,
}

impl Handled {
    fn cached(class: AssetClass, source: ResponseSource, response: CachedResponse, network_fetches: u8) -> Self {
        Self { class, source, response, network_fetches, cache_write: None }
    }

    pub(crate) fn synthetic(class: AssetClass, response: CachedResponse, network_fetches: u8) -> Self {
        Self { class, source: ResponseSource::Synthetic, response, network_fetches, cache_write: None }
    }
}

impl CacheRouter {
    /// Serve from cache if present; otherwise fetch and keep a copy in the static store.
    pub(crate) async fn cache_first(&self, request: &Request, class: AssetClass, unavailable: &str) -> Handled {
        if let Some(cached) = self.lookup(&request.url).await {
            return Handled::cached(class, ResponseSource::Cache, cached, 0);
        }

        match self.network.fetch(request).await {
            Ok(response) => {
                let cache_write = if response.is_ok() {
                    self.store(&self.config.names.static_name, request, &response).await
                } else {
                    None
                };
                Handled { class, source: ResponseSource::Network, response, network_fetches: 1, cache_write }
            }
            Err(e) => {
                tracing::warn!(class = class.as_str(), "error handling {}: {}", request.url, e);
                Handled::synthetic(class, CachedResponse::unavailable(request.url.as_str(), unavailable), 1)
            }
        }
    }

    /// Cache-first into the dynamic store, skipping images at or over the size ceiling.
    pub(crate) async fn cache_first_image(&self, request: &Request) -> Handled {
        let class = AssetClass::Image;
        if let Some(cached) = self.lookup(&request.url).await {
            return Handled::cached(class, ResponseSource::Cache, cached, 0);
        }

        match self.network.fetch(request).await {
            Ok(response) => {
                let cache_write = if response.is_ok() && self.fits_image_ceiling(&response) {
                    self.store(&self.config.names.dynamic_name, request, &response).await
                } else {
                    if response.is_ok() {
                        tracing::debug!(
                            "not caching {}: declared {:?} bytes",
                            request.url,
                            response.content_length()
                        );
                    }
                    None
                };
                Handled { class, source: ResponseSource::Network, response, network_fetches: 1, cache_write }
            }
            Err(e) => {
                tracing::warn!("error loading image {}: {}", request.url, e);
                match self.lookup(&self.config.fallback_image).await {
                    Some(fallback) => Handled::cached(class, ResponseSource::Fallback, fallback, 1),
                    None => Handled::synthetic(
                        class,
                        CachedResponse::unavailable(request.url.as_str(), "Image unavailable"),
                        1,
                    ),
                }
            }
        }
    }

    /// Network within the dynamic timeout; then the cached copy; then the offline page.
    pub(crate) async fn network_first(&self, request: &Request) -> Handled {
        let class = AssetClass::Dynamic;
        let timeout = self.config.dynamic_timeout;

        let failure = match tokio::time::timeout(timeout, self.network.fetch(request)).await {
            Ok(Ok(response)) => {
                let cache_write = if response.is_ok() {
                    self.store(&self.config.names.dynamic_name, request, &response).await
                } else {
                    None
                };
                return Handled { class, source: ResponseSource::Network, response, network_fetches: 1, cache_write };
            }
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!("no response within {}ms", timeout.as_millis()),
        };

        tracing::warn!("network failed for {}, trying cache: {}", request.url, failure);

        if let Some(cached) = self.lookup(&request.url).await {
            return Handled::cached(class, ResponseSource::Cache, cached, 1);
        }
        if let Some(offline) = self.lookup(&self.config.offline_page).await {
            return Handled::cached(class, ResponseSource::Fallback, offline, 1);
        }

        Handled::synthetic(class, CachedResponse::unavailable(request.url.as_str(), "Offline"), 1)
    }

    fn fits_image_ceiling(&self, response: &CachedResponse) -> bool {
        response
            .content_length()
            .is_none_or(|len| len < self.config.max_image_bytes)
    }

    /// Match a GET for `url` across all stores; storage errors count as a miss.
    async fn lookup(&self, url: &Url) -> Option<CachedResponse> {
        match self.db.match_any("GET", url.as_str()).await {
            Ok(hit) => {
                tracing::debug!(url = %url, hit = hit.is_some(), "cache lookup");
                hit
            }
            Err(e) => {
                tracing::warn!("cache lookup failed for {}: {}", url, e);
                None
            }
        }
    }

    /// Write a response; a rejected write is logged and the response still served.
    async fn store(&self, store: &str, request: &Request, response: &CachedResponse) -> Option<String> {
        match self.db.put(store, &request.method, request.url.as_str(), response).await {
            Ok(()) => Some(store.to_string()),
            Err(e) => {
                tracing::warn!(store, "cache write failed for {}: {}", request.url, e);
                None
            }
        }
    }
}

//! Immutable router configuration.
//!
//! Built once from `AppConfig`: every path is resolved against the origin and
//! the image pattern is compiled, so classification never re-parses config.

use std::time::Duration;

use regex::Regex;
use url::Url;
use windhelm_core::{AppConfig, CacheNames, Error};

use crate::fetch::{parse_origin, resolve};

/// Path segment that marks a request as an image regardless of extension.
pub const IMAGE_PATH_SEGMENT: &str = "/images/";

/// Everything the router needs to classify and serve requests for one worker version.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    pub names: CacheNames,
    pub origin: Url,
    /// Manifest entries, resolved and fragment-free.
    pub static_assets: Vec<Url>,
    /// Case-insensitive `\.(ext|...)$` over the URL path; `None` when no extensions are configured.
    pub image_pattern: Option<Regex>,
    pub font_hosts: Vec<String>,
    pub offline_page: Url,
    pub fallback_image: Url,
    pub notification_icon: Url,
    pub max_image_bytes: u64,
    pub dynamic_timeout: Duration,
    pub sync_tag: String,
}

impl RouterConfig {
    /// Resolve and compile the application config.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidUrl` if the origin or any configured path does
    /// not resolve to an http(s) URL.
    pub fn from_app(config: &AppConfig) -> Result<Self, Error> {
        let origin = parse_origin(&config.origin).map_err(|e| Error::InvalidUrl(format!("origin: {e}")))?;
        let at = |field: &str, path: &str| {
            resolve(&origin, path).map_err(|e| Error::InvalidUrl(format!("{field} {path:?}: {e}")))
        };

        let static_assets = config
            .static_assets
            .iter()
            .map(|asset| at("static_assets", asset))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            names: config.cache_names(),
            static_assets,
            image_pattern: image_pattern(&config.image_extensions)?,
            font_hosts: config.font_hosts.iter().map(|h| h.trim().to_ascii_lowercase()).collect(),
            offline_page: at("offline_page", &config.offline_page)?,
            fallback_image: at("fallback_image", &config.fallback_image)?,
            notification_icon: at("notification_icon", &config.notification_icon)?,
            max_image_bytes: config.max_image_bytes,
            dynamic_timeout: config.dynamic_timeout(),
            sync_tag: config.sync_tag.clone(),
            origin,
        })
    }
}

fn image_pattern(extensions: &[String]) -> Result<Option<Regex>, Error> {
    let alternatives: Vec<String> = extensions
        .iter()
        .map(|ext| ext.trim().trim_start_matches('.'))
        .filter(|ext| !ext.is_empty())
        .map(regex::escape)
        .collect();

    if alternatives.is_empty() {
        return Ok(None);
    }

    Regex::new(&format!(r"(?i)\.({})$", alternatives.join("|")))
        .map(Some)
        .map_err(|e| Error::InvalidInput(format!("image_extensions: {e}")))
}

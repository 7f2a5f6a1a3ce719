//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (WINDHELM_*)
//! 2. TOML config file (if WINDHELM_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (WINDHELM_*)
/// 2. TOML config file (if WINDHELM_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Worker version tag embedded in both cache store names.
    ///
    /// Bumping it is the only way to invalidate cached assets.
    #[serde(default = "default_version_tag")]
    pub version_tag: String,

    /// Prefix shared by the cache store names.
    #[serde(default = "default_cache_prefix")]
    pub cache_prefix: String,

    /// Origin the site is served from; relative manifest entries resolve against it.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Path to SQLite cache database.
    ///
    /// Set via WINDHELM_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for network requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Critical assets fetched into the static store on install.
    #[serde(default = "default_static_assets")]
    pub static_assets: Vec<String>,

    /// File extensions (without dot) classified as images.
    #[serde(default = "default_image_extensions")]
    pub image_extensions: Vec<String>,

    /// Hosts serving web fonts.
    #[serde(default = "default_font_hosts")]
    pub font_hosts: Vec<String>,

    /// Page served when a dynamic request fails with nothing cached.
    #[serde(default = "default_offline_page")]
    pub offline_page: String,

    /// Image served when an image request fails with nothing cached.
    #[serde(default = "default_fallback_image")]
    pub fallback_image: String,

    /// Icon and badge used for push notifications.
    #[serde(default = "default_notification_icon")]
    pub notification_icon: String,

    /// Images whose declared length reaches this many bytes are never cached.
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: u64,

    /// Bound on the network leg of network-first requests, in milliseconds.
    #[serde(default = "default_dynamic_timeout_ms")]
    pub dynamic_timeout_ms: u64,

    /// Overall HTTP client timeout in milliseconds.
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,

    /// Sync tag that drains the pending-submission queue.
    #[serde(default = "default_sync_tag")]
    pub sync_tag: String,

    /// Maximum body bytes held by a single cache store.
    #[serde(default = "default_quota_bytes")]
    pub quota_bytes: u64,
}

/// The pair of store names that are current for one worker version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CacheNames {
    pub static_name: String,
    pub dynamic_name: String,
}

impl CacheNames {
    /// Build the store names for a prefix and version tag.
    pub fn new(prefix: &str, version_tag: &str) -> Self {
        Self {
            static_name: format!("{prefix}-static-{version_tag}"),
            dynamic_name: format!("{prefix}-dynamic-{version_tag}"),
        }
    }

    /// Whether `name` is one of the two current stores.
    pub fn is_current(&self, name: &str) -> bool {
        name == self.static_name || name == self.dynamic_name
    }
}

fn default_version_tag() -> String {
    "v1.3".into()
}

fn default_cache_prefix() -> String {
    "windhelm".into()
}

fn default_origin() -> String {
    "http://localhost:3000".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./windhelm-cache.sqlite")
}

fn default_user_agent() -> String {
    "windhelm-sw/0.1".into()
}

fn default_static_assets() -> Vec<String> {
    [
        "/",
        "/index.html",
        "/styles.min.css",
        "/script.min.js",
        "/media/Logo.png",
        "/media/favicon.png",
        "/media/islandbg.png",
        "https://fonts.googleapis.com/css2?family=Inter:wght@300;400;500;600;700&family=Space+Grotesk:wght@300;400;500;600;700&display=swap",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_image_extensions() -> Vec<String> {
    ["jpg", "jpeg", "png", "gif", "webp", "svg"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_font_hosts() -> Vec<String> {
    vec!["fonts.googleapis.com".into(), "fonts.gstatic.com".into()]
}

fn default_offline_page() -> String {
    "/offline.html".into()
}

fn default_fallback_image() -> String {
    "/images/default-image.jpg".into()
}

fn default_notification_icon() -> String {
    "/images/favicon.png".into()
}

fn default_max_image_bytes() -> u64 {
    5 * 1024 * 1024
}

fn default_dynamic_timeout_ms() -> u64 {
    3_000
}

fn default_fetch_timeout_ms() -> u64 {
    20_000
}

fn default_sync_tag() -> String {
    "contact-form".into()
}

fn default_quota_bytes() -> u64 {
    50 * 1024 * 1024
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version_tag: default_version_tag(),
            cache_prefix: default_cache_prefix(),
            origin: default_origin(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            static_assets: default_static_assets(),
            image_extensions: default_image_extensions(),
            font_hosts: default_font_hosts(),
            offline_page: default_offline_page(),
            fallback_image: default_fallback_image(),
            notification_icon: default_notification_icon(),
            max_image_bytes: default_max_image_bytes(),
            dynamic_timeout_ms: default_dynamic_timeout_ms(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
            sync_tag: default_sync_tag(),
            quota_bytes: default_quota_bytes(),
        }
    }
}

impl AppConfig {
    /// Store names for the configured prefix and version tag.
    pub fn cache_names(&self) -> CacheNames {
        CacheNames::new(&self.cache_prefix, &self.version_tag)
    }

    /// Network-first timeout as Duration.
    pub fn dynamic_timeout(&self) -> Duration {
        Duration::from_millis(self.dynamic_timeout_ms)
    }

    /// HTTP client timeout as Duration for use with reqwest.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `WINDHELM_`
    /// 2. TOML file from `WINDHELM_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("WINDHELM_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("WINDHELM_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.version_tag, "v1.3");
        assert_eq!(config.db_path, PathBuf::from("./windhelm-cache.sqlite"));
        assert_eq!(config.static_assets.len(), 8);
        assert_eq!(config.max_image_bytes, 5 * 1024 * 1024);
        assert_eq!(config.dynamic_timeout_ms, 3_000);
        assert_eq!(config.sync_tag, "contact-form");
        assert_eq!(config.offline_page, "/offline.html");
    }

    #[test]
    fn test_cache_names() {
        let names = AppConfig::default().cache_names();
        assert_eq!(names.static_name, "windhelm-static-v1.3");
        assert_eq!(names.dynamic_name, "windhelm-dynamic-v1.3");
        assert!(names.is_current("windhelm-static-v1.3"));
        assert!(!names.is_current("windhelm-static-v1.2"));
        assert!(!names.is_current("windhelm-v1.3"));
    }

    #[test]
    fn test_version_bump_changes_names() {
        let old = CacheNames::new("windhelm", "v1.3");
        let new = CacheNames::new("windhelm", "v1.4");
        assert!(!new.is_current(&old.static_name));
        assert!(!new.is_current(&old.dynamic_name));
    }

    #[test]
    fn test_timeout_durations() {
        let config = AppConfig::default();
        assert_eq!(config.dynamic_timeout(), Duration::from_millis(3_000));
        assert_eq!(config.fetch_timeout(), Duration::from_millis(20_000));
    }

    #[test]
    fn test_load_layers_file_and_env() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "windhelm.toml",
                r#"
                version_tag = "v2.0"
                dynamic_timeout_ms = 1500
                "#,
            )?;
            jail.set_env("WINDHELM_CONFIG_FILE", "windhelm.toml");
            jail.set_env("WINDHELM_SYNC_TAG", "newsletter");
            jail.set_env("WINDHELM_DYNAMIC_TIMEOUT_MS", "2500");

            let config = AppConfig::load().expect("config should load");
            assert_eq!(config.version_tag, "v2.0");
            assert_eq!(config.sync_tag, "newsletter");
            assert_eq!(config.dynamic_timeout_ms, 2500);
            assert_eq!(config.cache_prefix, "windhelm");
            Ok(())
        });
    }
}

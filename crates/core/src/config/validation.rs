//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `version_tag`, `cache_prefix` or `user_agent` is empty
    /// - `origin` is not an http(s) origin
    /// - `dynamic_timeout_ms` is under 10ms or exceeds `fetch_timeout_ms`
    /// - `fetch_timeout_ms` exceeds 5 minutes
    /// - `max_image_bytes` or `quota_bytes` is 0
    ///
    /// Returns `ConfigError::Missing` if `sync_tag` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version_tag.trim().is_empty() {
            return Err(ConfigError::Invalid { field: "version_tag".into(), reason: "must not be empty".into() });
        }
        if self.cache_prefix.trim().is_empty() {
            return Err(ConfigError::Invalid { field: "cache_prefix".into(), reason: "must not be empty".into() });
        }
        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if !(self.origin.starts_with("http://") || self.origin.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                field: "origin".into(),
                reason: "must start with http:// or https://".into(),
            });
        }

        if self.dynamic_timeout_ms < 10 {
            return Err(ConfigError::Invalid {
                field: "dynamic_timeout_ms".into(),
                reason: "must be at least 10ms".into(),
            });
        }
        if self.fetch_timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "fetch_timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }
        if self.dynamic_timeout_ms > self.fetch_timeout_ms {
            return Err(ConfigError::Invalid {
                field: "dynamic_timeout_ms".into(),
                reason: "must not exceed fetch_timeout_ms".into(),
            });
        }

        if self.max_image_bytes == 0 {
            return Err(ConfigError::Invalid { field: "max_image_bytes".into(), reason: "must be greater than 0".into() });
        }
        if self.quota_bytes == 0 {
            return Err(ConfigError::Invalid { field: "quota_bytes".into(), reason: "must be greater than 0".into() });
        }

        if self.sync_tag.is_empty() {
            return Err(ConfigError::Missing {
                field: "sync_tag".into(),
                hint: "Set WINDHELM_SYNC_TAG environment variable".into(),
            });
        }

        if self.static_assets.is_empty() {
            tracing::warn!("static_assets is empty; install will cache nothing");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_version_tag() {
        let config = AppConfig { version_tag: "  ".into(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "version_tag"));
    }

    #[test]
    fn test_validate_bad_origin() {
        let config = AppConfig { origin: "localhost:3000".into(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "origin"));
    }

    #[test]
    fn test_validate_dynamic_timeout_too_small() {
        let config = AppConfig { dynamic_timeout_ms: 5, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "dynamic_timeout_ms"));
    }

    #[test]
    fn test_validate_dynamic_timeout_exceeds_fetch_timeout() {
        let config = AppConfig { dynamic_timeout_ms: 30_000, fetch_timeout_ms: 20_000, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "dynamic_timeout_ms"));
    }

    #[test]
    fn test_validate_fetch_timeout_exceeds_limit() {
        let config = AppConfig { fetch_timeout_ms: 301_000, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "fetch_timeout_ms"));
    }

    #[test]
    fn test_validate_zero_image_ceiling() {
        let config = AppConfig { max_image_bytes: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "max_image_bytes"));
    }

    #[test]
    fn test_validate_missing_sync_tag() {
        let config = AppConfig { sync_tag: String::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Missing { field, .. }) if field == "sync_tag"));
    }

    #[test]
    fn test_validate_edge_case_values() {
        let config = AppConfig { dynamic_timeout_ms: 10, fetch_timeout_ms: 10, quota_bytes: 1, ..Default::default() };
        assert!(config.validate().is_ok());
    }
}

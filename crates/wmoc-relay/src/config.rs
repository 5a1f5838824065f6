//! # Relay Configuration
//!
//! Configuration management for the relay server.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     WMOC_PORT=9000                                                     │
//! │     WMOC_STORE_BACKEND=redis                                           │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     explicit path, or $WMOC_CONFIG, or                                 │
//! │     ~/.config/wmoc-relay/relay.toml (Linux)                            │
//! │     ~/Library/Application Support/com.wmoc.wmoc-relay/relay.toml       │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     0.0.0.0:8088, memory store, 24h retention                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # relay.toml
//! [server]
//! bind_addr = "0.0.0.0"
//! port = 8088
//! max_body_bytes = 1048576
//!
//! [store]
//! backend = "redis"   # memory | redis
//! redis_url = "redis://127.0.0.1:6379"
//! key_prefix = "wmoc:"
//!
//! [retention]
//! ttl_hours = 24
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use wmoc_core::DEFAULT_RETENTION_HOURS;
use wmoc_store::{StoreBackend, StoreConfig};

use crate::error::{RelayError, RelayResult};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "WMOC_CONFIG";

// =============================================================================
// Server Settings
// =============================================================================

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Bind address (default: 0.0.0.0 for all interfaces).
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Port for agents and the dashboard.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Largest request body accepted, in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8088
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            bind_addr: default_bind_addr(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ServerSettings {
    /// Returns the full bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

// =============================================================================
// Retention Settings
// =============================================================================

/// How long a device's log and queue survive without writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionSettings {
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: u64,
}

fn default_ttl_hours() -> u64 {
    DEFAULT_RETENTION_HOURS
}

impl Default for RetentionSettings {
    fn default() -> Self {
        RetentionSettings {
            ttl_hours: default_ttl_hours(),
        }
    }
}

impl RetentionSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_hours.saturating_mul(3600))
    }
}

// =============================================================================
// Main Relay Configuration
// =============================================================================

/// Complete relay configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub retention: RetentionSettings,
}

impl RelayConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`config_path`, else `$WMOC_CONFIG`, else relay.toml)
    /// 3. Environment variables
    ///
    /// A file named explicitly must exist. The platform default may be absent.
    pub fn load(config_path: Option<PathBuf>) -> RelayResult<Self> {
        let explicit = config_path.or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));

        let mut config = match explicit {
            Some(path) => {
                info!(?path, "Loading relay config from file");
                Self::from_file(&path)?
            }
            None => match Self::default_config_path() {
                Some(path) if path.exists() => {
                    info!(?path, "Loading relay config from file");
                    Self::from_file(&path)?
                }
                path => {
                    debug!(?path, "Config file not found, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parses a TOML document.
    pub fn from_toml(contents: &str) -> RelayResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    fn from_file(path: &std::path::Path) -> RelayResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            RelayError::ConfigLoadFailed(format!("{}: {}", path.display(), e))
        })?;
        Self::from_toml(&contents)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> RelayResult<()> {
        if self.retention.ttl_hours == 0 {
            return Err(RelayError::InvalidConfig(
                "retention.ttl_hours must be greater than 0".into(),
            ));
        }

        if self.server.max_body_bytes == 0 {
            return Err(RelayError::InvalidConfig(
                "server.max_body_bytes must be greater than 0".into(),
            ));
        }

        self.store.validate()?;

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Applies overrides from any variable source.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // Bind address
        if let Some(addr) = lookup("WMOC_BIND_ADDR") {
            debug!(addr = %addr, "Overriding bind address from environment");
            self.server.bind_addr = addr;
        }

        // Port
        if let Some(port) = lookup("WMOC_PORT") {
            match port.parse::<u16>() {
                Ok(p) => {
                    debug!(port = p, "Overriding port from environment");
                    self.server.port = p;
                }
                Err(_) => warn!(port = %port, "Ignoring invalid WMOC_PORT"),
            }
        }

        // Store backend
        if let Some(backend) = lookup("WMOC_STORE_BACKEND") {
            match backend.parse::<StoreBackend>() {
                Ok(parsed) => {
                    debug!(backend = %parsed, "Overriding store backend from environment");
                    self.store.backend = parsed;
                }
                Err(_) => warn!(backend = %backend, "Unknown store backend in environment"),
            }
        }

        // Redis URL (never logged, may carry credentials)
        if let Some(url) = lookup("WMOC_REDIS_URL") {
            self.store.redis_url = url;
        }

        // Key prefix
        if let Some(prefix) = lookup("WMOC_KEY_PREFIX") {
            self.store.key_prefix = prefix;
        }

        // Retention
        if let Some(hours) = lookup("WMOC_RETENTION_HOURS") {
            match hours.parse::<u64>() {
                Ok(h) => self.retention.ttl_hours = h,
                Err(_) => warn!(hours = %hours, "Ignoring invalid WMOC_RETENTION_HOURS"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "wmoc", "wmoc-relay")
            .map(|dirs| dirs.config_dir().join("relay.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Retention window for logs and queues.
    pub fn ttl(&self) -> Duration {
        self.retention.ttl()
    }

    pub fn bind_address(&self) -> String {
        self.server.bind_address()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = RelayConfig::default();
        assert_eq!(config.server.port, 8088);
        assert_eq!(config.bind_address(), "0.0.0.0:8088");
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.ttl(), Duration::from_secs(24 * 3600));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = RelayConfig::from_toml(
            r#"
            [store]
            backend = "redis"
            redis_url = "redis://cache:6379"

            [retention]
            ttl_hours = 6
            "#,
        )
        .unwrap();

        assert_eq!(config.server, ServerSettings::default());
        assert_eq!(config.store.backend, StoreBackend::Redis);
        assert_eq!(config.store.key_prefix, "wmoc:");
        assert_eq!(config.ttl(), Duration::from_secs(6 * 3600));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bad_toml_is_load_error() {
        let err = RelayConfig::from_toml("[server]\nport = \"eighty\"").unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_config_validation() {
        let mut config = RelayConfig::default();

        config.retention.ttl_hours = 0;
        assert!(config.validate().is_err());

        config.retention.ttl_hours = 1;
        config.server.max_body_bytes = 0;
        assert!(config.validate().is_err());

        config.server.max_body_bytes = 1024;
        config.store = StoreConfig::redis("http://cache");
        assert!(config.validate().is_err());

        config.store = StoreConfig::redis("rediss://cache:6380");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let mut config = RelayConfig::default();
        config.apply_overrides(vars(&[
            ("WMOC_BIND_ADDR", "127.0.0.1"),
            ("WMOC_PORT", "9000"),
            ("WMOC_STORE_BACKEND", "redis"),
            ("WMOC_REDIS_URL", "redis://cache:6379"),
            ("WMOC_KEY_PREFIX", "rigs:"),
            ("WMOC_RETENTION_HOURS", "48"),
        ]));

        assert_eq!(config.bind_address(), "127.0.0.1:9000");
        assert_eq!(config.store.backend, StoreBackend::Redis);
        assert_eq!(config.store.redis_url, "redis://cache:6379");
        assert_eq!(config.store.key_prefix, "rigs:");
        assert_eq!(config.retention.ttl_hours, 48);
    }

    #[test]
    fn test_invalid_overrides_are_ignored() {
        let mut config = RelayConfig::default();
        config.apply_overrides(vars(&[
            ("WMOC_PORT", "not-a-port"),
            ("WMOC_STORE_BACKEND", "postgres"),
        ]));
        assert_eq!(config, RelayConfig::default());
    }

    #[test]
    fn test_toml_serialization() {
        let config = RelayConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[server]"));
        assert!(toml_str.contains("[store]"));
        assert!(toml_str.contains("[retention]"));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let err = RelayConfig::load(Some(PathBuf::from("/nonexistent/wmoc/relay.toml"))).unwrap_err();
        assert!(err.is_config_error());
    }
}

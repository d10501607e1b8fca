//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::api::ApiConfig;
use crate::hub::{Credentials, HubConfig, HIDDEN_GOAL};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub hub: HubSection,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3003
}

fn default_max_body_size() -> usize {
    10 * 1024 * 1024 // 10 MB
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_size: default_max_body_size(),
        }
    }
}

/// Hub configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HubSection {
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,

    #[serde(default = "default_like_goal")]
    pub like_goal: u64,

    #[serde(default = "default_follow_goal")]
    pub follow_goal: u64,

    /// Goal assigned when an overlay asks to hide a completed goal
    #[serde(default = "default_hidden_goal")]
    pub hidden_goal: u64,
}

fn default_max_connections() -> usize {
    1000
}

fn default_like_goal() -> u64 {
    100
}

fn default_follow_goal() -> u64 {
    50
}

fn default_hidden_goal() -> u64 {
    HIDDEN_GOAL
}

impl Default for HubSection {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            like_goal: default_like_goal(),
            follow_goal: default_follow_goal(),
            hidden_goal: default_hidden_goal(),
        }
    }
}

/// Producer authentication
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_app_id")]
    pub app_id: String,

    /// When set, producers must also present this secret
    #[serde(default)]
    pub secret_key: Option<String>,
}

fn default_app_id() -> String {
    "TikHub-Overlay-Integration".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            app_id: default_app_id(),
            secret_key: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        // Try default config locations
        let config_paths = [
            dirs::config_dir().map(|p| p.join("overlay-hub").join("config.toml")),
            Some(PathBuf::from("/etc/overlay-hub/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        // Fall back to environment-only config
        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides read through `lookup`.
    ///
    /// `PORT` is honored for hosting platforms; `OVERLAY_HUB_PORT` wins
    /// when both are set.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // Server overrides
        if let Some(host) = lookup("OVERLAY_HUB_HOST") {
            self.server.host = host;
        }
        for key in ["PORT", "OVERLAY_HUB_PORT"] {
            if let Some(port) = lookup(key).and_then(|p| p.parse().ok()) {
                self.server.port = port;
            }
        }

        // Hub overrides
        if let Some(max) = lookup("OVERLAY_HUB_MAX_CONNECTIONS").and_then(|m| m.parse().ok()) {
            self.hub.max_connections = max;
        }

        // Auth overrides
        if let Some(app_id) = lookup("OVERLAY_HUB_APP_ID") {
            self.auth.app_id = app_id;
        }
        if let Some(secret) = lookup("OVERLAY_HUB_SECRET_KEY") {
            self.auth.secret_key = Some(secret).filter(|s| !s.is_empty());
        }

        // Logging overrides
        if let Some(level) = lookup("OVERLAY_HUB_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("OVERLAY_HUB_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    /// HTTP layer settings
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            host: self.server.host.clone(),
            port: self.server.port,
            max_body_size: self.server.max_body_size,
        }
    }

    /// Hub settings
    pub fn hub_config(&self) -> HubConfig {
        HubConfig {
            max_connections: self.hub.max_connections,
            like_goal: self.hub.like_goal,
            follow_goal: self.hub.follow_goal,
            hidden_goal: self.hub.hidden_goal,
            credentials: Credentials {
                app_id: self.auth.app_id.clone(),
                secret_key: self.auth.secret_key.clone(),
            },
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Overlay Hub Configuration
#
# Environment variables override these settings:
# - PORT / OVERLAY_HUB_PORT
# - OVERLAY_HUB_HOST
# - OVERLAY_HUB_MAX_CONNECTIONS
# - OVERLAY_HUB_APP_ID
# - OVERLAY_HUB_SECRET_KEY
# - OVERLAY_HUB_LOG_LEVEL
# - OVERLAY_HUB_LOG_FORMAT

[server]
host = "0.0.0.0"
port = 3003

# Largest accepted request body (bytes)
max_body_size = 10485760

[hub]
# Concurrent overlay connections across all topics
max_connections = 1000

# Starting goals for the like and follow overlays
like_goal = 100
follow_goal = 50

# Goal assigned when an overlay hides a completed goal
hidden_goal = 999999

[auth]
# App id the producing application authenticates with
app_id = "TikHub-Overlay-Integration"

# Optional shared secret
# secret_key = "change-me"

[logging]
# trace, debug, info, warn, error
level = "info"

# pretty or json
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 3003);
        assert_eq!(config.hub.max_connections, 1000);
        assert_eq!(config.hub.hidden_goal, 999_999);
        assert_eq!(config.auth.app_id, "TikHub-Overlay-Integration");
        assert!(config.auth.secret_key.is_none());
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_generated_config_parses_to_defaults() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config.server.port, default_port());
        assert_eq!(config.server.max_body_size, default_max_body_size());
        assert_eq!(config.hub.like_goal, 100);
        assert_eq!(config.hub.follow_goal, 50);
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = 8080\n\n[hub]\nlike_goal = 250").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.hub.like_goal, 250);
        assert_eq!(config.hub.follow_goal, 50);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            Config::load(&missing),
            Err(ConfigError::Io { .. })
        ));

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "[server\nport = ").unwrap();
        assert!(matches!(Config::load(&bad), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("PORT", "9000"),
            ("OVERLAY_HUB_HOST", "127.0.0.1"),
            ("OVERLAY_HUB_SECRET_KEY", "s3cret"),
            ("OVERLAY_HUB_MAX_CONNECTIONS", "not-a-number"),
            ("OVERLAY_HUB_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.auth.secret_key.as_deref(), Some("s3cret"));
        assert_eq!(config.hub.max_connections, 1000);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_specific_port_wins_over_platform_port() {
        let mut config = Config::default();
        config.apply_overrides(|key| match key {
            "PORT" => Some("9000".to_string()),
            "OVERLAY_HUB_PORT" => Some("9100".to_string()),
            _ => None,
        });
        assert_eq!(config.server.port, 9100);
    }

    #[test]
    fn test_hub_config_carries_credentials() {
        let mut config = Config::default();
        config.auth.secret_key = Some("k".to_string());
        let hub = config.hub_config();
        assert_eq!(hub.credentials.secret_key.as_deref(), Some("k"));
        assert_eq!(hub.like_goal, 100);
        assert_eq!(config.api_config().port, 3003);
    }
}

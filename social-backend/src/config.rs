//! Configuration management using Figment
//!
//! Configuration is loaded from multiple sources with the following precedence (highest to lowest):
//! 1. Environment variables (bare upper-case field names: `DATABASE_URL`, `BASE_URL`, ...)
//! 2. Current working directory: ./config.toml
//! 3. XDG config directory: ~/.config/social-backend/config.toml
//! 4. System directory: /etc/social-backend/config.toml
//! 5. Default values
//!
//! Loading happens before the tracing subscriber exists, so anything worth
//! reporting is collected in [`ConfigWarnings`] and flushed once logging is up.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::error::Result;

/// Application directory name used for XDG and system config lookups
pub const APP_NAME: &str = "social-backend";

/// Secret used when none is configured
pub const DEFAULT_SECRET: &str = "default-secret";

/// Every field that may be set from the environment
const ENV_KEYS: &[&str] = &[
    "debug",
    "host",
    "port",
    "base_url",
    "secret",
    "database_url",
    "migration_source",
    "log_level",
    "timeout_secs",
    "google_client_id",
    "google_client_secret",
    "google_auth_url",
    "google_token_url",
    "google_userinfo_url",
    "github_client_id",
    "github_client_secret",
    "github_auth_url",
    "github_token_url",
    "github_api_url",
    "db_max_connections",
    "db_min_connections",
    "db_connect_timeout_secs",
    "db_max_retries",
    "db_retry_delay_secs",
];

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Human-readable log output instead of JSON
    #[serde(default)]
    pub debug: bool,

    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Public base URL of this service, used to build OAuth redirect URIs
    #[serde(default)]
    pub base_url: String,

    #[serde(default = "default_secret")]
    pub secret: String,

    /// PostgreSQL connection URL (required)
    #[serde(default)]
    pub database_url: String,

    /// Location of SQL migrations, `file://` prefix optional
    #[serde(default = "default_migration_source")]
    pub migration_source: String,

    /// Log level or full `EnvFilter` directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub google_client_id: String,
    #[serde(default)]
    pub google_client_secret: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_auth_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_token_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_userinfo_url: Option<String>,

    /// GitHub login is only offered when this is set
    #[serde(default)]
    pub github_client_id: String,
    #[serde(default)]
    pub github_client_secret: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_auth_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_token_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_api_url: Option<String>,

    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub db_max_connections: u32,

    /// Minimum idle connections
    #[serde(default = "default_min_connections")]
    pub db_min_connections: u32,

    /// Connection acquire timeout in seconds
    #[serde(default = "default_connection_timeout")]
    pub db_connect_timeout_secs: u64,

    /// Maximum retry attempts for establishing the pool at startup
    #[serde(default = "default_max_retries")]
    pub db_max_retries: u32,

    /// Base delay between retry attempts in seconds (doubles each attempt)
    #[serde(default = "default_retry_delay")]
    pub db_retry_delay_secs: u64,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_secret() -> String {
    DEFAULT_SECRET.to_string()
}

fn default_migration_source() -> String {
    "file://migrations".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connection_timeout() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    5
}

fn default_retry_delay() -> u64 {
    2
}

/// Configuration that loaded but cannot be used
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("database_url is required")]
    DatabaseUrlRequired,
}

impl ConfigError {
    /// Short description for the startup failure banner
    pub fn title(&self) -> &'static str {
        match self {
            Self::DatabaseUrlRequired => "Database URL is required",
        }
    }

    pub fn action(&self) -> &'static str {
        match self {
            Self::DatabaseUrlRequired => {
                "Please set the DATABASE_URL environment variable or provide it in the configuration file."
            }
        }
    }
}

/// Render the banner printed when the process cannot start
///
/// Logging is not initialized at this point, so the caller writes it to stderr.
pub fn startup_failure_message(title: &str, action: &str) -> String {
    format!(
        "\n-----------------------------------------\n\
         Application Failed to Start\n\
         -----------------------------------------\n\n\
         # What's wrong?\n{}\n\n\
         # How to fix it?\n{}\n",
        title, action
    )
}

/// A warning raised while loading configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub message: String,
    pub path: Option<PathBuf>,
}

/// Warnings buffered until the tracing subscriber is installed
#[derive(Debug, Default)]
pub struct ConfigWarnings {
    entries: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn warn(&mut self, message: impl Into<String>, path: Option<PathBuf>) {
        self.entries.push(ConfigWarning {
            message: message.into(),
            path,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ConfigWarning] {
        &self.entries
    }

    /// Emit every buffered warning through tracing and clear the buffer
    pub fn flush(&mut self) {
        for entry in self.entries.drain(..) {
            match entry.path {
                Some(path) => tracing::warn!(path = %path.display(), "{}", entry.message),
                None => tracing::warn!("{}", entry.message),
            }
        }
    }
}

impl Config {
    /// Load configuration from all sources
    ///
    /// Searches for config files in this order (highest priority first):
    /// 1. Current working directory: ./config.toml
    /// 2. XDG config directory: ~/.config/social-backend/config.toml
    /// 3. System directory: /etc/social-backend/config.toml
    ///
    /// Environment variables override all file-based configs.
    pub fn load() -> Result<(Self, ConfigWarnings)> {
        let mut warnings = ConfigWarnings::default();
        let config_paths = Self::find_config_paths();

        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        // lowest priority first so later merges win
        let mut found = false;
        for path in config_paths.iter().rev() {
            if path.exists() {
                found = true;
                figment = figment.merge(Toml::file(path));
            }
        }

        if !found {
            let searched = config_paths
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            warnings.warn(
                format!("No configuration file found (searched: {}), using defaults and environment", searched),
                None,
            );
        }

        let config: Config = figment.merge(Self::env()).extract()?;

        if config.secret == DEFAULT_SECRET {
            warnings.warn("Using the default secret; set SECRET in production", None);
        }

        Ok((config, warnings))
    }

    /// Load configuration from a specific file
    ///
    /// This bypasses the search path. A missing file is reported as a warning,
    /// not an error.
    pub fn load_from(path: impl Into<PathBuf>) -> Result<(Self, ConfigWarnings)> {
        let path = path.into();
        let mut warnings = ConfigWarnings::default();

        if !path.exists() {
            warnings.warn("Failed to load config from file", Some(path.clone()));
        }

        let config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&path))
            .merge(Self::env())
            .extract()?;

        Ok((config, warnings))
    }

    fn env() -> Env {
        Env::raw().only(ENV_KEYS)
    }

    /// Config file locations in priority order (highest first)
    fn find_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        let xdg_dirs = xdg::BaseDirectories::with_prefix(APP_NAME);
        if let Some(path) = xdg_dirs.find_config_file("config.toml") {
            paths.push(path);
        }

        paths.push(PathBuf::from("/etc").join(APP_NAME).join("config.toml"));
        paths
    }

    /// Check the loaded configuration is usable
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.database_url.trim().is_empty() {
            return Err(ConfigError::DatabaseUrlRequired);
        }
        Ok(())
    }

    /// `host:port` for the listener
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Base URL with any trailing slash removed
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn db_connect_timeout(&self) -> Duration {
        Duration::from_secs(self.db_connect_timeout_secs)
    }

    pub fn db_retry_delay(&self) -> Duration {
        Duration::from_secs(self.db_retry_delay_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            host: default_host(),
            port: default_port(),
            base_url: String::new(),
            secret: default_secret(),
            database_url: String::new(),
            migration_source: default_migration_source(),
            log_level: default_log_level(),
            timeout_secs: default_timeout(),
            google_client_id: String::new(),
            google_client_secret: String::new(),
            google_auth_url: None,
            google_token_url: None,
            google_userinfo_url: None,
            github_client_id: String::new(),
            github_client_secret: String::new(),
            github_auth_url: None,
            github_token_url: None,
            github_api_url: None,
            db_max_connections: default_max_connections(),
            db_min_connections: default_min_connections(),
            db_connect_timeout_secs: default_connection_timeout(),
            db_max_retries: default_max_retries(),
            db_retry_delay_secs: default_retry_delay(),
        }
    }
}

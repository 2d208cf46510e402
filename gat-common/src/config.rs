//! Configuration loading for the rating tools
//!
//! Settings are resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing config file is not an error: a warning is logged and compiled
//! defaults are used. A config file that exists but does not parse is an error.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "GAT_RATING_CONFIG";

/// Environment variable overriding the provider base URL
pub const BASE_URL_ENV: &str = "GAT_RATING_BASE_URL";

/// Provider root used when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api";

/// Rows requested per page
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Language tag the provider assumes when none is sent
pub const DEFAULT_LOCALE: &str = "ru";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration loaded from TOML file
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TomlConfig {
    /// Root URL of the rating provider (without the endpoint path)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Rows per page for reset and append fetches
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Language tag sent with every request
    #[serde(default = "default_locale")]
    pub locale: String,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            page_size: default_page_size(),
            locale: default_locale(),
            request_timeout_secs: default_timeout_secs(),
            logging: LoggingConfig::default(),
        }
    }
}

impl TomlConfig {
    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file on disk
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// HTTP request timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::Config("page_size must be greater than 0".to_string()));
        }
        if self.base_url.trim().is_empty() {
            return Err(Error::Config("base_url must not be empty".to_string()));
        }
        if self.locale.trim().is_empty() {
            return Err(Error::Config("locale must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Layered configuration resolver
///
/// Holds the command-line overrides; environment and file layers are read
/// when [`ConfigResolver::resolve`] is called.
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    cli_config_path: Option<PathBuf>,
    cli_base_url: Option<String>,
}

impl ConfigResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Explicit config file from the command line
    pub fn with_config_path(mut self, path: Option<PathBuf>) -> Self {
        self.cli_config_path = path;
        self
    }

    /// Provider base URL from the command line
    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        self.cli_base_url = base_url;
        self
    }

    /// Config file location: CLI argument, then environment, then platform default
    pub fn config_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.cli_config_path {
            return Some(path.clone());
        }

        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }

        default_config_path()
    }

    /// Resolve the effective configuration
    pub fn resolve(&self) -> Result<TomlConfig> {
        let mut config = match self.config_path() {
            Some(path) if path.exists() => {
                info!("Loading config from {}", path.display());
                TomlConfig::load_file(&path)?
            }
            Some(path) => {
                warn!("Config file not found at {}, using defaults", path.display());
                TomlConfig::default()
            }
            None => {
                warn!("Could not determine config directory, using defaults");
                TomlConfig::default()
            }
        };

        if let Some(url) = &self.cli_base_url {
            config.base_url = url.clone();
        } else if let Ok(url) = std::env::var(BASE_URL_ENV) {
            if !url.trim().is_empty() {
                config.base_url = url;
            }
        }

        config.base_url = config.base_url.trim_end_matches('/').to_string();
        if !(config.base_url.starts_with("http://") || config.base_url.starts_with("https://")) {
            return Err(Error::InvalidInput(format!(
                "base_url must be an http(s) URL, got '{}'",
                config.base_url
            )));
        }
        config.validate()?;
        Ok(config)
    }
}

/// Platform config location (`<config_dir>/gat-rating/config.toml`)
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("gat-rating").join("config.toml"))
}

//! Application configuration.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::args::CliArgs;
use super::storage::ConfigError;
use crate::application::Continuation;
use crate::infrastructure::feed::{DEFAULT_FEED_BASE, DEFAULT_PAGE_SIZE, DEFAULT_TIMEOUT_SECS};
use crate::infrastructure::image::ImageFetcherConfig;

const APP_NAME: &str = "newsreel";
const APP_QUALIFIER: &str = "com";
const APP_ORGANIZATION: &str = "newsreel";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Converts to tracing level.
    #[must_use]
    pub const fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Application configuration, read from `config.toml` and overridden by CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration file path.
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[serde(skip)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Feed endpoint configuration.
    #[serde(default)]
    pub feed: FeedConfig,

    /// Image download configuration.
    #[serde(default)]
    pub images: ImagesConfig,
}

/// Feed endpoint configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Base address; pages are requested at `<base_url>/{page}/{page_size}`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Items requested per page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// When the feed counts as exhausted.
    #[serde(default)]
    pub continuation: Continuation,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            page_size: default_page_size(),
            timeout_secs: default_timeout_secs(),
            continuation: Continuation::default(),
        }
    }
}

/// Image download configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagesConfig {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Decoded images are scaled down to fit this many pixels per side.
    #[serde(default = "default_max_dimension", skip_serializing_if = "Option::is_none")]
    pub max_dimension: Option<u32>,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_dimension: default_max_dimension(),
        }
    }
}

impl From<&ImagesConfig> for ImageFetcherConfig {
    fn from(config: &ImagesConfig) -> Self {
        Self {
            timeout_secs: config.timeout_secs,
            max_dimension: config.max_dimension,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_FEED_BASE.to_string()
}

const fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

#[allow(clippy::unnecessary_wraps)]
const fn default_max_dimension() -> Option<u32> {
    Some(800)
}

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: &CliArgs) {
        if let Some(config_path) = &args.config {
            self.config = Some(config_path.clone());
        }
        if let Some(log_path) = &args.log_path {
            self.log_path = Some(log_path.clone());
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(base_url) = &args.base_url {
            self.feed.base_url.clone_from(base_url);
        }
        if let Some(page_size) = args.page_size {
            self.feed.page_size = page_size;
        }
        if let Some(timeout) = args.timeout {
            self.feed.timeout_secs = timeout;
            self.images.timeout_secs = timeout;
        }
        if let Some(continuation) = args.continuation {
            self.feed.continuation = continuation;
        }
    }

    /// Checks values that would make the client unusable.
    ///
    /// # Errors
    /// Returns `ConfigError::Invalid` describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.feed.page_size == 0 {
            return Err(ConfigError::Invalid("feed.page_size must be at least 1".into()));
        }
        if self.feed.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("feed.base_url must not be empty".into()));
        }
        if self.images.max_dimension == Some(0) {
            return Err(ConfigError::Invalid("images.max_dimension must be at least 1".into()));
        }
        Ok(())
    }

    /// Returns default config directory.
    #[must_use]
    pub fn default_config_dir() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Returns default log file path.
    #[must_use]
    pub fn default_log_path() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.data_dir().join("newsreel.log"))
    }

    /// Returns effective log path.
    #[must_use]
    pub fn effective_log_path(&self) -> Option<PathBuf> {
        self.log_path.clone().or_else(Self::default_log_path)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config: None,
            log_path: None,
            log_level: LogLevel::Info,
            feed: FeedConfig::default(),
            images: ImagesConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_parse_config_with_sections() {
        let toml_content = r#"
            log_level = "debug"

            [feed]
            base_url = "http://localhost:8080/api/news"
            page_size = 5
            continuation = "inclusive"

            [images]
            max_dimension = 320
        "#;

        let config: AppConfig = toml::from_str(toml_content).expect("Failed to parse config");

        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.feed.base_url, "http://localhost:8080/api/news");
        assert_eq!(config.feed.page_size, 5);
        assert_eq!(config.feed.timeout_secs, 30);
        assert_eq!(config.feed.continuation, Continuation::Inclusive);
        assert_eq!(config.images.max_dimension, Some(320));
        assert_eq!(config.images.timeout_secs, 30);
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.feed.base_url, "https://webapi.autodoc.ru/api/news");
        assert_eq!(config.feed.page_size, 15);
        assert_eq!(config.feed.continuation, Continuation::Strict);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: AppConfig = toml::from_str("").expect("empty config");
        assert_eq!(config.feed, FeedConfig::default());
        assert_eq!(config.images, ImagesConfig::default());
    }

    #[test]
    fn test_merge_with_args() {
        let args = CliArgs::parse_from([
            "newsreel",
            "--base-url",
            "http://127.0.0.1:9000/news",
            "--page-size",
            "3",
            "--timeout",
            "7",
            "--continuation",
            "inclusive",
            "--log-level",
            "warn",
        ]);
        let mut config = AppConfig::default();

        config.merge_with_args(&args);

        assert_eq!(config.feed.base_url, "http://127.0.0.1:9000/news");
        assert_eq!(config.feed.page_size, 3);
        assert_eq!(config.feed.timeout_secs, 7);
        assert_eq!(config.images.timeout_secs, 7);
        assert_eq!(config.feed.continuation, Continuation::Inclusive);
        assert_eq!(config.log_level, LogLevel::Warn);
    }

    #[test]
    fn test_validate_rejects_zero_page_size() {
        let mut config = AppConfig::default();
        config.feed.page_size = 0;

        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}

//! Infrastructure layer with external service adapters.

/// Application configuration.
pub mod config;
/// News feed HTTP client.
pub mod feed;
/// Image caching and downloading.
pub mod image;

pub use config::{AppConfig, CliArgs, ConfigError, LogLevel, ConfigStore};
pub use feed::HttpFeedClient;
pub use image::{CacheStats, HttpImageFetcher, ImageFetcherConfig, MemoryImageCache};

//! Image handling infrastructure.
//!
//! This module provides:
//! - Unbounded in-memory caching keyed by image URL
//! - HTTP download and decoding of images

pub mod http_fetcher;
pub mod memory_cache;

pub use http_fetcher::{HttpImageFetcher, ImageFetcherConfig};
pub use memory_cache::{CacheStats, MemoryImageCache};

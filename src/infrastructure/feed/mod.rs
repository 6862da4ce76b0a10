//! News feed HTTP adapter.

mod client;
mod dto;

pub use client::{DEFAULT_FEED_BASE, DEFAULT_PAGE_SIZE, DEFAULT_TIMEOUT_SECS, HttpFeedClient};
pub use dto::{NewsItemResponse, NewsPageResponse};

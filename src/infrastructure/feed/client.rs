//! News feed HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::{debug, warn};

use super::dto::NewsPageResponse;
use crate::domain::entities::FeedPage;
use crate::domain::errors::FeedError;
use crate::domain::ports::FeedPort;

/// Default feed endpoint; pages live at `<base>/{page}/{page_size}`.
pub const DEFAULT_FEED_BASE: &str = "https://webapi.autodoc.ru/api/news";
/// Default number of items requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 15;
/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// News feed client over HTTP.
pub struct HttpFeedClient {
    client: Client,
    base_url: String,
}

impl std::fmt::Debug for HttpFeedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpFeedClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl HttpFeedClient {
    /// Creates new client with default base URL.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn new() -> Result<Self, FeedError> {
        Self::with_base_url(DEFAULT_FEED_BASE, DEFAULT_TIMEOUT_SECS)
    }

    /// Creates client with custom base URL and timeout.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn with_base_url(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| FeedError::transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Composes the address of one page.
    ///
    /// # Errors
    /// Returns [`FeedError::InvalidRequest`] for a zero page or page size,
    /// or when the composed address is not a valid absolute URL.
    pub fn page_url(&self, page: u32, page_size: u32) -> Result<Url, FeedError> {
        if page == 0 {
            return Err(FeedError::invalid_request("page must be at least 1"));
        }
        if page_size == 0 {
            return Err(FeedError::invalid_request("page size must be at least 1"));
        }

        let address = format!("{}/{page}/{page_size}", self.base_url.trim_end_matches('/'));
        Url::parse(&address).map_err(|e| FeedError::invalid_request(format!("{address}: {e}")))
    }
}

#[async_trait]
impl FeedPort for HttpFeedClient {
    async fn fetch_page(&self, page: u32, page_size: u32) -> Result<FeedPage, FeedError> {
        let url = self.page_url(page, page_size)?;

        debug!(page, page_size, url = %url, "Fetching feed page");

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(error = %e, page, "Failed to reach feed");
            if e.is_timeout() {
                FeedError::transport("request timed out")
            } else if e.is_connect() {
                FeedError::transport("failed to connect to feed")
            } else {
                FeedError::transport(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::transport(format!("feed returned HTTP {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FeedError::transport(format!("failed to read body: {e}")))?;

        let page_response: NewsPageResponse = serde_json::from_slice(&body).map_err(|e| {
            warn!(error = %e, page, "Failed to parse feed page");
            FeedError::decode(e.to_string())
        })?;

        let feed_page = FeedPage::from(page_response);
        debug!(
            page,
            items = feed_page.len(),
            total_count = feed_page.total_count,
            "Feed page fetched"
        );

        Ok(feed_page)
    }
}

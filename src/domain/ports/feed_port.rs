//! Feed source port definition.

use async_trait::async_trait;

use crate::domain::entities::FeedPage;
use crate::domain::errors::FeedError;

/// Port for fetching pages of the news feed.
///
/// One call is one attempt: implementations do not retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedPort: Send + Sync {
    /// Fetches page `page` (1-based) holding at most `page_size` items.
    async fn fetch_page(&self, page: u32, page_size: u32) -> Result<FeedPage, FeedError>;
}

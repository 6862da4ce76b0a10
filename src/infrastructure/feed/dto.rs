//! Wire format of feed pages.

use serde::Deserialize;

use crate::domain::entities::{FeedPage, NewsItem};

/// Feed page response body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsPageResponse {
    /// Articles on this page, newest first.
    pub news: Vec<NewsItemResponse>,
    /// Total number of articles the feed reports.
    pub total_count: u64,
}

/// Single article as sent by the feed. Every field is required.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItemResponse {
    /// Stable article id.
    pub id: i64,
    /// Headline.
    pub title: String,
    /// Short summary shown on the detail screen.
    pub description: String,
    /// Publication time as `YYYY-MM-DDTHH:MM:SS`.
    pub published_date: String,
    /// Article path relative to the site root.
    pub url: String,
    /// Absolute article address.
    pub full_url: String,
    /// Cover image address; empty when the article has none.
    pub title_image_url: String,
    /// Editorial category label.
    pub category_type: String,
}

impl From<NewsItemResponse> for NewsItem {
    fn from(item: NewsItemResponse) -> Self {
        Self::new(item.id, item.title)
            .with_description(item.description)
            .with_published_date(item.published_date)
            .with_links(item.url, item.full_url)
            .with_image_url(item.title_image_url)
            .with_category(item.category_type)
    }
}

impl From<NewsPageResponse> for FeedPage {
    fn from(response: NewsPageResponse) -> Self {
        Self::new(
            response.news.into_iter().map(NewsItem::from).collect(),
            response.total_count,
        )
    }
}

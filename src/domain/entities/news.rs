//! News feed entities.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Timestamp layout used by the feed for `publishedDate`.
pub const PUBLISHED_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const DISPLAY_DATE_FORMAT: &str = "%d %b %Y";
const UNKNOWN_DATE: &str = "publication date unknown";

/// Feed-assigned article id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NewsId(pub i64);

impl NewsId {
    /// Raw id value.
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for NewsId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for NewsId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// A single article from the feed.
///
/// Built once through the `with_*` methods and read-only afterwards.
/// Two items are the same article when their ids match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    id: NewsId,
    title: String,
    description: String,
    published_date: String,
    url: String,
    full_url: String,
    image_url: String,
    category: String,
}

impl NewsItem {
    /// Creates an item with only its id and title set.
    #[must_use]
    pub fn new(id: impl Into<NewsId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            published_date: String::new(),
            url: String::new(),
            full_url: String::new(),
            image_url: String::new(),
            category: String::new(),
        }
    }

    /// Sets the summary text.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the raw publication timestamp.
    #[must_use]
    pub fn with_published_date(mut self, raw: impl Into<String>) -> Self {
        self.published_date = raw.into();
        self
    }

    /// Sets the relative article path and its absolute address.
    #[must_use]
    pub fn with_links(mut self, url: impl Into<String>, full_url: impl Into<String>) -> Self {
        self.url = url.into();
        self.full_url = full_url.into();
        self
    }

    /// Sets the cover image address.
    #[must_use]
    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = image_url.into();
        self
    }

    /// Sets the category label.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Article id.
    #[must_use]
    pub const fn id(&self) -> NewsId {
        self.id
    }

    /// Headline.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Summary text.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Publication timestamp exactly as the feed sent it.
    #[must_use]
    pub fn published_date_raw(&self) -> &str {
        &self.published_date
    }

    /// Relative article path.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Absolute article address.
    #[must_use]
    pub fn full_url(&self) -> &str {
        &self.full_url
    }

    /// Cover image address, empty when there is none.
    #[must_use]
    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    /// Category label.
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Parses the raw publication timestamp.
    #[must_use]
    pub fn published_at(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.published_date, PUBLISHED_DATE_FORMAT).ok()
    }

    /// Publication date formatted for list rows, or a fallback label.
    #[must_use]
    pub fn display_date(&self) -> String {
        self.published_at().map_or_else(
            || UNKNOWN_DATE.to_string(),
            |date| date.format(DISPLAY_DATE_FORMAT).to_string(),
        )
    }
}

impl PartialEq for NewsItem {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for NewsItem {}

/// One page of the feed as returned by a single fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedPage {
    /// Articles in feed order.
    pub items: Vec<NewsItem>,
    /// Total number of articles the feed reports, as of this page.
    pub total_count: u64,
}

impl FeedPage {
    /// Wraps one fetched page.
    #[must_use]
    pub const fn new(items: Vec<NewsItem>, total_count: u64) -> Self {
        Self { items, total_count }
    }

    /// Number of articles on the page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True for a page with no articles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

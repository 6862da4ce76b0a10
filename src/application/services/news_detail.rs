//! Detail view model for a single article.

use crate::domain::entities::{ImageId, NewsItem, SharedImage};
use crate::domain::ports::ImageCachePort;

/// Article detail backed by the image cache only.
///
/// The detail screen never downloads: the list row that led here has
/// usually cached the image already. Without it the placeholder is shown.
#[derive(Debug, Clone)]
pub struct NewsDetail {
    item: NewsItem,
    image: Option<SharedImage>,
}

impl NewsDetail {
    /// Builds the detail for `item`, taking its image from `cache` if present.
    #[must_use]
    pub fn new(item: NewsItem, cache: &dyn ImageCachePort) -> Self {
        let image = lookup(&item, cache);
        Self { item, image }
    }

    /// The article shown.
    #[must_use]
    pub const fn item(&self) -> &NewsItem {
        &self.item
    }

    /// Article headline.
    #[must_use]
    pub fn title(&self) -> &str {
        self.item.title()
    }

    /// Article summary.
    #[must_use]
    pub fn description(&self) -> &str {
        self.item.description()
    }

    /// Publication date as shown on screen.
    #[must_use]
    pub fn published(&self) -> String {
        self.item.display_date()
    }

    /// Cover image, or `None` for the placeholder.
    #[must_use]
    pub const fn image(&self) -> Option<&SharedImage> {
        self.image.as_ref()
    }

    /// Looks the image up again, e.g. after a list download finished.
    ///
    /// Returns true if an image is now available.
    pub fn refresh_image(&mut self, cache: &dyn ImageCachePort) -> bool {
        if self.image.is_none() {
            self.image = lookup(&self.item, cache);
        }
        self.image.is_some()
    }
}

fn lookup(item: &NewsItem, cache: &dyn ImageCachePort) -> Option<SharedImage> {
    if item.image_url().is_empty() {
        return None;
    }
    cache.get(&ImageId::from(item.image_url()))
}

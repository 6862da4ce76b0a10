//! Headless list view: a scrolling window of recycled rows.

use crate::application::{ImageSlots, SlotImageLoader};
use crate::domain::entities::{ImageStatus, NewsItem, SlotId};

const TITLE_WIDTH: usize = 60;

/// Window of `rows` visible list rows over the loaded items.
///
/// Item `i` is always drawn by slot `i % rows`, so scrolling by a full
/// window rebinds every slot to a new item.
#[derive(Debug, Clone)]
pub struct FeedView {
    rows: usize,
    first_visible: usize,
}

impl FeedView {
    /// Creates a view showing `rows` rows (at least one).
    #[must_use]
    pub fn new(rows: usize) -> Self {
        Self {
            rows: rows.max(1),
            first_visible: 0,
        }
    }

    /// Number of rows, and therefore slots, in the window.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Index of the first item in the window.
    #[must_use]
    pub const fn first_visible(&self) -> usize {
        self.first_visible
    }

    /// Slot that draws the item at `index`.
    #[must_use]
    pub const fn slot_for(&self, index: usize) -> SlotId {
        SlotId(index % self.rows)
    }

    /// Moves the window so it starts at `index`.
    pub fn scroll_to(&mut self, index: usize) {
        self.first_visible = index;
    }

    /// Index of the last row shown when `loaded` items exist.
    #[must_use]
    pub fn last_visible(&self, loaded: usize) -> Option<usize> {
        let end = (self.first_visible + self.rows).min(loaded);
        (end > self.first_visible).then(|| end - 1)
    }

    /// Visible items with their indices and slots.
    pub fn visible<'a>(
        &self,
        items: &'a [NewsItem],
    ) -> impl Iterator<Item = (usize, SlotId, &'a NewsItem)> + 'a {
        let rows = self.rows;
        items
            .iter()
            .enumerate()
            .skip(self.first_visible)
            .take(rows)
            .map(move |(index, item)| (index, SlotId(index % rows), item))
    }

    /// Binds every visible slot to its item's image.
    pub fn bind_visible(&self, items: &[NewsItem], slots: &mut ImageSlots) {
        for (_, slot, item) in self.visible(items) {
            slots.bind(slot, item.image_url());
        }
    }

    /// Renders the visible rows as text lines.
    #[must_use]
    pub fn render(&self, items: &[NewsItem], slots: &ImageSlots) -> Vec<String> {
        self.visible(items)
            .map(|(index, slot, item)| render_row(index, item, slots.get(slot)))
            .collect()
    }
}

/// One list row: position, id, date, title, and the slot's image state.
#[must_use]
pub fn render_row(index: usize, item: &NewsItem, slot: Option<&SlotImageLoader>) -> String {
    let image = slot.map_or_else(|| "placeholder".to_string(), describe_image);
    format!(
        "{:>4}. [{}] {} | {} | image: {}",
        index + 1,
        item.id(),
        item.display_date(),
        truncate(item.title(), TITLE_WIDTH),
        image
    )
}

fn describe_image(slot: &SlotImageLoader) -> String {
    match (slot.status(), slot.image(), slot.source()) {
        (ImageStatus::Ready, Some(image), Some(source)) => {
            format!("{}x{} ({source})", image.width(), image.height())
        }
        (status, _, _) => status.to_string(),
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut shortened: String = text.chars().take(width.saturating_sub(1)).collect();
    shortened.push('…');
    shortened
}

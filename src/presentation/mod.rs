//! Presentation layer: list rows over the loaded feed.

/// Scrolling window of recycled rows.
pub mod feed_view;

pub use feed_view::{FeedView, render_row};

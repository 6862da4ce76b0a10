//! Domain entity definitions.

mod image;
mod news;
mod slot;

pub use image::{ImageId, ImageSource, ImageStatus, SharedImage};
pub use news::{FeedPage, NewsId, NewsItem, PUBLISHED_DATE_FORMAT};
pub use slot::{BindingToken, SlotId};

//! Domain layer with core entities, errors, and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;

pub use entities::{FeedPage, ImageId, NewsItem, SlotId};
pub use errors::{FeedError, ImageError};
pub use ports::{FeedPort, ImageCachePort, ImageFetchPort};

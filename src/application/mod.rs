//! Application layer with the feed and image-slot controllers.

/// Controllers and view models.
pub mod services;

pub use services::{
    BindOutcome, Continuation, FeedSnapshot, ImageSlots, LoadOutcome, LoadPhase, NewsDetail,
    PaginationController, SlotImageLoader,
};

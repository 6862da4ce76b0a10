pub mod news_detail;
pub mod pagination_controller;
pub mod slot_image_loader;

pub use news_detail::NewsDetail;
pub use pagination_controller::{
    Continuation, FeedSnapshot, LoadOutcome, LoadPhase, PageLoadedEvent, PageRequest,
    PaginationController, PaginationState,
};
pub use slot_image_loader::{BindOutcome, ImageLoadedEvent, ImageSlots, SlotImageLoader};

//! Port definition for image caching.

use crate::domain::entities::{ImageId, SharedImage};

/// Port for the in-memory image store shared by every slot.
///
/// All operations are synchronous and must be safe to call concurrently.
/// Concurrent writers to the same key race; the last one wins.
pub trait ImageCachePort: Send + Sync {
    /// Returns the cached image for `id`, if any.
    fn get(&self, id: &ImageId) -> Option<SharedImage>;

    /// Stores an image, replacing any previous entry for `id`.
    fn set(&self, id: ImageId, image: SharedImage);

    /// Removes an image from the cache.
    fn remove(&self, id: &ImageId);

    /// Returns the current number of cached images.
    fn len(&self) -> usize;

    /// Returns true if the cache is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clears all images from the cache.
    fn clear(&self);
}

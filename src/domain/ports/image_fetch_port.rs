//! Port definition for downloading images.

use async_trait::async_trait;

use crate::domain::entities::{ImageId, SharedImage};
use crate::domain::errors::ImageError;

/// Port for fetching and decoding a single image by URL.
#[async_trait]
pub trait ImageFetchPort: Send + Sync {
    /// Downloads and decodes the image at `url`. No retries.
    async fn fetch_image(&self, url: &ImageId) -> Result<SharedImage, ImageError>;
}

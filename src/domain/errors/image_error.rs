//! Image fetch error types.

use thiserror::Error;

/// Image download and decode failures. These never leave the slot that
/// requested the image.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ImageError {
    /// The image address is not a valid absolute URL.
    #[error("invalid image url: {0}")]
    InvalidUrl(String),

    /// Connecting, timing out or reading the body failed.
    #[error("image request failed: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("image server returned HTTP {0}")]
    Status(u16),

    /// The body is not an image the decoder understands.
    #[error("failed to decode image: {0}")]
    Decode(String),
}

//! Domain types for image handling.

use std::sync::Arc;

/// Cache key for an image: the image URL itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageId(pub String);

impl ImageId {
    /// Creates a new `ImageId` from any string-like input.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// Returns the inner URL.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for items without an image.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for ImageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ImageId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ImageId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Decoded image shared between the cache and any number of slots.
pub type SharedImage = Arc<image::DynamicImage>;

/// Status of an image in the loading pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ImageStatus {
    /// Nothing requested yet, or the slot is unbound.
    #[default]
    NotStarted,
    /// Image is being downloaded and decoded.
    Downloading,
    /// Image is applied and ready for display.
    Ready,
    /// Image loading failed; the slot keeps its placeholder.
    Failed(String),
}

impl ImageStatus {
    /// Image applied.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Download in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Downloading)
    }

    /// Download failed.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Unbound or placeholder.
    #[must_use]
    pub const fn is_not_started(&self) -> bool {
        matches!(self, Self::NotStarted)
    }
}

impl std::fmt::Display for ImageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotStarted => write!(f, "placeholder"),
            Self::Downloading => write!(f, "loading"),
            Self::Ready => write!(f, "ready"),
            Self::Failed(reason) => write!(f, "failed ({reason})"),
        }
    }
}

/// Where an image was resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    /// Served from the in-memory cache.
    MemoryCache,
    /// Downloaded from the network.
    Network,
}

impl std::fmt::Display for ImageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MemoryCache => write!(f, "memory"),
            Self::Network => write!(f, "network"),
        }
    }
}

//! HTTP image downloader.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::domain::entities::{ImageId, SharedImage};
use crate::domain::errors::ImageError;
use crate::domain::ports::ImageFetchPort;

/// Configuration for the image fetcher.
#[derive(Debug, Clone)]
pub struct ImageFetcherConfig {
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Images wider or taller than this are scaled down after decoding.
    /// `None` keeps the original size.
    pub max_dimension: Option<u32>,
}

impl Default for ImageFetcherConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_dimension: Some(800),
        }
    }
}

/// Downloads images with a plain GET and decodes them off the async runtime.
pub struct HttpImageFetcher {
    http_client: reqwest::Client,
    config: ImageFetcherConfig,
}

impl std::fmt::Debug for HttpImageFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpImageFetcher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HttpImageFetcher {
    /// Creates a fetcher with the given configuration.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(config: ImageFetcherConfig) -> Result<Self, ImageError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ImageError::Transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Downloads image bytes from a URL.
    async fn download(&self, url: &str) -> Result<Bytes, ImageError> {
        let url = reqwest::Url::parse(url)
            .map_err(|e| ImageError::InvalidUrl(format!("{url}: {e}")))?;

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| ImageError::Transport(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImageError::Status(status.as_u16()));
        }

        response
            .bytes()
            .await
            .map_err(|e| ImageError::Transport(format!("Failed to read body: {e}")))
    }
}

#[async_trait]
impl ImageFetchPort for HttpImageFetcher {
    async fn fetch_image(&self, url: &ImageId) -> Result<SharedImage, ImageError> {
        debug!(url = %url, "Downloading image");

        let bytes = self.download(url.as_str()).await?;
        let max_dimension = self.config.max_dimension;

        let decoded = tokio::task::spawn_blocking(move || decode(&bytes, max_dimension))
            .await
            .map_err(|e| ImageError::Decode(format!("Decode task panicked: {e}")))??;

        debug!(
            url = %url,
            width = decoded.width(),
            height = decoded.height(),
            "Image downloaded"
        );

        Ok(Arc::new(decoded))
    }
}

fn decode(bytes: &[u8], max_dimension: Option<u32>) -> Result<image::DynamicImage, ImageError> {
    let img = image::load_from_memory(bytes).map_err(|e| ImageError::Decode(e.to_string()))?;

    match max_dimension {
        Some(max) if img.width() > max || img.height() > max => {
            Ok(img.resize(max, max, image::imageops::FilterType::Triangle))
        }
        _ => Ok(img),
    }
}

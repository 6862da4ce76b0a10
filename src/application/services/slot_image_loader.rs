//! Per-row image resolution that survives row recycling.
//!
//! A list view reuses a small set of rows (slots) for many items. Each slot
//! owns a [`SlotImageLoader`]; binding it to a new URL supersedes whatever it
//! was waiting for, and a download that finishes after the slot moved on is
//! never shown there. The downloaded image still lands in the cache.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::domain::entities::{
    BindingToken, ImageId, ImageSource, ImageStatus, SharedImage, SlotId,
};
use crate::domain::errors::ImageError;
use crate::domain::ports::{ImageCachePort, ImageFetchPort};

/// Message sent when an image download for a binding finishes.
#[derive(Debug, Clone)]
pub struct ImageLoadedEvent {
    /// The binding that requested the download.
    pub token: BindingToken,
    /// The downloaded image, or why it failed.
    pub result: Result<SharedImage, ImageError>,
}

/// How a bind was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    /// The image was in the cache and is already displayed.
    CacheHit,
    /// A download was started; the result arrives as an [`ImageLoadedEvent`].
    Fetching,
    /// The item has no image URL; the slot shows its placeholder.
    Placeholder,
}

/// Image state of one reusable view slot.
pub struct SlotImageLoader {
    slot: SlotId,
    binding: Option<BindingToken>,
    generation: u64,
    image: Option<SharedImage>,
    source: Option<ImageSource>,
    status: ImageStatus,
    cache: Arc<dyn ImageCachePort>,
    fetcher: Arc<dyn ImageFetchPort>,
    event_tx: mpsc::UnboundedSender<ImageLoadedEvent>,
}

impl std::fmt::Debug for SlotImageLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotImageLoader")
            .field("slot", &self.slot)
            .field("binding", &self.binding)
            .field("has_image", &self.image.is_some())
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl SlotImageLoader {
    /// Creates an unbound slot. Download results are sent to `event_tx`.
    #[must_use]
    pub fn new(
        slot: SlotId,
        cache: Arc<dyn ImageCachePort>,
        fetcher: Arc<dyn ImageFetchPort>,
        event_tx: mpsc::UnboundedSender<ImageLoadedEvent>,
    ) -> Self {
        Self {
            slot,
            binding: None,
            generation: 0,
            image: None,
            source: None,
            status: ImageStatus::NotStarted,
            cache,
            fetcher,
            event_tx,
        }
    }

    /// The slot this loader draws.
    #[must_use]
    pub const fn slot(&self) -> SlotId {
        self.slot
    }

    /// The binding this slot currently accepts results for.
    #[must_use]
    pub const fn binding(&self) -> Option<&BindingToken> {
        self.binding.as_ref()
    }

    /// URL of the current binding.
    #[must_use]
    pub fn bound_url(&self) -> Option<&ImageId> {
        self.binding.as_ref().map(|token| &token.url)
    }

    /// The image currently displayed, if any.
    #[must_use]
    pub const fn image(&self) -> Option<&SharedImage> {
        self.image.as_ref()
    }

    /// Where the displayed image came from.
    #[must_use]
    pub const fn source(&self) -> Option<ImageSource> {
        self.source
    }

    /// Loading state of the current binding.
    #[must_use]
    pub const fn status(&self) -> &ImageStatus {
        &self.status
    }

    /// Binds the slot to `url`, dropping the displayed image and any
    /// interest in a download started by an earlier binding.
    ///
    /// A cached image is applied before returning and no request is made.
    pub fn bind(&mut self, url: impl Into<ImageId>) -> BindOutcome {
        let url = url.into();
        self.generation += 1;
        let token = BindingToken::new(self.slot, url.clone(), self.generation);

        if let Some(previous) = self.binding.replace(token.clone()) {
            if self.status.is_loading() {
                trace!(slot = %self.slot, previous = %previous.url, "Superseding in-flight image");
            }
        }
        self.clear_display();

        if url.is_empty() {
            return BindOutcome::Placeholder;
        }

        if let Some(image) = self.cache.get(&url) {
            self.show(image, ImageSource::MemoryCache);
            return BindOutcome::CacheHit;
        }

        self.status = ImageStatus::Downloading;
        self.spawn_fetch(token);
        BindOutcome::Fetching
    }

    /// Detaches the slot from its item. Late results are discarded.
    pub fn unbind(&mut self) {
        self.binding = None;
        self.clear_display();
    }

    /// Applies a finished download if it belongs to the current binding.
    ///
    /// Returns true when the event changed what the slot displays.
    pub fn complete(&mut self, event: ImageLoadedEvent) -> bool {
        if self.binding.as_ref() != Some(&event.token) {
            trace!(
                slot = %self.slot,
                token = %event.token,
                "Discarding image for a superseded binding"
            );
            return false;
        }

        match event.result {
            Ok(image) => self.show(image, ImageSource::Network),
            Err(e) => {
                debug!(slot = %self.slot, url = %event.token.url, error = %e, "Image load failed");
                self.status = ImageStatus::Failed(e.to_string());
            }
        }
        true
    }

    fn show(&mut self, image: SharedImage, source: ImageSource) {
        self.image = Some(image);
        self.source = Some(source);
        self.status = ImageStatus::Ready;
    }

    fn clear_display(&mut self) {
        self.image = None;
        self.source = None;
        self.status = ImageStatus::NotStarted;
    }

    fn spawn_fetch(&self, token: BindingToken) {
        let cache = Arc::clone(&self.cache);
        let fetcher = Arc::clone(&self.fetcher);
        let event_tx = self.event_tx.clone();

        debug!(slot = %self.slot, url = %token.url, "Image cache miss, downloading");

        tokio::spawn(async move {
            let result = fetcher.fetch_image(&token.url).await;
            // The image is valid for its URL whoever is bound now.
            if let Ok(image) = &result {
                cache.set(token.url.clone(), Arc::clone(image));
            }
            let _ = event_tx.send(ImageLoadedEvent { token, result });
        });
    }
}

/// All image slots of one list, with a shared completion channel.
pub struct ImageSlots {
    slots: BTreeMap<SlotId, SlotImageLoader>,
    cache: Arc<dyn ImageCachePort>,
    fetcher: Arc<dyn ImageFetchPort>,
    event_tx: mpsc::UnboundedSender<ImageLoadedEvent>,
    event_rx: mpsc::UnboundedReceiver<ImageLoadedEvent>,
}

impl std::fmt::Debug for ImageSlots {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageSlots")
            .field("slots", &self.slots.len())
            .finish_non_exhaustive()
    }
}

impl ImageSlots {
    /// Creates an empty arena; slots are added on first bind.
    #[must_use]
    pub fn new(cache: Arc<dyn ImageCachePort>, fetcher: Arc<dyn ImageFetchPort>) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        Self {
            slots: BTreeMap::new(),
            cache,
            fetcher,
            event_tx,
            event_rx,
        }
    }

    /// Binds `slot` to `url`, creating the slot on first use.
    pub fn bind(&mut self, slot: SlotId, url: impl Into<ImageId>) -> BindOutcome {
        let loader = self.slots.entry(slot).or_insert_with(|| {
            SlotImageLoader::new(
                slot,
                Arc::clone(&self.cache),
                Arc::clone(&self.fetcher),
                self.event_tx.clone(),
            )
        });
        loader.bind(url)
    }

    /// Detaches `slot`; late results for it are discarded.
    pub fn unbind(&mut self, slot: SlotId) {
        if let Some(loader) = self.slots.get_mut(&slot) {
            loader.unbind();
        }
    }

    /// The loader for `slot`, if it was ever bound.
    #[must_use]
    pub fn get(&self, slot: SlotId) -> Option<&SlotImageLoader> {
        self.slots.get(&slot)
    }

    /// Every slot in id order.
    pub fn iter(&self) -> impl Iterator<Item = &SlotImageLoader> {
        self.slots.values()
    }

    /// Number of slots created so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True before the first bind.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of slots waiting for a download.
    #[must_use]
    pub fn loading_count(&self) -> usize {
        self.slots
            .values()
            .filter(|loader| loader.status().is_loading())
            .count()
    }

    /// Routes a completion to the slot that requested it.
    pub fn dispatch(&mut self, event: ImageLoadedEvent) -> bool {
        self.slots
            .get_mut(&event.token.slot)
            .is_some_and(|loader| loader.complete(event))
    }

    /// Applies every completion that already arrived, without waiting.
    ///
    /// Returns how many changed a slot.
    pub fn drain(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.event_rx.try_recv() {
            if self.dispatch(event) {
                applied += 1;
            }
        }
        applied
    }

    /// Waits for the next completion and applies it.
    ///
    /// Returns whether it changed a slot.
    pub async fn next_completion(&mut self) -> bool {
        match self.event_rx.recv().await {
            Some(event) => self.dispatch(event),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::mocks::MockImageFetcher;
    use crate::infrastructure::image::MemoryImageCache;

    const A: &str = "https://example.com/a.jpg";
    const B: &str = "https://example.com/b.jpg";

    fn setup(fetcher: MockImageFetcher) -> (ImageSlots, Arc<MemoryImageCache>, Arc<MockImageFetcher>) {
        let cache = Arc::new(MemoryImageCache::new());
        let fetcher = Arc::new(fetcher);
        let slots = ImageSlots::new(cache.clone(), fetcher.clone());
        (slots, cache, fetcher)
    }

    fn width(slots: &ImageSlots, slot: SlotId) -> Option<u32> {
        slots
            .get(slot)
            .and_then(SlotImageLoader::image)
            .map(|image| image.width())
    }

    #[tokio::test]
    async fn test_cache_hit_short_circuits() {
        let (mut slots, cache, fetcher) = setup(MockImageFetcher::new());
        cache.set(ImageId::from(A), Arc::new(image::DynamicImage::new_rgb8(7, 1)));

        let outcome = slots.bind(SlotId(0), A);

        assert_eq!(outcome, BindOutcome::CacheHit);
        assert_eq!(width(&slots, SlotId(0)), Some(7));
        let slot = slots.get(SlotId(0)).expect("slot");
        assert_eq!(slot.status(), &ImageStatus::Ready);
        assert_eq!(slot.source(), Some(ImageSource::MemoryCache));
        assert!(fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_miss_downloads_and_caches() {
        let (mut slots, cache, fetcher) = setup(MockImageFetcher::new().with_image(A, 11));

        assert_eq!(slots.bind(SlotId(0), A), BindOutcome::Fetching);
        assert!(slots.get(SlotId(0)).is_some_and(|s| s.status().is_loading()));
        assert_eq!(slots.loading_count(), 1);

        assert!(slots.next_completion().await);

        let slot = slots.get(SlotId(0)).expect("slot");
        assert_eq!(slot.status(), &ImageStatus::Ready);
        assert_eq!(slot.source(), Some(ImageSource::Network));
        assert_eq!(width(&slots, SlotId(0)), Some(11));
        assert!(cache.get(&ImageId::from(A)).is_some());
        assert_eq!(fetcher.call_count(A), 1);

        // Rebinding another slot to the same URL is now a cache hit.
        assert_eq!(slots.bind(SlotId(1), A), BindOutcome::CacheHit);
        assert_eq!(fetcher.call_count(A), 1);
    }

    #[tokio::test]
    async fn test_rebind_discards_stale_result_but_caches_it() {
        let (mut slots, cache, fetcher) =
            setup(MockImageFetcher::new().with_image(A, 10).with_image(B, 20));
        fetcher.hold(A);

        assert_eq!(slots.bind(SlotId(0), A), BindOutcome::Fetching);
        assert_eq!(slots.bind(SlotId(0), B), BindOutcome::Fetching);

        // B is not held, so it finishes first.
        assert!(slots.next_completion().await);
        assert_eq!(width(&slots, SlotId(0)), Some(20));

        fetcher.release(A);
        assert!(!slots.next_completion().await);

        assert_eq!(width(&slots, SlotId(0)), Some(20));
        assert_eq!(slots.get(SlotId(0)).and_then(SlotImageLoader::bound_url), Some(&ImageId::from(B)));
        assert_eq!(cache.get(&ImageId::from(A)).map(|image| image.width()), Some(10));
    }

    #[tokio::test]
    async fn test_rebind_clears_displayed_image() {
        let (mut slots, cache, fetcher) = setup(MockImageFetcher::new().with_image(B, 20));
        cache.set(ImageId::from(A), Arc::new(image::DynamicImage::new_rgb8(10, 1)));
        fetcher.hold(B);

        slots.bind(SlotId(0), A);
        assert_eq!(width(&slots, SlotId(0)), Some(10));

        slots.bind(SlotId(0), B);
        assert_eq!(width(&slots, SlotId(0)), None);
        assert!(slots.get(SlotId(0)).is_some_and(|s| s.status().is_loading()));
    }

    #[tokio::test]
    async fn test_failure_leaves_placeholder() {
        let (mut slots, cache, _fetcher) =
            setup(MockImageFetcher::new().with_failure(A, ImageError::Status(404)));

        slots.bind(SlotId(3), A);
        assert!(slots.next_completion().await);

        let slot = slots.get(SlotId(3)).expect("slot");
        assert!(slot.image().is_none());
        assert_eq!(
            slot.status(),
            &ImageStatus::Failed("image server returned HTTP 404".to_string())
        );
        assert!(cache.get(&ImageId::from(A)).is_none());
    }

    #[tokio::test]
    async fn test_empty_url_is_placeholder() {
        let (mut slots, _cache, fetcher) = setup(MockImageFetcher::new());

        assert_eq!(slots.bind(SlotId(0), ""), BindOutcome::Placeholder);
        assert!(slots.get(SlotId(0)).is_some_and(|s| s.status().is_not_started()));
        assert!(fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unbind_discards_late_result() {
        let (mut slots, cache, fetcher) = setup(MockImageFetcher::new().with_image(A, 10));
        fetcher.hold(A);

        slots.bind(SlotId(0), A);
        slots.unbind(SlotId(0));
        fetcher.release(A);

        assert!(!slots.next_completion().await);
        assert!(slots.get(SlotId(0)).is_some_and(|s| s.image().is_none()));
        assert!(cache.get(&ImageId::from(A)).is_some());
    }

    #[tokio::test]
    async fn test_same_url_rebind_accepts_only_latest_request() {
        let (mut slots, _cache, fetcher) = setup(MockImageFetcher::new().with_image(A, 10));
        fetcher.hold(A);

        slots.bind(SlotId(0), A);
        let first = slots.get(SlotId(0)).and_then(SlotImageLoader::binding).cloned();
        slots.bind(SlotId(0), A);
        let second = slots.get(SlotId(0)).and_then(SlotImageLoader::binding).cloned();
        assert_ne!(first, second);

        let stale = ImageLoadedEvent {
            token: first.expect("first binding"),
            result: Err(ImageError::Transport("late".into())),
        };
        assert!(!slots.dispatch(stale));
        assert!(slots.get(SlotId(0)).is_some_and(|s| s.status().is_loading()));

        fetcher.release(A);
        fetcher.release(A);
        let mut applied = 0;
        for _ in 0..2 {
            if slots.next_completion().await {
                applied += 1;
            }
        }
        assert_eq!(applied, 1);
        assert!(slots.get(SlotId(0)).is_some_and(|s| s.status().is_ready()));
    }

    #[tokio::test]
    async fn test_drain_applies_arrived_events() {
        let (mut slots, _cache, _fetcher) =
            setup(MockImageFetcher::new().with_image(A, 10).with_image(B, 20));

        slots.bind(SlotId(0), A);
        slots.bind(SlotId(1), B);
        assert_eq!(slots.drain(), 0);

        tokio::task::yield_now().await;
        tokio::task::yield_now().await;
        let mut applied = slots.drain();
        while applied < 2 {
            assert!(slots.next_completion().await);
            applied += 1;
        }

        assert_eq!(width(&slots, SlotId(0)), Some(10));
        assert_eq!(width(&slots, SlotId(1)), Some(20));
        assert_eq!(slots.loading_count(), 0);
        assert_eq!(slots.len(), 2);
    }
}

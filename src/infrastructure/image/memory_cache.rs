//! In-memory image cache implementation.

use std::sync::atomic::{AtomicU64, Ordering};

use lru::LruCache;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::domain::entities::{ImageId, SharedImage};
use crate::domain::ports::ImageCachePort;

/// Unbounded in-memory cache of decoded images keyed by URL.
///
/// Nothing is evicted unless the host asks for it through
/// [`MemoryImageCache::relieve_pressure`]. Reads never reorder entries, so
/// eviction order is the order in which keys were last written.
pub struct MemoryImageCache {
    cache: Mutex<LruCache<ImageId, SharedImage>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoryImageCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache: Mutex::new(LruCache::unbounded()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Returns cache statistics.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        CacheStats {
            hits,
            misses,
            hit_rate,
            size: self.len(),
        }
    }

    /// Drops the oldest-written images until at most `retain` remain.
    ///
    /// Returns how many images were dropped.
    pub fn relieve_pressure(&self, retain: usize) -> usize {
        let mut cache = self.cache.lock();
        let mut dropped = 0;
        while cache.len() > retain {
            if cache.pop_lru().is_none() {
                break;
            }
            dropped += 1;
        }
        if dropped > 0 {
            debug!(dropped, retained = cache.len(), "Relieved image cache memory pressure");
        }
        dropped
    }
}

impl Default for MemoryImageCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryImageCache")
            .field("size", &self.len())
            .finish_non_exhaustive()
    }
}

/// Statistics about cache performance.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Hit rate as a percentage.
    pub hit_rate: f64,
    /// Current number of cached images.
    pub size: usize,
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cache: {} images, {:.1}% hit rate ({} hits, {} misses)",
            self.size, self.hit_rate, self.hits, self.misses
        )
    }
}

impl ImageCachePort for MemoryImageCache {
    fn get(&self, id: &ImageId) -> Option<SharedImage> {
        let found = self.cache.lock().peek(id).cloned();
        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(id = %id, "Memory cache hit");
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            trace!(id = %id, "Memory cache miss");
        }
        found
    }

    fn set(&self, id: ImageId, image: SharedImage) {
        debug!(id = %id, "Storing image in memory cache");
        self.cache.lock().put(id, image);
    }

    fn remove(&self, id: &ImageId) {
        if self.cache.lock().pop(id).is_some() {
            debug!(id = %id, "Removed image from memory cache");
        }
    }

    fn len(&self) -> usize {
        self.cache.lock().len()
    }

    fn clear(&self) {
        self.cache.lock().clear();
        debug!("Cleared memory image cache");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn sample(width: u32) -> SharedImage {
        Arc::new(image::DynamicImage::new_rgb8(width, 10))
    }

    #[test]
    fn test_cache_set_and_get() {
        let cache = MemoryImageCache::new();
        let id = ImageId::new("https://example.com/a.jpg");

        cache.set(id.clone(), sample(100));
        let retrieved = cache.get(&id);

        assert_eq!(retrieved.map(|img| img.width()), Some(100));
    }

    #[test]
    fn test_cache_miss() {
        let cache = MemoryImageCache::new();
        assert!(cache.get(&ImageId::new("https://example.com/none.jpg")).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_overwrite_keeps_last_writer() {
        let cache = MemoryImageCache::new();
        let id = ImageId::new("https://example.com/a.jpg");

        cache.set(id.clone(), sample(10));
        cache.set(id.clone(), sample(20));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&id).map(|img| img.width()), Some(20));
    }

    #[test]
    fn test_remove() {
        let cache = MemoryImageCache::new();
        let id = ImageId::new("https://example.com/a.jpg");
        cache.set(id.clone(), sample(10));

        cache.remove(&id);
        cache.remove(&id);

        assert!(cache.get(&id).is_none());
    }

    #[test]
    fn test_unbounded_capacity() {
        let cache = MemoryImageCache::new();
        for i in 0..500 {
            cache.set(ImageId::new(format!("https://example.com/{i}.jpg")), sample(1));
        }
        assert_eq!(cache.len(), 500);
        assert!(cache.get(&ImageId::new("https://example.com/0.jpg")).is_some());
    }

    #[test]
    fn test_relieve_pressure_drops_oldest_writes() {
        let cache = MemoryImageCache::new();
        let ids: Vec<_> = (0..4)
            .map(|i| ImageId::new(format!("https://example.com/{i}.jpg")))
            .collect();
        for id in &ids {
            cache.set(id.clone(), sample(1));
        }
        // A read must not save the oldest entry.
        let _ = cache.get(&ids[0]);

        let dropped = cache.relieve_pressure(2);

        assert_eq!(dropped, 2);
        assert!(cache.get(&ids[0]).is_none());
        assert!(cache.get(&ids[1]).is_none());
        assert!(cache.get(&ids[2]).is_some());
        assert!(cache.get(&ids[3]).is_some());
    }

    #[test]
    fn test_cache_stats() {
        let cache = MemoryImageCache::new();
        let id = ImageId::new("https://example.com/a.jpg");
        cache.set(id.clone(), sample(10));

        let _ = cache.get(&id);
        let _ = cache.get(&ImageId::new("https://example.com/missing.jpg"));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.size, 1);
        assert_eq!(
            stats.to_string(),
            "Cache: 1 images, 50.0% hit rate (1 hits, 1 misses)"
        );
    }

    #[test]
    fn test_concurrent_writers_same_key() {
        let cache = Arc::new(MemoryImageCache::new());
        let id = ImageId::new("https://example.com/shared.jpg");

        std::thread::scope(|scope| {
            for width in 1..=8 {
                let cache = Arc::clone(&cache);
                let id = id.clone();
                scope.spawn(move || {
                    cache.set(id.clone(), sample(width));
                    assert!(cache.get(&id).is_some());
                });
            }
        });

        assert_eq!(cache.len(), 1);
        let width = cache.get(&id).map_or(0, |img| img.width());
        assert!((1..=8).contains(&width));
    }
}

//! Bounded cache of per-label results from the external stages.
//!
//! Keys combine the uploaded image and the label, so the same label on a
//! different photo is a separate entry. Only nutrition-database and vision-LLM
//! results are stored.

use lru::LruCache;
use macrolens_core::LabelResult;
use sha2::{Digest, Sha256};
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::trace;

/// LRU cache of [`LabelResult`]s. Clones share the same storage.
#[derive(Clone)]
pub struct ResponseCache {
    /// `None` when the cache is disabled.
    cache: Option<Arc<Mutex<LruCache<String, LabelResult>>>>,
}

impl ResponseCache {
    /// Create a cache holding at most `capacity` entries; zero disables it.
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: NonZeroUsize::new(capacity).map(|c| Arc::new(Mutex::new(LruCache::new(c)))),
        }
    }

    pub fn disabled() -> Self {
        Self { cache: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.cache.is_some()
    }

    /// First 16 hex chars of SHA-256 over `image ‖ 0x00 ‖ lowercase label`.
    pub fn cache_key(image: &[u8], label: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(image);
        hasher.update([0u8]);
        hasher.update(label.trim().to_lowercase().as_bytes());
        let digest = hex::encode(hasher.finalize());
        digest[..16].to_string()
    }

    pub async fn get(&self, key: &str) -> Option<LabelResult> {
        let cache = self.cache.as_ref()?;
        let hit = cache.lock().await.get(key).cloned();
        trace!(
            subsystem = "api",
            component = "response_cache",
            cache_key = key,
            cache_hit = hit.is_some(),
            "Response cache lookup"
        );
        hit
    }

    pub async fn put(&self, key: String, result: LabelResult) {
        if let Some(cache) = &self.cache {
            cache.lock().await.put(key, result);
        }
    }

    pub async fn len(&self) -> usize {
        match &self.cache {
            Some(cache) => cache.lock().await.len(),
            None => 0,
        }
    }
}

//! Pending upload store
//!
//! Holds captured uploads until a generate-content request references them.
//! Entries are read, not removed, on lookup.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::debug;

/// Prefix of every synthetic file id
pub const SYNTHETIC_ID_PREFIX: &str = "bypass_";

/// How long captured uploads stay resolvable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvictionPolicy {
    /// Keep entries for the lifetime of the store
    #[default]
    Never,
    /// Drop entries older than the given age
    ExpireAfter(Duration),
}

impl From<Option<Duration>> for EvictionPolicy {
    fn from(ttl: Option<Duration>) -> Self {
        ttl.map_or(EvictionPolicy::Never, EvictionPolicy::ExpireAfter)
    }
}

/// A captured upload
#[derive(Debug, Clone)]
pub struct PendingUpload {
    pub synthetic_id: String,
    pub bytes: Arc<Vec<u8>>,
    pub created_at: Instant,
}

impl PendingUpload {
    fn is_expired(&self, policy: EvictionPolicy, now: Instant) -> bool {
        match policy {
            EvictionPolicy::Never => false,
            EvictionPolicy::ExpireAfter(ttl) => now.duration_since(self.created_at) >= ttl,
        }
    }
}

/// Store shared by the upload and rewrite interceptors
#[derive(Debug, Default)]
pub struct PendingUploadStore {
    entries: RwLock<HashMap<String, PendingUpload>>,
    next_id: AtomicU64,
    policy: EvictionPolicy,
}

impl PendingUploadStore {
    pub fn new(policy: EvictionPolicy) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(0),
            policy,
        }
    }

    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    /// Capture bytes under a fresh synthetic id
    pub fn insert(&self, bytes: Vec<u8>) -> PendingUpload {
        let seq = self.next_id.fetch_add(1, Ordering::Relaxed);
        let upload = PendingUpload {
            synthetic_id: format!("{}{}", SYNTHETIC_ID_PREFIX, seq),
            bytes: Arc::new(bytes),
            created_at: Instant::now(),
        };

        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        if self.policy != EvictionPolicy::Never {
            let now = upload.created_at;
            let before = entries.len();
            entries.retain(|_, entry| !entry.is_expired(self.policy, now));
            if entries.len() < before {
                debug!("🧹 Purged {} expired uploads", before - entries.len());
            }
        }
        entries.insert(upload.synthetic_id.clone(), upload.clone());

        debug!(
            "📝 Captured upload {} ({} bytes)",
            upload.synthetic_id,
            upload.bytes.len()
        );
        upload
    }

    /// Bytes captured under `synthetic_id`, unless unknown or expired
    pub fn get(&self, synthetic_id: &str) -> Option<Arc<Vec<u8>>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        let entry = entries.get(synthetic_id)?;
        if entry.is_expired(self.policy, Instant::now()) {
            return None;
        }
        Some(entry.bytes.clone())
    }

    pub fn contains(&self, synthetic_id: &str) -> bool {
        self.get(synthetic_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_and_retrieve() {
        let store = PendingUploadStore::default();
        let upload = store.insert(b"image bytes".to_vec());

        assert!(upload.synthetic_id.starts_with(SYNTHETIC_ID_PREFIX));
        assert_eq!(store.get(&upload.synthetic_id).unwrap().as_slice(), b"image bytes");
        // Lookups do not consume the entry
        assert!(store.contains(&upload.synthetic_id));
    }

    #[test]
    fn test_missing_entry() {
        let store = PendingUploadStore::default();
        assert!(store.get("bypass_404").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_ids_are_unique_even_for_equal_content() {
        let store = PendingUploadStore::default();
        let a = store.insert(b"same".to_vec());
        let b = store.insert(b"same".to_vec());

        assert_ne!(a.synthetic_id, b.synthetic_id);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_expired_entries_are_invisible_and_purged() {
        let store = PendingUploadStore::new(EvictionPolicy::ExpireAfter(Duration::ZERO));
        let first = store.insert(b"old".to_vec());

        assert!(store.get(&first.synthetic_id).is_none());

        store.insert(b"new".to_vec());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_policy_from_ttl() {
        assert_eq!(EvictionPolicy::from(None), EvictionPolicy::Never);
        assert_eq!(
            EvictionPolicy::from(Some(Duration::from_secs(30))),
            EvictionPolicy::ExpireAfter(Duration::from_secs(30))
        );
    }
}

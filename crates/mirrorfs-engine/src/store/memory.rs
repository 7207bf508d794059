//! In-memory content store.
//!
//! The reference [`ContentStore`]: hosts use it as a collection cache in
//! front of durable blob storage, and every test suite seeds it
//! directly. All data is lost on drop.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use mirrorfs_types::VfsError;

use super::traits::{ContentKey, ContentSlice, ContentStore};

/// Thread-safe in-memory blob map keyed by `(endpoint, path, timestamp)`.
#[derive(Default)]
pub struct MemoryContentStore {
    blobs: RwLock<HashMap<ContentKey, Arc<Vec<u8>>>>,
}

impl MemoryContentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store content for a key, replacing any previous value.
    pub async fn insert(&self, key: ContentKey, data: impl Into<Vec<u8>>) {
        let mut blobs = self.blobs.write().await;
        blobs.insert(key, Arc::new(data.into()));
    }

    /// Drop the content for a key. Unknown keys are ignored.
    pub async fn remove(&self, key: &ContentKey) {
        let mut blobs = self.blobs.write().await;
        blobs.remove(key);
    }

    /// Number of stored blobs.
    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    /// Whether the store holds nothing.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl std::fmt::Debug for MemoryContentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryContentStore").finish()
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn read_range(
        &self,
        key: &ContentKey,
        offset: u64,
        length: Option<u64>,
    ) -> Result<ContentSlice, VfsError> {
        let blobs = self.blobs.read().await;
        let data = blobs
            .get(key)
            .ok_or_else(|| VfsError::not_found(format!("content for {key}")))?;

        let total_len = data.len() as u64;
        let start = offset.min(total_len) as usize;
        let end = match length {
            Some(len) => (offset.saturating_add(len)).min(total_len) as usize,
            None => total_len as usize,
        };

        Ok(ContentSlice {
            data: data[start..end.max(start)].to_vec(),
            total_len,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mirrorfs_types::{EndpointId, Timestamp, VfsPath};

    fn key() -> ContentKey {
        ContentKey::new(
            EndpointId::new("ep-1"),
            VfsPath::parse("/fs/os/etc/hosts").unwrap(),
            Timestamp::from_secs(100),
        )
    }

    #[tokio::test]
    async fn read_whole_blob() {
        let store = MemoryContentStore::new();
        store.insert(key(), b"hello world".to_vec()).await;

        let slice = store.read_range(&key(), 0, None).await.unwrap();
        assert_eq!(slice.data, b"hello world");
        assert_eq!(slice.total_len, 11);
    }

    #[tokio::test]
    async fn read_middle_range() {
        let store = MemoryContentStore::new();
        store.insert(key(), b"hello world".to_vec()).await;

        let slice = store.read_range(&key(), 6, Some(5)).await.unwrap();
        assert_eq!(slice.data, b"world");
        assert_eq!(slice.total_len, 11);
    }

    #[tokio::test]
    async fn range_past_end_clamps_to_empty() {
        let store = MemoryContentStore::new();
        store.insert(key(), b"abc".to_vec()).await;

        let slice = store.read_range(&key(), 10, Some(4)).await.unwrap();
        assert!(slice.data.is_empty());
        assert_eq!(slice.total_len, 3);
    }

    #[tokio::test]
    async fn length_clamps_to_total() {
        let store = MemoryContentStore::new();
        store.insert(key(), b"abc".to_vec()).await;

        let slice = store.read_range(&key(), 1, Some(100)).await.unwrap();
        assert_eq!(slice.data, b"bc");
    }

    #[tokio::test]
    async fn missing_key_is_not_found() {
        let store = MemoryContentStore::new();
        let err = store.read_range(&key(), 0, None).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn contains_reflects_inserts_and_removes() {
        let store = MemoryContentStore::new();
        assert!(!store.contains(&key()).await);

        store.insert(key(), b"x".to_vec()).await;
        assert!(store.contains(&key()).await);

        store.remove(&key()).await;
        assert!(!store.contains(&key()).await);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn insert_replaces_existing() {
        let store = MemoryContentStore::new();
        store.insert(key(), b"first".to_vec()).await;
        store.insert(key(), b"second".to_vec()).await;

        let slice = store.read_range(&key(), 0, None).await.unwrap();
        assert_eq!(slice.data, b"second");
        assert_eq!(store.len().await, 1);
    }
}

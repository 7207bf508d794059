//! ContentFetcher — byte-range and text reads over the content store.
//!
//! The store clamps ranges; this layer decides what is an error. An
//! offset past the end of the content is a [`VfsError::Range`], and
//! every read reports the total underlying size so callers can detect
//! truncation without a second round trip.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use mirrorfs_types::{Encoding, VfsError};

use crate::codec;
use crate::store::{ContentKey, ContentStore};

/// A decoded text range plus the size of the underlying content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSlice {
    pub text: String,
    /// Total byte size of the content the range was cut from.
    pub total_size: u64,
}

/// A raw byte range plus the size of the underlying content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobSlice {
    pub data: Vec<u8>,
    /// Total byte size of the content the range was cut from.
    pub total_size: u64,
}

/// Read-only access to collected content, addressed by snapshot.
pub struct ContentFetcher {
    store: Arc<dyn ContentStore>,
}

impl ContentFetcher {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Read a raw byte range.
    ///
    /// `length: None` reads to the end. Fails with `Range` when the
    /// offset lies beyond the total size, and `NotFound` when no
    /// content was ever collected for the key.
    pub async fn read_blob(
        &self,
        key: &ContentKey,
        offset: u64,
        length: Option<u64>,
    ) -> Result<BlobSlice, VfsError> {
        let slice = self.store.read_range(key, offset, length).await?;
        if offset > slice.total_len {
            return Err(VfsError::Range {
                offset,
                size: slice.total_len,
            });
        }
        Ok(BlobSlice {
            data: slice.data,
            total_size: slice.total_len,
        })
    }

    /// Read a byte range and decode it with the given codec.
    pub async fn read_text(
        &self,
        key: &ContentKey,
        offset: u64,
        length: Option<u64>,
        encoding: Encoding,
    ) -> Result<TextSlice, VfsError> {
        let blob = self.read_blob(key, offset, length).await?;
        let text = codec::decode(encoding, &blob.data)?;
        Ok(TextSlice {
            text,
            total_size: blob.total_size,
        })
    }
}

impl std::fmt::Debug for ContentFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentFetcher").finish()
    }
}

/// Hex-encoded SHA-256 of a byte slice, the digest format snapshots
/// carry in `content_hash`.
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

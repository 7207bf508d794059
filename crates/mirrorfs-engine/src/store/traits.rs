//! Collaborator traits.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use mirrorfs_types::{EndpointId, OperationId, Timestamp, VfsError, VfsPath};

/// Addresses one collected content version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentKey {
    pub endpoint: EndpointId,
    pub path: VfsPath,
    /// Collection timestamp of the snapshot the content belongs to.
    pub timestamp: Timestamp,
}

impl ContentKey {
    pub fn new(endpoint: EndpointId, path: VfsPath, timestamp: Timestamp) -> Self {
        Self {
            endpoint,
            path,
            timestamp,
        }
    }
}

impl std::fmt::Display for ContentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}@{}", self.endpoint, self.path, self.timestamp)
    }
}

/// A byte range served by the content store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentSlice {
    /// The requested bytes, clamped to what exists.
    pub data: Vec<u8>,
    /// Total length of the underlying content.
    pub total_len: u64,
}

/// Byte-range access to collected file content.
///
/// Implementations clamp the range instead of failing: a read past the
/// end returns empty data plus the true `total_len`. Range policy (what
/// counts as an error) belongs to the caller, not the store.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Read up to `length` bytes starting at `offset`. `None` reads to
    /// the end. Fails with `NotFound` when no content exists for the
    /// key.
    async fn read_range(
        &self,
        key: &ContentKey,
        offset: u64,
        length: Option<u64>,
    ) -> Result<ContentSlice, VfsError>;

    /// Whether content exists for the key.
    async fn contains(&self, key: &ContentKey) -> bool {
        self.read_range(key, 0, Some(0)).await.is_ok()
    }
}

/// The remote collection agent.
///
/// Requests are submissions, not completions: a returned `Ok` means the
/// agent accepted the work. The agent reports completion later through
/// the operation id, at least once.
#[async_trait]
pub trait Collector: Send + Sync {
    /// Ask the agent to re-list metadata under `path`, recursing at most
    /// `max_depth` levels.
    async fn request_refresh(
        &self,
        operation: &OperationId,
        endpoint: &EndpointId,
        path: &VfsPath,
        max_depth: u32,
    ) -> Result<(), VfsError>;

    /// Ask the agent to re-collect one file's content.
    async fn request_content_update(
        &self,
        operation: &OperationId,
        endpoint: &EndpointId,
        path: &VfsPath,
    ) -> Result<(), VfsError>;
}

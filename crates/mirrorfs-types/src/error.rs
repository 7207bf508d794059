//! The error taxonomy shared by every mirrorfs component.

use crate::encoding::Encoding;
use crate::path::VfsPath;
use crate::time::Timestamp;

/// Errors surfaced by the VFS engine.
///
/// Validation errors (`InvalidPath`, `Range`) reject the request before
/// any mutation. `OutOfOrder` is special: the write it reports has still
/// been applied to history, callers log it and continue. Collaborator
/// failures pass through unretried; retry policy belongs to the
/// collaborator, not this core.
#[derive(Debug, thiserror::Error)]
pub enum VfsError {
    /// Malformed path input, rejected before any mutation.
    #[error("invalid path: {reason}")]
    InvalidPath { reason: String },

    /// Unknown path, endpoint, operation or exact timestamp.
    #[error("not found: {what}")]
    NotFound { what: String },

    /// A snapshot write older than the path's latest. The snapshot has
    /// been appended to history anyway; only the latest pointer was
    /// unaffected.
    #[error("out-of-order snapshot for {path}: {timestamp} is older than latest {latest}")]
    OutOfOrder {
        path: VfsPath,
        timestamp: Timestamp,
        latest: Timestamp,
    },

    /// The byte range is invalid for the chosen codec.
    #[error("cannot decode as {encoding}: {reason}")]
    Decode { encoding: Encoding, reason: String },

    /// Offset past the end of the content.
    #[error("offset {offset} is beyond total size {size}")]
    Range { offset: u64, size: u64 },

    /// The remote collection agent rejected or failed a request.
    #[error("collector request failed: {0}")]
    Collector(String),

    /// The content store collaborator failed.
    #[error("content store error: {0}")]
    Storage(String),
}

impl VfsError {
    pub fn invalid_path(reason: impl Into<String>) -> Self {
        VfsError::InvalidPath {
            reason: reason.into(),
        }
    }

    pub fn not_found(what: impl std::fmt::Display) -> Self {
        VfsError::NotFound {
            what: what.to_string(),
        }
    }

    pub fn decode(encoding: Encoding, reason: impl Into<String>) -> Self {
        VfsError::Decode {
            encoding,
            reason: reason.into(),
        }
    }

    /// True for `NotFound`, the variant callers most often branch on.
    pub fn is_not_found(&self) -> bool {
        matches!(self, VfsError::NotFound { .. })
    }
}

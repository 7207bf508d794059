//! Stat metadata and point-in-time snapshots.

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// Stat metadata reported by a collection agent for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StatEntry {
    /// Size in bytes.
    pub size: u64,
    /// Unix mode bits (type and permissions).
    pub mode: u32,
    /// Owning user id.
    pub uid: u32,
    /// Owning group id.
    pub gid: u32,
    /// Last access time on the endpoint, if reported.
    pub atime: Option<Timestamp>,
    /// Last modification time on the endpoint, if reported.
    pub mtime: Option<Timestamp>,
    /// Last inode change time on the endpoint, if reported.
    pub ctime: Option<Timestamp>,
}

impl StatEntry {
    /// A minimal stat entry for a regular file of the given size.
    pub fn file(size: u64) -> Self {
        Self {
            size,
            mode: 0o100644,
            ..Self::default()
        }
    }

    /// A minimal stat entry for a directory.
    pub fn directory() -> Self {
        Self {
            mode: 0o040755,
            ..Self::default()
        }
    }
}

/// An immutable record of a file's metadata at one collection instant.
///
/// Identified by `(path, collected_at)`; once written it is never
/// mutated, only superseded by snapshots with newer timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// When the collection agent observed the file.
    pub collected_at: Timestamp,
    /// Stat metadata at that instant.
    pub stat: StatEntry,
    /// SHA-256 of the collected content, hex-encoded, if content was
    /// fetched alongside the stat.
    pub content_hash: Option<String>,
    /// Length in bytes of the collected content, if known.
    pub content_len: Option<u64>,
}

impl Snapshot {
    /// A metadata-only snapshot (no content collected).
    pub fn new(collected_at: Timestamp, stat: StatEntry) -> Self {
        Self {
            collected_at,
            stat,
            content_hash: None,
            content_len: None,
        }
    }

    /// Attach a content digest and length to this snapshot.
    pub fn with_content(mut self, hash: impl Into<String>, len: u64) -> Self {
        self.content_hash = Some(hash.into());
        self.content_len = Some(len);
        self
    }

    /// True when content was collected with this snapshot.
    pub fn has_content(&self) -> bool {
        self.content_hash.is_some()
    }
}

//! Derived timeline events.

use serde::{Deserialize, Serialize};

use crate::path::VfsPath;
use crate::time::Timestamp;

/// What changed between two consecutive snapshots of a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimelineAction {
    /// Content hash changed.
    Modification,
    /// Only the collection time advanced.
    Access,
    /// A stat field other than the content changed.
    MetadataChanged,
}

impl std::fmt::Display for TimelineAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimelineAction::Modification => write!(f, "MODIFICATION"),
            TimelineAction::Access => write!(f, "ACCESS"),
            TimelineAction::MetadataChanged => write!(f, "METADATA_CHANGED"),
        }
    }
}

/// One event in a path's derived history.
///
/// Timeline events are never stored; they are computed on demand from
/// snapshot history and ordered by timestamp, ties broken by path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub timestamp: Timestamp,
    pub path: VfsPath,
    pub action: TimelineAction,
}

/// Serialization format for timeline exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineCsvFormat {
    /// Tabular rows: `timestamp,datetime,message,timestamp_desc`.
    Native,
    /// Sleuth Kit body-file rows:
    /// `MD5|name|inode|mode|uid|gid|size|atime|mtime|ctime|crtime`.
    Body,
}

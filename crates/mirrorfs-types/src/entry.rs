//! Node records returned by listing and details queries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::path::VfsPath;
use crate::stat::{Snapshot, StatEntry};
use crate::time::Timestamp;

/// Kind of VFS node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    File,
    Directory,
}

impl NodeKind {
    pub fn is_directory(&self) -> bool {
        matches!(self, NodeKind::Directory)
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeKind::File => write!(f, "file"),
            NodeKind::Directory => write!(f, "directory"),
        }
    }
}

/// A typed extended-attribute value.
///
/// Collection agents report arbitrary per-node attributes (filesystem
/// flags, alternate stream names, registry-style values). The closed set
/// of kinds below covers what agents actually send; anything else
/// arrives as opaque bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AttrValue {
    Str(String),
    Int(i64),
    Uint(u64),
    Bool(bool),
    Bytes(Vec<u8>),
}

/// One entry in a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Name of the entry (final path segment).
    pub name: String,
    /// Full path of the entry.
    pub path: VfsPath,
    /// File or directory.
    pub kind: NodeKind,
    /// Latest observed stat, absent for virtual directories.
    pub stat: Option<StatEntry>,
    /// When the latest snapshot was collected, if any.
    pub last_collected: Option<Timestamp>,
}

/// The full record for a single node, as served by details queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDetails {
    /// Full path of the node.
    pub path: VfsPath,
    /// File or directory.
    pub kind: NodeKind,
    /// The snapshot resolved for the requested point in time, absent
    /// when the node has never been collected (virtual directories).
    pub snapshot: Option<Snapshot>,
    /// Extended attributes reported by the collection agent.
    pub attrs: BTreeMap<String, AttrValue>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attr_value_serde_is_tagged() {
        let attr = AttrValue::Uint(7);
        let json = serde_json::to_string(&attr).unwrap();
        assert_eq!(json, r#"{"kind":"uint","value":7}"#);
    }

    #[test]
    fn bytes_fallback_round_trips() {
        let attr = AttrValue::Bytes(vec![0, 159, 146]);
        let json = serde_json::to_string(&attr).unwrap();
        let back: AttrValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, attr);
    }
}

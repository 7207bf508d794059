//! PathTree — the hierarchical namespace index of one endpoint.
//!
//! Nodes are keyed by [`VfsPath`] in a `BTreeMap`; path ordering keeps
//! every subtree contiguous, so child listings and subtree walks are
//! range scans. Inserting a path materializes its missing ancestors as
//! implicit directories: a directory nobody ever collected a stat for is
//! a *virtual directory* and lists with no stat attached.

use std::collections::BTreeMap;
use std::ops::Bound;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use mirrorfs_types::{AttrValue, FileEntry, NodeKind, Snapshot, VfsError, VfsPath};

/// Options for a child listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListOptions {
    /// Number of leading entries to skip.
    pub offset: usize,
    /// Maximum entries to return; `None` returns everything.
    pub count: Option<usize>,
    /// Substring match against the child's full path string.
    pub filter: Option<String>,
    /// Keep only directories.
    pub directories_only: bool,
}

/// A node as stored in the tree.
#[derive(Debug, Clone)]
pub struct NodeInfo {
    pub kind: NodeKind,
    /// False for ancestors synthesized by inserts below them.
    pub explicit: bool,
    /// Latest snapshot, mirrored here by ingestion for cheap listings.
    pub latest: Option<Snapshot>,
    /// Extended attributes reported by the collection agent.
    pub attrs: BTreeMap<String, AttrValue>,
}

impl NodeInfo {
    fn implicit_directory() -> Self {
        Self {
            kind: NodeKind::Directory,
            explicit: false,
            latest: None,
            attrs: BTreeMap::new(),
        }
    }
}

/// Ordered index of every path known for one endpoint.
///
/// Thread-safe via an internal `RwLock`. The tree stores identity and
/// the latest-stat mirror; full history lives in the
/// [`VersionStore`](crate::VersionStore).
pub struct PathTree {
    nodes: RwLock<BTreeMap<VfsPath, NodeInfo>>,
}

impl Default for PathTree {
    fn default() -> Self {
        Self::new()
    }
}

impl PathTree {
    /// Create a tree holding only the root directory.
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(VfsPath::root(), NodeInfo::implicit_directory());
        Self {
            nodes: RwLock::new(nodes),
        }
    }

    /// Record a path, creating missing ancestors as implicit
    /// directories. Idempotent; a later insert may flip the kind when
    /// the agent re-observes the path as something else.
    ///
    /// Malformed paths never get here: [`VfsPath`] parsing rejects them.
    pub async fn insert(&self, path: &VfsPath, kind: NodeKind) -> Result<(), VfsError> {
        let mut nodes = self.nodes.write().await;

        for ancestor in path.ancestors() {
            nodes
                .entry(ancestor)
                .or_insert_with(NodeInfo::implicit_directory);
        }

        match nodes.get_mut(path) {
            Some(node) => {
                if node.kind != kind {
                    tracing::debug!(%path, from = %node.kind, to = %kind, "node kind changed");
                    node.kind = kind;
                }
                node.explicit = true;
            }
            None => {
                nodes.insert(
                    path.clone(),
                    NodeInfo {
                        kind,
                        explicit: true,
                        latest: None,
                        attrs: BTreeMap::new(),
                    },
                );
            }
        }

        Ok(())
    }

    /// Whether the path is known.
    pub async fn exists(&self, path: &VfsPath) -> bool {
        self.nodes.read().await.contains_key(path)
    }

    /// The stored record for a path.
    pub async fn node(&self, path: &VfsPath) -> Option<NodeInfo> {
        self.nodes.read().await.get(path).cloned()
    }

    /// Mirror the latest snapshot onto the node. Returns false when the
    /// path is unknown.
    pub async fn set_latest(&self, path: &VfsPath, snapshot: Snapshot) -> bool {
        let mut nodes = self.nodes.write().await;
        match nodes.get_mut(path) {
            Some(node) => {
                node.latest = Some(snapshot);
                true
            }
            None => false,
        }
    }

    /// Merge extended attributes onto the node. Returns false when the
    /// path is unknown.
    pub async fn set_attrs(&self, path: &VfsPath, attrs: BTreeMap<String, AttrValue>) -> bool {
        let mut nodes = self.nodes.write().await;
        match nodes.get_mut(path) {
            Some(node) => {
                node.attrs.extend(attrs);
                true
            }
            None => false,
        }
    }

    /// Direct children of a path, ordered by name.
    ///
    /// Fails with `NotFound` for unknown paths; an existing node without
    /// children (including a file) yields an empty listing.
    pub async fn children(
        &self,
        path: &VfsPath,
        opts: &ListOptions,
    ) -> Result<Vec<FileEntry>, VfsError> {
        let nodes = self.nodes.read().await;
        if !nodes.contains_key(path) {
            return Err(VfsError::not_found(format!("path {path}")));
        }

        let matching = nodes
            .range((Bound::Excluded(path), Bound::Unbounded))
            .take_while(|(p, _)| p.starts_with(path))
            .filter(|(p, _)| p.is_child_of(path))
            .filter(|(_, node)| !opts.directories_only || node.kind.is_directory())
            .filter(|(p, _)| match &opts.filter {
                Some(needle) => p.to_string().contains(needle.as_str()),
                None => true,
            })
            .map(|(p, node)| entry_for(p, node));

        let listed = match opts.count {
            Some(count) => matching.skip(opts.offset).take(count).collect(),
            None => matching.skip(opts.offset).collect(),
        };
        Ok(listed)
    }

    /// Every node at or below `path`, in path order.
    pub async fn walk(&self, path: &VfsPath) -> Result<Vec<FileEntry>, VfsError> {
        let nodes = self.nodes.read().await;
        let root = nodes
            .get(path)
            .ok_or_else(|| VfsError::not_found(format!("path {path}")))?;

        let mut result = vec![entry_for(path, root)];
        result.extend(
            nodes
                .range((Bound::Excluded(path), Bound::Unbounded))
                .take_while(|(p, _)| p.starts_with(path))
                .map(|(p, node)| entry_for(p, node)),
        );
        Ok(result)
    }

    /// Number of known nodes, the root included.
    pub async fn len(&self) -> usize {
        self.nodes.read().await.len()
    }

    /// True when only the root exists.
    pub async fn is_empty(&self) -> bool {
        self.len().await <= 1
    }
}

impl std::fmt::Debug for PathTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathTree").finish()
    }
}

fn entry_for(path: &VfsPath, node: &NodeInfo) -> FileEntry {
    FileEntry {
        name: path.name().unwrap_or("/").to_string(),
        path: path.clone(),
        kind: node.kind,
        stat: node.latest.as_ref().map(|s| s.stat.clone()),
        last_collected: node.latest.as_ref().map(|s| s.collected_at),
    }
}

//! VersionStore — append-only snapshot history per path.
//!
//! History tolerates unordered delivery: an agent may flush old
//! observations after newer ones, and audit trails want those kept. A
//! write older than the path's latest still lands in history; it is
//! reported as [`VfsError::OutOfOrder`] so ingestion layers can log it,
//! and the latest pointer stays defined by timestamp value alone.

use std::collections::{BTreeMap, HashMap};

use tokio::sync::RwLock;

use mirrorfs_types::{Snapshot, Timestamp, VfsError, VfsPath};

/// Snapshot histories for one endpoint, keyed by path and timestamp.
///
/// At most one snapshot exists per `(path, timestamp)` pair; duplicate
/// writes resolve last-write-wins with no ordering guarantee across
/// concurrent writers.
#[derive(Default)]
pub struct VersionStore {
    histories: RwLock<HashMap<VfsPath, BTreeMap<Timestamp, Snapshot>>>,
}

impl VersionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a snapshot to the path's history.
    ///
    /// Always appends. When the timestamp is older than the current
    /// latest the write is reported as `OutOfOrder` after being applied;
    /// callers treat that as a logged anomaly, not a failure.
    pub async fn put(&self, path: &VfsPath, snapshot: Snapshot) -> Result<(), VfsError> {
        let timestamp = snapshot.collected_at;
        let mut histories = self.histories.write().await;
        let history = histories.entry(path.clone()).or_default();

        let latest_before = history.keys().next_back().copied();
        history.insert(timestamp, snapshot);

        if let Some(latest) = latest_before {
            if timestamp < latest {
                tracing::warn!(%path, %timestamp, %latest, "snapshot arrived out of order");
                return Err(VfsError::OutOfOrder {
                    path: path.clone(),
                    timestamp,
                    latest,
                });
            }
        }
        Ok(())
    }

    /// Fetch a snapshot.
    ///
    /// With no timestamp this is the latest snapshot. With one it is an
    /// exact match: there is no nearest-match fallback, callers that
    /// want one enumerate [`version_times`](Self::version_times) first.
    pub async fn get(
        &self,
        path: &VfsPath,
        at: Option<Timestamp>,
    ) -> Result<Snapshot, VfsError> {
        let histories = self.histories.read().await;
        let history = histories
            .get(path)
            .filter(|h| !h.is_empty())
            .ok_or_else(|| VfsError::not_found(format!("no versions of {path}")))?;

        match at {
            None => history
                .values()
                .next_back()
                .cloned()
                .ok_or_else(|| VfsError::not_found(format!("no versions of {path}"))),
            Some(timestamp) => history.get(&timestamp).cloned().ok_or_else(|| {
                VfsError::not_found(format!("snapshot of {path} at {timestamp}"))
            }),
        }
    }

    /// The latest snapshot, if any.
    pub async fn latest(&self, path: &VfsPath) -> Option<Snapshot> {
        let histories = self.histories.read().await;
        histories
            .get(path)
            .and_then(|h| h.values().next_back().cloned())
    }

    /// The newest snapshot collected at or before `cutoff`, if any.
    pub async fn latest_at_or_before(
        &self,
        path: &VfsPath,
        cutoff: Timestamp,
    ) -> Option<Snapshot> {
        let histories = self.histories.read().await;
        histories
            .get(path)
            .and_then(|h| h.range(..=cutoff).next_back().map(|(_, s)| s.clone()))
    }

    /// All known collection timestamps for a path, newest first.
    ///
    /// Unknown paths yield an empty list.
    pub async fn version_times(&self, path: &VfsPath) -> Vec<Timestamp> {
        let histories = self.histories.read().await;
        histories
            .get(path)
            .map(|h| h.keys().rev().copied().collect())
            .unwrap_or_default()
    }

    /// Full history for a path, oldest first.
    pub async fn history(&self, path: &VfsPath) -> Vec<Snapshot> {
        let histories = self.histories.read().await;
        histories
            .get(path)
            .map(|h| h.values().cloned().collect())
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for VersionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionStore").finish()
    }
}

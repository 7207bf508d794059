//! OperationTracker — refresh and content-update job tracking.
//!
//! Operations are the engine's only write path to the remote agent:
//! register an id, hand the request to the [`Collector`], and wait for
//! the agent to call back. The agent delivers completion at least once,
//! so [`complete`](OperationTracker::complete) must be idempotent and
//! must swallow unknown ids. Nothing here times out: an operation whose
//! agent never answers stays `RUNNING` until the process dies, and
//! callers poll.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use mirrorfs_types::{
    EndpointId, OperationId, OperationInfo, OperationKind, OperationState, Timestamp, VfsError,
    VfsPath,
};

use crate::store::Collector;

/// Registry of in-flight and finished operations.
pub struct OperationTracker {
    collector: Arc<dyn Collector>,
    ops: RwLock<HashMap<OperationId, OperationInfo>>,
}

impl OperationTracker {
    pub fn new(collector: Arc<dyn Collector>) -> Self {
        Self {
            collector,
            ops: RwLock::new(HashMap::new()),
        }
    }

    /// Start a subtree metadata refresh. Returns the operation id the
    /// completion callback must quote.
    ///
    /// The registration is rolled back if the collector refuses the
    /// request; an operation nobody can ever complete must not linger.
    pub async fn start_refresh(
        &self,
        endpoint: EndpointId,
        path: VfsPath,
        max_depth: u32,
        notify_user: bool,
    ) -> Result<OperationId, VfsError> {
        let id = self
            .register(OperationKind::Refresh, &endpoint, &path, max_depth, notify_user)
            .await;
        tracing::debug!(operation = %id, %endpoint, %path, max_depth, "refresh requested");

        if let Err(err) = self
            .collector
            .request_refresh(&id, &endpoint, &path, max_depth)
            .await
        {
            self.ops.write().await.remove(&id);
            return Err(err);
        }
        Ok(id)
    }

    /// Start a single-file content re-collection.
    pub async fn start_content_update(
        &self,
        endpoint: EndpointId,
        path: VfsPath,
    ) -> Result<OperationId, VfsError> {
        let id = self
            .register(OperationKind::ContentUpdate, &endpoint, &path, 0, false)
            .await;
        tracing::debug!(operation = %id, %endpoint, %path, "content update requested");

        if let Err(err) = self
            .collector
            .request_content_update(&id, &endpoint, &path)
            .await
        {
            self.ops.write().await.remove(&id);
            return Err(err);
        }
        Ok(id)
    }

    /// Allocate a fresh unique id and register the operation as running.
    async fn register(
        &self,
        kind: OperationKind,
        endpoint: &EndpointId,
        path: &VfsPath,
        max_depth: u32,
        notify_user: bool,
    ) -> OperationId {
        let mut ops = self.ops.write().await;
        loop {
            let id = OperationId::new(Uuid::new_v4().simple().to_string());
            match ops.entry(id.clone()) {
                Entry::Occupied(_) => continue,
                Entry::Vacant(slot) => {
                    slot.insert(OperationInfo {
                        id: id.clone(),
                        kind,
                        endpoint: endpoint.clone(),
                        path: path.clone(),
                        max_depth,
                        notify_user,
                        state: OperationState::Running,
                        started_at: Timestamp::now(),
                    });
                    return id;
                }
            }
        }
    }

    /// Current state of an operation.
    pub async fn state(&self, id: &OperationId) -> Result<OperationState, VfsError> {
        let ops = self.ops.read().await;
        ops.get(id)
            .map(|op| op.state)
            .ok_or_else(|| VfsError::not_found(format!("operation {id}")))
    }

    /// Current state, verified to be of the expected kind. A known id
    /// of the wrong kind answers `NotFound`, so refresh and
    /// content-update ids live in distinct caller-visible namespaces.
    pub async fn state_of(
        &self,
        id: &OperationId,
        kind: OperationKind,
    ) -> Result<OperationState, VfsError> {
        let ops = self.ops.read().await;
        ops.get(id)
            .filter(|op| op.kind == kind)
            .map(|op| op.state)
            .ok_or_else(|| VfsError::not_found(format!("operation {id}")))
    }

    /// The full record for an operation, if known.
    pub async fn info(&self, id: &OperationId) -> Option<OperationInfo> {
        self.ops.read().await.get(id).cloned()
    }

    /// All tracked operations, oldest first.
    pub async fn list(&self) -> Vec<OperationInfo> {
        let ops = self.ops.read().await;
        let mut all: Vec<OperationInfo> = ops.values().cloned().collect();
        all.sort_by_key(|op| op.started_at);
        all
    }

    /// Mark an operation finished.
    ///
    /// Idempotent: completing a finished or unknown id is a no-op. The
    /// agent delivers completion at least once and may quote ids from a
    /// previous process lifetime; neither case is an error.
    pub async fn complete(&self, id: &OperationId) {
        let mut ops = self.ops.write().await;
        match ops.get_mut(id) {
            Some(op) if op.state == OperationState::Running => {
                op.state = OperationState::Finished;
                if op.notify_user {
                    tracing::info!(operation = %id, path = %op.path, "operation finished, user notification due");
                } else {
                    tracing::debug!(operation = %id, "operation finished");
                }
            }
            Some(_) => {
                tracing::debug!(operation = %id, "duplicate completion ignored");
            }
            None => {
                tracing::debug!(operation = %id, "completion for unknown operation ignored");
            }
        }
    }
}

impl std::fmt::Debug for OperationTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationTracker").finish()
    }
}

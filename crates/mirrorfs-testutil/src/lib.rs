//! Test utilities for mirrorfs.
//!
//! Provides the fakes and fixtures the integration suites share:
//! - [`RecordingCollector`] — accepts every request and records it
//! - [`FailingCollector`] — refuses every request
//! - [`seeded_engine`] — an engine pre-loaded with a small endpoint
//!   tree, including a file with two content versions and a
//!   metadata-only file

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use mirrorfs_engine::{sha256_hex, Collector, ContentKey, Engine, MemoryContentStore};
use mirrorfs_types::{
    EndpointId, NodeKind, OperationId, Snapshot, StatEntry, Timestamp, VfsError, VfsPath,
};

/// One request a fake collector received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectRequest {
    Refresh {
        operation: OperationId,
        endpoint: EndpointId,
        path: VfsPath,
        max_depth: u32,
    },
    ContentUpdate {
        operation: OperationId,
        endpoint: EndpointId,
        path: VfsPath,
    },
}

/// A collector that accepts everything and remembers what it was asked.
#[derive(Default)]
pub struct RecordingCollector {
    requests: Mutex<Vec<CollectRequest>>,
}

impl RecordingCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything requested so far, in order.
    pub fn requests(&self) -> Vec<CollectRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }

    fn record(&self, request: CollectRequest) {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
    }
}

#[async_trait]
impl Collector for RecordingCollector {
    async fn request_refresh(
        &self,
        operation: &OperationId,
        endpoint: &EndpointId,
        path: &VfsPath,
        max_depth: u32,
    ) -> Result<(), VfsError> {
        self.record(CollectRequest::Refresh {
            operation: operation.clone(),
            endpoint: endpoint.clone(),
            path: path.clone(),
            max_depth,
        });
        Ok(())
    }

    async fn request_content_update(
        &self,
        operation: &OperationId,
        endpoint: &EndpointId,
        path: &VfsPath,
    ) -> Result<(), VfsError> {
        self.record(CollectRequest::ContentUpdate {
            operation: operation.clone(),
            endpoint: endpoint.clone(),
            path: path.clone(),
        });
        Ok(())
    }
}

/// A collector that refuses everything, for rollback paths.
pub struct FailingCollector;

#[async_trait]
impl Collector for FailingCollector {
    async fn request_refresh(
        &self,
        _operation: &OperationId,
        _endpoint: &EndpointId,
        _path: &VfsPath,
        _max_depth: u32,
    ) -> Result<(), VfsError> {
        Err(VfsError::Collector("agent unreachable".into()))
    }

    async fn request_content_update(
        &self,
        _operation: &OperationId,
        _endpoint: &EndpointId,
        _path: &VfsPath,
    ) -> Result<(), VfsError> {
        Err(VfsError::Collector("agent unreachable".into()))
    }
}

/// An engine plus handles to everything a test wants to poke.
pub struct SeededVfs {
    pub engine: Engine,
    pub content: Arc<MemoryContentStore>,
    pub collector: Arc<RecordingCollector>,
    pub endpoint: EndpointId,
}

/// Timestamps used by [`seeded_engine`].
pub const T1: Timestamp = Timestamp::from_secs(1_000);
pub const T2: Timestamp = Timestamp::from_secs(2_000);
pub const T_SYSLOG: Timestamp = Timestamp::from_secs(1_500);

/// First and second content versions of `/fs/os/etc/hosts`.
pub const HOSTS_V1: &[u8] = b"127.0.0.1 localhost\n";
pub const HOSTS_V2: &[u8] = b"127.0.0.1 localhost\n10.0.0.2 mirror\n";

/// Content of `/fs/os/etc/passwd`.
pub const PASSWD: &[u8] = b"root:x:0:0:root:/root:/bin/bash\n";

/// Build an engine seeded with one endpoint:
///
/// ```text
/// /fs/os/etc/hosts        two versions (T1, T2), content collected
/// /fs/os/etc/passwd       one version (T1), content collected
/// /fs/os/var/log/syslog   one version (T_SYSLOG), metadata only
/// ```
pub async fn seeded_engine() -> SeededVfs {
    let content = Arc::new(MemoryContentStore::new());
    let collector = Arc::new(RecordingCollector::new());
    let engine = Engine::with_defaults(content.clone(), collector.clone());
    let endpoint = EndpointId::new("endpoint-01");

    ingest_file(&engine, &content, &endpoint, "/fs/os/etc/hosts", T1, HOSTS_V1).await;
    ingest_file(&engine, &content, &endpoint, "/fs/os/etc/hosts", T2, HOSTS_V2).await;
    ingest_file(&engine, &content, &endpoint, "/fs/os/etc/passwd", T1, PASSWD).await;

    // A file the agent has only ever stat'ed.
    let path = parse("/fs/os/var/log/syslog");
    engine
        .ingest(
            &endpoint,
            &path,
            NodeKind::File,
            Snapshot::new(T_SYSLOG, StatEntry::file(4096)),
        )
        .await
        .unwrap_or_else(|err| panic!("seeding {path}: {err}"));

    SeededVfs {
        engine,
        content,
        collector,
        endpoint,
    }
}

/// Ingest one collected file version: snapshot with digest plus the
/// bytes in the content store.
pub async fn ingest_file(
    engine: &Engine,
    content: &MemoryContentStore,
    endpoint: &EndpointId,
    path: &str,
    at: Timestamp,
    bytes: &[u8],
) {
    let path = parse(path);
    let snapshot = Snapshot::new(at, StatEntry::file(bytes.len() as u64))
        .with_content(sha256_hex(bytes), bytes.len() as u64);

    engine
        .ingest(endpoint, &path, NodeKind::File, snapshot)
        .await
        .unwrap_or_else(|err| panic!("ingesting {path}: {err}"));
    content
        .insert(
            ContentKey::new(endpoint.clone(), path, at),
            bytes.to_vec(),
        )
        .await;
}

/// Parse a path that is known to be valid.
pub fn parse(path: &str) -> VfsPath {
    VfsPath::parse(path).unwrap_or_else(|err| panic!("parsing {path}: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seeded_engine_has_the_advertised_shape() {
        let vfs = seeded_engine().await;

        let times = vfs
            .engine
            .get_file_version_times(&vfs.endpoint, &parse("/fs/os/etc/hosts"))
            .await
            .unwrap();
        assert_eq!(times, vec![T2, T1]);

        let details = vfs
            .engine
            .get_file_details(&vfs.endpoint, &parse("/fs/os/var/log/syslog"), None)
            .await
            .unwrap();
        assert!(details.snapshot.unwrap().content_hash.is_none());
    }

    #[tokio::test]
    async fn recording_collector_remembers_requests() {
        let vfs = seeded_engine().await;
        let id = vfs
            .engine
            .create_refresh_operation(&vfs.endpoint, &parse("/fs/os"), 2, false)
            .await
            .unwrap();

        let requests = vfs.collector.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0],
            CollectRequest::Refresh {
                operation: id,
                endpoint: vfs.endpoint.clone(),
                path: parse("/fs/os"),
                max_depth: 2,
            }
        );
    }
}

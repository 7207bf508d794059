//! The Engine — owns every component and exposes the operation surface.
//!
//! One engine per server process: created at startup with its two
//! collaborators, torn down at shutdown, handed around by reference.
//! Endpoint namespaces (a [`PathTree`] plus a [`VersionStore`]) are
//! created lazily the first time an endpoint is ingested or refreshed.
//!
//! Collection agents feed the engine through two entry points:
//! [`ingest`](Engine::ingest) delivers snapshots, and
//! [`complete_operation`](Engine::complete_operation) delivers
//! at-least-once completion signals for tracked operations.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::sync::RwLock;

use mirrorfs_types::{
    ArchiveFormat, AttrValue, Encoding, EndpointId, FileDetails, FileEntry, NodeKind,
    OperationId, OperationInfo, OperationKind, OperationState, Snapshot, TimelineCsvFormat,
    TimelineEvent, Timestamp, VfsError, VfsPath,
};

use crate::archive::{ArchiveBundle, ArchiveExporter};
use crate::content::{BlobSlice, ContentFetcher, TextSlice};
use crate::ops::OperationTracker;
use crate::store::{Collector, ContentKey, ContentStore};
use crate::timeline::TimelineBuilder;
use crate::tree::{ListOptions, PathTree};
use crate::version::VersionStore;

/// Engine tuning knobs.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Hard cap on entries per listing page; requests above it are
    /// clamped, requests without a count get it as the default.
    pub max_page_size: usize,
    /// Hard cap in bytes for one text read.
    pub max_text_read: u64,
    /// Container format used when an export does not name one.
    pub default_archive_format: ArchiveFormat,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_page_size: 1000,
            max_text_read: 10 * 1024 * 1024,
            default_archive_format: ArchiveFormat::Zip,
        }
    }
}

/// One endpoint's namespace.
struct EndpointVfs {
    tree: PathTree,
    versions: VersionStore,
}

impl EndpointVfs {
    fn new() -> Self {
        Self {
            tree: PathTree::new(),
            versions: VersionStore::new(),
        }
    }
}

/// The VFS engine.
pub struct Engine {
    config: EngineConfig,
    endpoints: RwLock<HashMap<EndpointId, Arc<EndpointVfs>>>,
    fetcher: ContentFetcher,
    ops: OperationTracker,
}

impl Engine {
    /// Create an engine wired to its collaborators.
    pub fn new(
        config: EngineConfig,
        content: Arc<dyn ContentStore>,
        collector: Arc<dyn Collector>,
    ) -> Self {
        Self {
            config,
            endpoints: RwLock::new(HashMap::new()),
            fetcher: ContentFetcher::new(content),
            ops: OperationTracker::new(collector),
        }
    }

    /// Create an engine with default configuration.
    pub fn with_defaults(content: Arc<dyn ContentStore>, collector: Arc<dyn Collector>) -> Self {
        Self::new(EngineConfig::default(), content, collector)
    }

    /// Known endpoint ids, sorted.
    pub async fn endpoints(&self) -> Vec<EndpointId> {
        let endpoints = self.endpoints.read().await;
        let mut ids: Vec<EndpointId> = endpoints.keys().cloned().collect();
        ids.sort();
        ids
    }

    async fn endpoint(&self, id: &EndpointId) -> Result<Arc<EndpointVfs>, VfsError> {
        let endpoints = self.endpoints.read().await;
        endpoints
            .get(id)
            .cloned()
            .ok_or_else(|| VfsError::not_found(format!("endpoint {id}")))
    }

    async fn ensure_endpoint(&self, id: &EndpointId) -> Arc<EndpointVfs> {
        let mut endpoints = self.endpoints.write().await;
        endpoints
            .entry(id.clone())
            .or_insert_with(|| Arc::new(EndpointVfs::new()))
            .clone()
    }

    // --- Ingestion (collection-agent facing) ---

    /// Record one observed snapshot.
    ///
    /// Creates the endpoint namespace and missing ancestor directories
    /// as needed. An out-of-order snapshot is still appended to history;
    /// the returned `OutOfOrder` is informational and the latest pointer
    /// keeps its newest-timestamp definition.
    pub async fn ingest(
        &self,
        endpoint: &EndpointId,
        path: &VfsPath,
        kind: NodeKind,
        snapshot: Snapshot,
    ) -> Result<(), VfsError> {
        let vfs = self.ensure_endpoint(endpoint).await;
        vfs.tree.insert(path, kind).await?;

        match vfs.versions.put(path, snapshot.clone()).await {
            Ok(()) => {
                vfs.tree.set_latest(path, snapshot).await;
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Record a snapshot together with extended attributes.
    pub async fn ingest_with_attrs(
        &self,
        endpoint: &EndpointId,
        path: &VfsPath,
        kind: NodeKind,
        snapshot: Snapshot,
        attrs: BTreeMap<String, AttrValue>,
    ) -> Result<(), VfsError> {
        let result = self.ingest(endpoint, path, kind, snapshot).await;
        if let Ok(vfs) = self.endpoint(endpoint).await {
            vfs.tree.set_attrs(path, attrs).await;
        }
        result
    }

    /// Deliver a completion signal for a tracked operation. Idempotent;
    /// unknown ids are ignored.
    pub async fn complete_operation(&self, id: &OperationId) {
        self.ops.complete(id).await;
    }

    // --- Browsing ---

    /// Full record for one node, resolved at `at` (floor semantics) or
    /// at the latest snapshot.
    pub async fn get_file_details(
        &self,
        endpoint: &EndpointId,
        path: &VfsPath,
        at: Option<Timestamp>,
    ) -> Result<FileDetails, VfsError> {
        let vfs = self.endpoint(endpoint).await?;
        let node = vfs
            .tree
            .node(path)
            .await
            .ok_or_else(|| VfsError::not_found(format!("path {path}")))?;

        let snapshot = match at {
            Some(cutoff) => vfs.versions.latest_at_or_before(path, cutoff).await,
            None => vfs.versions.latest(path).await,
        };

        Ok(FileDetails {
            path: path.clone(),
            kind: node.kind,
            snapshot,
            attrs: node.attrs,
        })
    }

    /// Paginated, name-ordered children of a path.
    pub async fn list_files(
        &self,
        endpoint: &EndpointId,
        path: &VfsPath,
        opts: ListOptions,
    ) -> Result<Vec<FileEntry>, VfsError> {
        let vfs = self.endpoint(endpoint).await?;
        let clamped = ListOptions {
            count: Some(
                opts.count
                    .unwrap_or(self.config.max_page_size)
                    .min(self.config.max_page_size),
            ),
            ..opts
        };
        vfs.tree.children(path, &clamped).await
    }

    /// Children keyed by path string. With `include_directory_tree` the
    /// map also covers every ancestor along the way, so a client can
    /// render the whole expansion in one call.
    pub async fn browse(
        &self,
        endpoint: &EndpointId,
        path: &VfsPath,
        include_directory_tree: bool,
    ) -> Result<BTreeMap<String, Vec<FileEntry>>, VfsError> {
        let vfs = self.endpoint(endpoint).await?;
        if !vfs.tree.exists(path).await {
            return Err(VfsError::not_found(format!("path {path}")));
        }

        let mut map = BTreeMap::new();
        if include_directory_tree {
            for ancestor in path.ancestors() {
                let children = vfs.tree.children(&ancestor, &ListOptions::default()).await?;
                map.insert(ancestor.to_string(), children);
            }
        }
        let children = vfs.tree.children(path, &ListOptions::default()).await?;
        map.insert(path.to_string(), children);
        Ok(map)
    }

    /// All collection timestamps for a path, newest first.
    pub async fn get_file_version_times(
        &self,
        endpoint: &EndpointId,
        path: &VfsPath,
    ) -> Result<Vec<Timestamp>, VfsError> {
        let vfs = self.endpoint(endpoint).await?;
        if !vfs.tree.exists(path).await {
            return Err(VfsError::not_found(format!("path {path}")));
        }
        Ok(vfs.versions.version_times(path).await)
    }

    // --- Content reads ---

    /// Decode a byte range of a file's collected content.
    ///
    /// `length` is clamped to the configured text-read cap (and
    /// defaults to it); the returned total size tells the caller
    /// whether the text was truncated.
    pub async fn get_file_text(
        &self,
        endpoint: &EndpointId,
        path: &VfsPath,
        offset: u64,
        length: Option<u64>,
        encoding: Encoding,
        at: Option<Timestamp>,
    ) -> Result<TextSlice, VfsError> {
        let key = self.resolve_content_key(endpoint, path, at).await?;
        let length = Some(
            length
                .unwrap_or(self.config.max_text_read)
                .min(self.config.max_text_read),
        );
        self.fetcher.read_text(&key, offset, length, encoding).await
    }

    /// Read a raw byte range of a file's collected content.
    pub async fn get_file_blob(
        &self,
        endpoint: &EndpointId,
        path: &VfsPath,
        offset: u64,
        length: Option<u64>,
        at: Option<Timestamp>,
    ) -> Result<BlobSlice, VfsError> {
        let key = self.resolve_content_key(endpoint, path, at).await?;
        self.fetcher.read_blob(&key, offset, length).await
    }

    /// Resolve which collected version a read addresses.
    async fn resolve_content_key(
        &self,
        endpoint: &EndpointId,
        path: &VfsPath,
        at: Option<Timestamp>,
    ) -> Result<ContentKey, VfsError> {
        let vfs = self.endpoint(endpoint).await?;
        let snapshot = match at {
            Some(cutoff) => vfs.versions.latest_at_or_before(path, cutoff).await,
            None => vfs.versions.latest(path).await,
        }
        .ok_or_else(|| VfsError::not_found(format!("no collected version of {path}")))?;

        Ok(ContentKey::new(
            endpoint.clone(),
            path.clone(),
            snapshot.collected_at,
        ))
    }

    // --- Operations ---

    /// Start a subtree metadata refresh against the collection agent.
    ///
    /// The endpoint namespace is created if this is the first contact: a
    /// refresh is how an endpoint becomes known.
    pub async fn create_refresh_operation(
        &self,
        endpoint: &EndpointId,
        path: &VfsPath,
        max_depth: u32,
        notify_user: bool,
    ) -> Result<OperationId, VfsError> {
        self.ensure_endpoint(endpoint).await;
        self.ops
            .start_refresh(endpoint.clone(), path.clone(), max_depth, notify_user)
            .await
    }

    /// State of a refresh operation.
    pub async fn refresh_operation_state(
        &self,
        id: &OperationId,
    ) -> Result<OperationState, VfsError> {
        self.ops.state_of(id, OperationKind::Refresh).await
    }

    /// Start a single-file content re-collection. The path must already
    /// be known.
    pub async fn update_file_content(
        &self,
        endpoint: &EndpointId,
        path: &VfsPath,
    ) -> Result<OperationId, VfsError> {
        let vfs = self.endpoint(endpoint).await?;
        if !vfs.tree.exists(path).await {
            return Err(VfsError::not_found(format!("path {path}")));
        }
        self.ops
            .start_content_update(endpoint.clone(), path.clone())
            .await
    }

    /// State of a content-update operation.
    pub async fn content_update_state(
        &self,
        id: &OperationId,
    ) -> Result<OperationState, VfsError> {
        self.ops.state_of(id, OperationKind::ContentUpdate).await
    }

    /// The tracked record for an operation, if known.
    pub async fn operation_info(&self, id: &OperationId) -> Option<OperationInfo> {
        self.ops.info(id).await
    }

    // --- Derived views ---

    /// Chronological change events under a path.
    pub async fn timeline(
        &self,
        endpoint: &EndpointId,
        path: &VfsPath,
    ) -> Result<Vec<TimelineEvent>, VfsError> {
        let vfs = self.endpoint(endpoint).await?;
        TimelineBuilder::new(&vfs.tree, &vfs.versions)
            .build(path)
            .await
    }

    /// The timeline serialized for download.
    pub async fn timeline_csv(
        &self,
        endpoint: &EndpointId,
        path: &VfsPath,
        format: TimelineCsvFormat,
    ) -> Result<Vec<u8>, VfsError> {
        let vfs = self.endpoint(endpoint).await?;
        TimelineBuilder::new(&vfs.tree, &vfs.versions)
            .to_csv(path, format)
            .await
    }

    /// Archive the collected contents of a subtree.
    pub async fn files_archive(
        &self,
        endpoint: &EndpointId,
        path: &VfsPath,
        at: Option<Timestamp>,
        format: Option<ArchiveFormat>,
    ) -> Result<ArchiveBundle, VfsError> {
        let vfs = self.endpoint(endpoint).await?;
        let format = format.unwrap_or(self.config.default_archive_format);
        ArchiveExporter::new(&vfs.tree, &vfs.versions, &self.fetcher, endpoint)
            .export(path, at, format)
            .await
    }

    /// The closed set of text encodings reads accept.
    pub fn known_encodings() -> &'static [Encoding] {
        Encoding::ALL
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine").field("config", &self.config).finish()
    }
}

//! mirrorfs-engine: the core of mirrorfs.
//!
//! The engine maintains a versioned mirror of each remote endpoint's
//! filesystem and answers browse, read, timeline and export queries over
//! it. Collection agents feed it snapshots; it never touches an endpoint
//! directly.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                            Engine                               │
//! │  per endpoint:                      shared:                     │
//! │  ┌──────────────┐ ┌──────────────┐  ┌──────────────────────┐    │
//! │  │  PathTree    │ │ VersionStore │  │  ContentFetcher      │    │
//! │  │ (namespace)  │ │ (snapshots)  │  │  (ranges + codecs)   │    │
//! │  └──────────────┘ └──────────────┘  └──────────────────────┘    │
//! │  derived views:                     ┌──────────────────────┐    │
//! │  ┌──────────────┐ ┌──────────────┐  │  OperationTracker    │    │
//! │  │TimelineBuild.│ │ArchiveExport.│  │  (refresh/update)    │    │
//! │  └──────────────┘ └──────────────┘  └──────────────────────┘    │
//! └────────────┬──────────────────────────────────┬─────────────────┘
//!              │ ContentStore (byte ranges)       │ Collector (requests)
//!              ▼                                  ▼
//!        content collaborator             remote collection agent
//! ```
//!
//! The two collaborators are abstract: [`store::ContentStore`] serves
//! byte ranges keyed by `(endpoint, path, timestamp)`, and
//! [`store::Collector`] carries refresh/content-update requests to the
//! agent. Completion comes back through
//! [`Engine::complete_operation`], which tolerates at-least-once
//! delivery.

pub mod archive;
pub mod codec;
pub mod content;
pub mod engine;
pub mod ops;
pub mod store;
pub mod timeline;
pub mod tree;
pub mod version;

pub use archive::{ArchiveBundle, ArchiveExporter};
pub use content::{sha256_hex, BlobSlice, ContentFetcher, TextSlice};
pub use engine::{Engine, EngineConfig};
pub use ops::OperationTracker;
pub use store::{Collector, ContentKey, ContentSlice, ContentStore, MemoryContentStore};
pub use timeline::TimelineBuilder;
pub use tree::{ListOptions, NodeInfo, PathTree};
pub use version::VersionStore;

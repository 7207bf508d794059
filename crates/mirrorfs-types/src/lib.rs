//! Pure data types for mirrorfs.
//!
//! Everything a transport or storage layer needs to talk about the VFS
//! without pulling in the engine: paths, timestamps, stat snapshots,
//! operations, timeline events, the closed encoding enumeration and the
//! error taxonomy. No I/O, no async, no engine logic.

pub mod archive;
pub mod encoding;
pub mod endpoint;
pub mod entry;
pub mod error;
pub mod operation;
pub mod path;
pub mod stat;
pub mod time;
pub mod timeline;

pub use archive::{ArchiveFormat, ExportManifest, SkippedEntry};
pub use encoding::Encoding;
pub use endpoint::EndpointId;
pub use entry::{AttrValue, FileDetails, FileEntry, NodeKind};
pub use error::VfsError;
pub use operation::{OperationId, OperationInfo, OperationKind, OperationState};
pub use path::VfsPath;
pub use stat::{Snapshot, StatEntry};
pub use time::Timestamp;
pub use timeline::{TimelineAction, TimelineCsvFormat, TimelineEvent};

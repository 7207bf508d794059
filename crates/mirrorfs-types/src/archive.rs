//! Archive export records.

use serde::{Deserialize, Serialize};

use crate::path::VfsPath;
use crate::time::Timestamp;

/// Container format for subtree exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveFormat {
    /// ZIP with deflate compression.
    Zip,
    /// Gzip-compressed tar.
    TarGz,
}

impl ArchiveFormat {
    /// Conventional filename extension for the format.
    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveFormat::Zip => "zip",
            ArchiveFormat::TarGz => "tar.gz",
        }
    }
}

impl std::fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// A file left out of an export, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedEntry {
    pub path: VfsPath,
    pub reason: String,
}

/// Manifest of one archive export.
///
/// Exports degrade per file instead of failing outright: every file that
/// could not be included is recorded here, and the manifest itself ships
/// inside the archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportManifest {
    /// Subtree root the export was asked for.
    pub root: VfsPath,
    /// Point-in-time cut-off, if one was requested.
    pub cutoff: Option<Timestamp>,
    /// Archive-relative names of the files included.
    pub archived: Vec<String>,
    /// Files skipped, with reasons.
    pub skipped: Vec<SkippedEntry>,
}

impl ExportManifest {
    pub fn new(root: VfsPath, cutoff: Option<Timestamp>) -> Self {
        Self {
            root,
            cutoff,
            archived: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub fn record_archived(&mut self, name: impl Into<String>) {
        self.archived.push(name.into());
    }

    pub fn record_skipped(&mut self, path: VfsPath, reason: impl Into<String>) {
        self.skipped.push(SkippedEntry {
            path,
            reason: reason.into(),
        });
    }

    /// True when every file under the root made it into the archive.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

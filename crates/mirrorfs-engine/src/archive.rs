//! ArchiveExporter — subtree exports into ZIP or tar.gz containers.
//!
//! Exports degrade per file instead of failing: a file that was never
//! collected, or whose content the store cannot serve, becomes a skip
//! entry in the manifest and the export carries on. The manifest ships
//! inside the archive as `MANIFEST.json`, so a partial archive explains
//! itself.

use std::io::{Cursor, Write};

use flate2::write::GzEncoder;
use flate2::Compression;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use mirrorfs_types::{
    ArchiveFormat, EndpointId, ExportManifest, NodeKind, Timestamp, VfsError, VfsPath,
};

use crate::content::ContentFetcher;
use crate::store::ContentKey;
use crate::tree::PathTree;
use crate::version::VersionStore;

/// Name of the manifest entry inside every archive.
pub const MANIFEST_NAME: &str = "MANIFEST.json";

/// A finished export: the container bytes plus the manifest that is
/// also embedded in them.
pub struct ArchiveBundle {
    pub format: ArchiveFormat,
    pub bytes: Vec<u8>,
    pub manifest: ExportManifest,
}

impl std::fmt::Debug for ArchiveBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveBundle")
            .field("format", &self.format)
            .field("bytes", &self.bytes.len())
            .field("archived", &self.manifest.archived.len())
            .field("skipped", &self.manifest.skipped.len())
            .finish()
    }
}

/// Streams a subtree's collected contents into one archive.
pub struct ArchiveExporter<'a> {
    tree: &'a PathTree,
    versions: &'a VersionStore,
    fetcher: &'a ContentFetcher,
    endpoint: &'a EndpointId,
}

impl<'a> ArchiveExporter<'a> {
    pub fn new(
        tree: &'a PathTree,
        versions: &'a VersionStore,
        fetcher: &'a ContentFetcher,
        endpoint: &'a EndpointId,
    ) -> Self {
        Self {
            tree,
            versions,
            fetcher,
            endpoint,
        }
    }

    /// Export every file under `root`, resolving snapshots at or before
    /// `cutoff` (latest when `None`), preserving relative paths.
    pub async fn export(
        &self,
        root: &VfsPath,
        cutoff: Option<Timestamp>,
        format: ArchiveFormat,
    ) -> Result<ArchiveBundle, VfsError> {
        let nodes = self.tree.walk(root).await?;
        let mut manifest = ExportManifest::new(root.clone(), cutoff);
        let mut files: Vec<(String, Vec<u8>)> = Vec::new();

        for node in nodes.iter().filter(|n| n.kind == NodeKind::File) {
            let snapshot = match cutoff {
                Some(at) => self.versions.latest_at_or_before(&node.path, at).await,
                None => self.versions.latest(&node.path).await,
            };
            let Some(snapshot) = snapshot else {
                tracing::warn!(path = %node.path, "skipping file with no collected version");
                manifest.record_skipped(node.path.clone(), "no collected version");
                continue;
            };

            let key = ContentKey::new(
                self.endpoint.clone(),
                node.path.clone(),
                snapshot.collected_at,
            );
            match self.fetcher.read_blob(&key, 0, None).await {
                Ok(blob) => {
                    let name = archive_name(root, &node.path);
                    manifest.record_archived(name.clone());
                    files.push((name, blob.data));
                }
                Err(err) => {
                    tracing::warn!(path = %node.path, error = %err, "skipping unreadable file");
                    manifest.record_skipped(node.path.clone(), err.to_string());
                }
            }
        }

        let bytes = match format {
            ArchiveFormat::Zip => write_zip(&files, &manifest)?,
            ArchiveFormat::TarGz => write_tar_gz(&files, &manifest)?,
        };

        Ok(ArchiveBundle {
            format,
            bytes,
            manifest,
        })
    }
}

/// Archive-relative name for a path under the export root.
fn archive_name(root: &VfsPath, path: &VfsPath) -> String {
    match path.relative_to(root) {
        Some(rel) if !rel.is_empty() => rel,
        // Exporting a single file: use its bare name.
        _ => path.name().unwrap_or("root").to_string(),
    }
}

fn write_zip(files: &[(String, Vec<u8>)], manifest: &ExportManifest) -> Result<Vec<u8>, VfsError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, data) in files {
        writer
            .start_file(name.as_str(), options)
            .map_err(storage_err)?;
        writer.write_all(data).map_err(storage_err)?;
    }

    writer
        .start_file(MANIFEST_NAME, options)
        .map_err(storage_err)?;
    writer
        .write_all(&manifest_json(manifest)?)
        .map_err(storage_err)?;

    let cursor = writer.finish().map_err(storage_err)?;
    Ok(cursor.into_inner())
}

fn write_tar_gz(
    files: &[(String, Vec<u8>)],
    manifest: &ExportManifest,
) -> Result<Vec<u8>, VfsError> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for (name, data) in files {
        append_tar_entry(&mut builder, name, data)?;
    }
    append_tar_entry(&mut builder, MANIFEST_NAME, &manifest_json(manifest)?)?;

    let encoder = builder.into_inner().map_err(storage_err)?;
    encoder.finish().map_err(storage_err)
}

fn append_tar_entry(
    builder: &mut tar::Builder<GzEncoder<Vec<u8>>>,
    name: &str,
    data: &[u8],
) -> Result<(), VfsError> {
    let mut header = tar::Header::new_gnu();
    header.set_size(data.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder
        .append_data(&mut header, name, data)
        .map_err(storage_err)
}

fn manifest_json(manifest: &ExportManifest) -> Result<Vec<u8>, VfsError> {
    serde_json::to_vec_pretty(manifest).map_err(storage_err)
}

fn storage_err(err: impl std::fmt::Display) -> VfsError {
    VfsError::Storage(err.to_string())
}

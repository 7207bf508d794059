//! TimelineBuilder — chronological change events derived from history.
//!
//! Nothing is stored: every call re-derives events from the snapshot
//! history under a path, so the sequence is pure and restartable.
//! Between two consecutive snapshots of the same path:
//! - a content-hash change is a `MODIFICATION`,
//! - any other stat change is a `METADATA_CHANGED`,
//! - a bare re-collection is an `ACCESS`.
//!
//! The first snapshot of a path seeds the comparison and emits nothing.
//! Events are ordered by timestamp, ties broken by path.

use mirrorfs_types::{
    Snapshot, TimelineAction, TimelineCsvFormat, TimelineEvent, Timestamp, VfsError, VfsPath,
};

use crate::tree::PathTree;
use crate::version::VersionStore;

/// Derives timeline views for one endpoint.
pub struct TimelineBuilder<'a> {
    tree: &'a PathTree,
    versions: &'a VersionStore,
}

/// An event plus the snapshot that produced it, for stat-bearing
/// serializations.
struct TimelineRow {
    event: TimelineEvent,
    snapshot: Snapshot,
}

impl<'a> TimelineBuilder<'a> {
    pub fn new(tree: &'a PathTree, versions: &'a VersionStore) -> Self {
        Self { tree, versions }
    }

    /// All events under `path`, recursively for directories.
    ///
    /// Fails with `NotFound` for unknown paths; a known path with no
    /// history yields an empty sequence.
    pub async fn build(&self, path: &VfsPath) -> Result<Vec<TimelineEvent>, VfsError> {
        Ok(self.rows(path).await?.into_iter().map(|r| r.event).collect())
    }

    /// Serialize the timeline under `path`.
    pub async fn to_csv(
        &self,
        path: &VfsPath,
        format: TimelineCsvFormat,
    ) -> Result<Vec<u8>, VfsError> {
        let rows = self.rows(path).await?;
        let mut out = String::new();

        match format {
            TimelineCsvFormat::Native => {
                out.push_str("timestamp,datetime,message,timestamp_desc\n");
                for row in &rows {
                    out.push_str(&format!(
                        "{},{},{},{}\n",
                        row.event.timestamp.as_micros(),
                        row.event.timestamp,
                        csv_field(&row.event.path.to_string()),
                        row.event.action,
                    ));
                }
            }
            TimelineCsvFormat::Body => {
                for row in &rows {
                    let stat = &row.snapshot.stat;
                    out.push_str(&format!(
                        "{}|{}|0|{:o}|{}|{}|{}|{}|{}|{}|0\n",
                        row.snapshot.content_hash.as_deref().unwrap_or("0"),
                        row.event.path,
                        stat.mode,
                        stat.uid,
                        stat.gid,
                        stat.size,
                        secs_or_zero(stat.atime),
                        secs_or_zero(stat.mtime),
                        secs_or_zero(stat.ctime),
                    ));
                }
            }
        }
        Ok(out.into_bytes())
    }

    async fn rows(&self, path: &VfsPath) -> Result<Vec<TimelineRow>, VfsError> {
        let nodes = self.tree.walk(path).await?;

        let mut rows = Vec::new();
        for node in &nodes {
            let history = self.versions.history(&node.path).await;
            for pair in history.windows(2) {
                let (prev, cur) = (&pair[0], &pair[1]);
                rows.push(TimelineRow {
                    event: TimelineEvent {
                        timestamp: cur.collected_at,
                        path: node.path.clone(),
                        action: classify(prev, cur),
                    },
                    snapshot: cur.clone(),
                });
            }
        }

        rows.sort_by(|a, b| {
            (a.event.timestamp, &a.event.path).cmp(&(b.event.timestamp, &b.event.path))
        });
        Ok(rows)
    }
}

fn classify(prev: &Snapshot, cur: &Snapshot) -> TimelineAction {
    if cur.content_hash.is_some() && cur.content_hash != prev.content_hash {
        TimelineAction::Modification
    } else if cur.stat != prev.stat {
        TimelineAction::MetadataChanged
    } else {
        TimelineAction::Access
    }
}

fn secs_or_zero(ts: Option<Timestamp>) -> i64 {
    ts.map(|t| t.as_secs()).unwrap_or(0)
}

/// Quote a CSV field when it needs it.
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mirrorfs_types::{NodeKind, StatEntry};

    fn p(s: &str) -> VfsPath {
        VfsPath::parse(s).unwrap()
    }

    fn snap(secs: i64, size: u64, hash: Option<&str>) -> Snapshot {
        let mut snapshot = Snapshot::new(Timestamp::from_secs(secs), StatEntry::file(size));
        if let Some(hash) = hash {
            snapshot = snapshot.with_content(hash, size);
        }
        snapshot
    }

    async fn fixture() -> (PathTree, VersionStore) {
        (PathTree::new(), VersionStore::new())
    }

    async fn ingest(
        tree: &PathTree,
        versions: &VersionStore,
        path: &VfsPath,
        snapshot: Snapshot,
    ) {
        tree.insert(path, NodeKind::File).await.unwrap();
        let _ = versions.put(path, snapshot).await;
    }

    #[tokio::test]
    async fn hash_change_is_one_modification() {
        let (tree, versions) = fixture().await;
        let path = p("/fs/os/etc/hosts");
        ingest(&tree, &versions, &path, snap(1, 10, Some("aa"))).await;
        ingest(&tree, &versions, &path, snap(2, 12, Some("bb"))).await;

        let events = TimelineBuilder::new(&tree, &versions)
            .build(&p("/fs/os"))
            .await
            .unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action, TimelineAction::Modification);
        assert_eq!(events[0].timestamp, Timestamp::from_secs(2));
        assert_eq!(events[0].path, path);
    }

    #[tokio::test]
    async fn bare_recollection_is_access() {
        let (tree, versions) = fixture().await;
        let path = p("/f");
        ingest(&tree, &versions, &path, snap(1, 10, Some("aa"))).await;
        ingest(&tree, &versions, &path, snap(2, 10, Some("aa"))).await;

        let events = TimelineBuilder::new(&tree, &versions)
            .build(&path)
            .await
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action, TimelineAction::Access);
    }

    #[tokio::test]
    async fn stat_change_without_hash_change_is_metadata() {
        let (tree, versions) = fixture().await;
        let path = p("/f");
        ingest(&tree, &versions, &path, snap(1, 10, Some("aa"))).await;
        let mut changed = snap(2, 10, Some("aa"));
        changed.stat.mode = 0o100600;
        ingest(&tree, &versions, &path, changed).await;

        let events = TimelineBuilder::new(&tree, &versions)
            .build(&path)
            .await
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action, TimelineAction::MetadataChanged);
    }

    #[tokio::test]
    async fn metadata_only_histories_compare_stats() {
        let (tree, versions) = fixture().await;
        let path = p("/f");
        ingest(&tree, &versions, &path, snap(1, 10, None)).await;
        ingest(&tree, &versions, &path, snap(2, 20, None)).await;
        ingest(&tree, &versions, &path, snap(3, 20, None)).await;

        let events = TimelineBuilder::new(&tree, &versions)
            .build(&path)
            .await
            .unwrap();
        let actions: Vec<TimelineAction> = events.iter().map(|e| e.action).collect();
        assert_eq!(
            actions,
            vec![TimelineAction::MetadataChanged, TimelineAction::Access]
        );
    }

    #[tokio::test]
    async fn events_sorted_by_time_then_path() {
        let (tree, versions) = fixture().await;
        let beta = p("/dir/beta");
        let alpha = p("/dir/alpha");
        for path in [&beta, &alpha] {
            ingest(&tree, &versions, path, snap(1, 1, Some("x"))).await;
            ingest(&tree, &versions, path, snap(5, 2, Some("y"))).await;
        }
        ingest(&tree, &versions, &alpha, snap(9, 3, Some("z"))).await;

        let events = TimelineBuilder::new(&tree, &versions)
            .build(&p("/dir"))
            .await
            .unwrap();

        let keys: Vec<(i64, String)> = events
            .iter()
            .map(|e| (e.timestamp.as_secs(), e.path.to_string()))
            .collect();
        assert_eq!(
            keys,
            vec![
                (5, "/dir/alpha".to_string()),
                (5, "/dir/beta".to_string()),
                (9, "/dir/alpha".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn single_snapshot_emits_nothing() {
        let (tree, versions) = fixture().await;
        let path = p("/f");
        ingest(&tree, &versions, &path, snap(1, 1, Some("x"))).await;

        let events = TimelineBuilder::new(&tree, &versions)
            .build(&path)
            .await
            .unwrap();
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let (tree, versions) = fixture().await;
        let err = TimelineBuilder::new(&tree, &versions)
            .build(&p("/nope"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn rebuilding_gives_the_same_sequence() {
        let (tree, versions) = fixture().await;
        let path = p("/f");
        ingest(&tree, &versions, &path, snap(1, 1, Some("x"))).await;
        ingest(&tree, &versions, &path, snap(2, 2, Some("y"))).await;

        let builder = TimelineBuilder::new(&tree, &versions);
        let first = builder.build(&path).await.unwrap();
        let second = builder.build(&path).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn native_csv_has_header_and_rows() {
        let (tree, versions) = fixture().await;
        let path = p("/f");
        ingest(&tree, &versions, &path, snap(1, 1, Some("x"))).await;
        ingest(&tree, &versions, &path, snap(2, 2, Some("y"))).await;

        let csv = TimelineBuilder::new(&tree, &versions)
            .to_csv(&path, TimelineCsvFormat::Native)
            .await
            .unwrap();
        let text = String::from_utf8(csv).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "timestamp,datetime,message,timestamp_desc");
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("2000000,"));
        assert!(lines[1].ends_with(",MODIFICATION"));
        assert!(lines[1].contains("/f"));
    }

    #[tokio::test]
    async fn body_csv_is_pipe_separated() {
        let (tree, versions) = fixture().await;
        let path = p("/f");
        ingest(&tree, &versions, &path, snap(1, 1, Some("aa"))).await;
        ingest(&tree, &versions, &path, snap(2, 64, Some("bb"))).await;

        let csv = TimelineBuilder::new(&tree, &versions)
            .to_csv(&path, TimelineCsvFormat::Body)
            .await
            .unwrap();
        let text = String::from_utf8(csv).unwrap();
        let fields: Vec<&str> = text.trim_end().split('|').collect();

        assert_eq!(fields.len(), 11);
        assert_eq!(fields[0], "bb");
        assert_eq!(fields[1], "/f");
        assert_eq!(fields[3], "100644");
        assert_eq!(fields[6], "64");
    }

    #[test]
    fn csv_field_quotes_when_needed() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}

//! Timeline derivation and archive export, end to end.

use std::io::{Cursor, Read, Write};

use mirrorfs_engine::archive::MANIFEST_NAME;
use mirrorfs_testutil::{ingest_file, parse, seeded_engine, HOSTS_V1, HOSTS_V2, T2};
use mirrorfs_types::{
    ArchiveFormat, ExportManifest, TimelineAction, TimelineCsvFormat, Timestamp,
};

#[tokio::test]
async fn one_hash_change_yields_one_modification() {
    let vfs = seeded_engine().await;
    let events = vfs
        .engine
        .timeline(&vfs.endpoint, &parse("/fs/os/etc/hosts"))
        .await
        .unwrap();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].action, TimelineAction::Modification);
    assert_eq!(events[0].timestamp, T2);
}

#[tokio::test]
async fn directory_timeline_is_sorted_with_path_tiebreak() {
    let vfs = seeded_engine().await;
    // Give passwd a second version at the same instant as hosts' change.
    ingest_file(
        &vfs.engine,
        &vfs.content,
        &vfs.endpoint,
        "/fs/os/etc/passwd",
        T2,
        b"root:x:0:0:root:/root:/bin/sh\n",
    )
    .await;

    let events = vfs
        .engine
        .timeline(&vfs.endpoint, &parse("/fs/os"))
        .await
        .unwrap();

    assert!(events
        .windows(2)
        .all(|w| w[0].timestamp <= w[1].timestamp));
    let ties: Vec<&str> = events
        .iter()
        .filter(|e| e.timestamp == T2)
        .map(|e| e.path.name().unwrap())
        .collect();
    assert_eq!(ties, vec!["hosts", "passwd"]);
}

#[tokio::test]
async fn timeline_of_quiet_subtree_is_empty() {
    let vfs = seeded_engine().await;
    let events = vfs
        .engine
        .timeline(&vfs.endpoint, &parse("/fs/os/var"))
        .await
        .unwrap();
    assert!(events.is_empty());
}

#[tokio::test]
async fn native_csv_lists_the_modification() {
    let vfs = seeded_engine().await;
    let csv = vfs
        .engine
        .timeline_csv(&vfs.endpoint, &parse("/fs/os"), TimelineCsvFormat::Native)
        .await
        .unwrap();
    let text = String::from_utf8(csv).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "timestamp,datetime,message,timestamp_desc");
    assert_eq!(lines.len(), 2);
    assert!(lines[1].contains("/fs/os/etc/hosts"));
    assert!(lines[1].ends_with("MODIFICATION"));
}

#[tokio::test]
async fn body_csv_carries_stat_columns() {
    let vfs = seeded_engine().await;
    let csv = vfs
        .engine
        .timeline_csv(&vfs.endpoint, &parse("/fs/os"), TimelineCsvFormat::Body)
        .await
        .unwrap();
    let text = String::from_utf8(csv).unwrap();
    let fields: Vec<&str> = text.trim_end().split('|').collect();

    assert_eq!(fields.len(), 11);
    assert_eq!(fields[1], "/fs/os/etc/hosts");
    assert_eq!(fields[6], HOSTS_V2.len().to_string());
}

#[tokio::test]
async fn archive_of_fully_collected_subtree_round_trips() {
    let vfs = seeded_engine().await;
    let bundle = vfs
        .engine
        .files_archive(&vfs.endpoint, &parse("/fs/os/etc"), None, None)
        .await
        .unwrap();

    assert!(bundle.manifest.is_complete());
    assert_eq!(bundle.manifest.archived, vec!["hosts", "passwd"]);

    let mut archive = zip::ZipArchive::new(Cursor::new(bundle.bytes)).unwrap();
    for name in ["hosts", "passwd"] {
        let mut data = Vec::new();
        archive.by_name(name).unwrap().read_to_end(&mut data).unwrap();

        let blob = vfs
            .engine
            .get_file_blob(
                &vfs.endpoint,
                &parse(&format!("/fs/os/etc/{name}")),
                0,
                None,
                None,
            )
            .await
            .unwrap();
        assert_eq!(data, blob.data, "archived bytes differ for {name}");
    }
}

#[tokio::test]
async fn archive_manifest_reports_metadata_only_files() {
    let vfs = seeded_engine().await;
    let bundle = vfs
        .engine
        .files_archive(&vfs.endpoint, &parse("/fs/os"), None, None)
        .await
        .unwrap();

    assert_eq!(bundle.manifest.archived.len(), 2);
    assert_eq!(bundle.manifest.skipped.len(), 1);
    assert_eq!(
        bundle.manifest.skipped[0].path.to_string(),
        "/fs/os/var/log/syslog"
    );

    // The embedded manifest says the same thing.
    let mut archive = zip::ZipArchive::new(Cursor::new(bundle.bytes)).unwrap();
    let mut json = String::new();
    archive
        .by_name(MANIFEST_NAME)
        .unwrap()
        .read_to_string(&mut json)
        .unwrap();
    let embedded: ExportManifest = serde_json::from_str(&json).unwrap();
    assert_eq!(embedded, bundle.manifest);
}

#[tokio::test]
async fn archive_cutoff_exports_the_old_version() {
    let vfs = seeded_engine().await;
    let bundle = vfs
        .engine
        .files_archive(
            &vfs.endpoint,
            &parse("/fs/os/etc/hosts"),
            Some(Timestamp::from_secs(1_500)),
            None,
        )
        .await
        .unwrap();

    let mut archive = zip::ZipArchive::new(Cursor::new(bundle.bytes)).unwrap();
    let mut data = Vec::new();
    archive
        .by_name("hosts")
        .unwrap()
        .read_to_end(&mut data)
        .unwrap();
    assert_eq!(data, HOSTS_V1);
}

#[tokio::test]
async fn tar_gz_archive_extracts_with_paths_preserved() {
    let vfs = seeded_engine().await;
    let bundle = vfs
        .engine
        .files_archive(
            &vfs.endpoint,
            &parse("/fs/os"),
            None,
            Some(ArchiveFormat::TarGz),
        )
        .await
        .unwrap();
    assert_eq!(bundle.format, ArchiveFormat::TarGz);

    let decoder = flate2::read::GzDecoder::new(Cursor::new(bundle.bytes));
    let mut archive = tar::Archive::new(decoder);
    let mut found = Vec::new();
    for entry in archive.entries().unwrap() {
        let mut entry = entry.unwrap();
        let name = entry.path().unwrap().to_string_lossy().into_owned();
        if name == "etc/hosts" {
            let mut data = Vec::new();
            entry.read_to_end(&mut data).unwrap();
            assert_eq!(data, HOSTS_V2);
        }
        found.push(name);
    }
    found.sort();
    assert_eq!(found, vec![MANIFEST_NAME.to_string(), "etc/hosts".into(), "etc/passwd".into()]);
}

#[tokio::test]
async fn zip_archive_survives_a_disk_round_trip() {
    let vfs = seeded_engine().await;
    let bundle = vfs
        .engine
        .files_archive(&vfs.endpoint, &parse("/fs/os/etc"), None, None)
        .await
        .unwrap();

    let mut file = tempfile::tempfile().unwrap();
    file.write_all(&bundle.bytes).unwrap();

    let mut archive = zip::ZipArchive::new(file).unwrap();
    assert_eq!(archive.len(), 3); // hosts, passwd, MANIFEST.json
    let mut content = String::new();
    archive
        .by_name("hosts")
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    assert_eq!(content.as_bytes(), HOSTS_V2);
}

#[tokio::test]
async fn timeline_rebuild_is_stable_after_archiving() {
    let vfs = seeded_engine().await;
    let before = vfs
        .engine
        .timeline(&vfs.endpoint, &parse("/fs/os"))
        .await
        .unwrap();

    vfs.engine
        .files_archive(&vfs.endpoint, &parse("/fs/os"), None, None)
        .await
        .unwrap();

    let after = vfs
        .engine
        .timeline(&vfs.endpoint, &parse("/fs/os"))
        .await
        .unwrap();
    assert_eq!(before, after);
}

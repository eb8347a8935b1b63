//! Checksum reconciliation tests
//!
//! Drift detection, directional sync, and recalculation across the
//! frontmatter and sidecar stores.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use vaultline::checksum::{
    digest_bytes, ChecksumField, ChecksumSync, DriftStatus, SyncError, SyncSource,
};

const BODY: &str = "# Title\n\nSome content here.\n";

fn write_artifact(dir: &Path, name: &str, embedded: Option<&str>) -> PathBuf {
    let path = dir.join(name);
    let block = match embedded {
        Some(value) => format!("---\ntitle: Artifact\nchecksum_sha256: {value}\nowner: docs\n---\n"),
        None => "---\ntitle: Artifact\nowner: docs\n---\n".to_string(),
    };
    fs::write(&path, format!("{block}{BODY}")).unwrap();
    path
}

fn write_sidecar(path: &Path, checksum: &str) -> PathBuf {
    let sidecar = ChecksumSync::sidecar_path(path);
    fs::write(
        &sidecar,
        format!(
            "{{\n  \"vault_id\": \"vault://Demo/Doc/v1.0\",\n  \"version\": \"1.0.0\",\n  \"checksum_sha256\": \"{checksum}\"\n}}\n"
        ),
    )
    .unwrap();
    sidecar
}

fn body_digest() -> String {
    digest_bytes(BODY.as_bytes())
}

#[test]
fn test_matching_copies_are_clean() {
    let dir = TempDir::new().unwrap();
    let digest = body_digest();
    let path = write_artifact(dir.path(), "doc.md", Some(&digest));
    write_sidecar(&path, &digest);

    let report = ChecksumSync::new().detect_drift(&path).unwrap();
    assert!(!report.has_drift());
    assert!(report.is_correct());
    assert_eq!(report.computed, digest);
}

#[test]
fn test_drift_between_present_copies() {
    let dir = TempDir::new().unwrap();
    let path = write_artifact(dir.path(), "doc.md", Some(&"a".repeat(64)));
    write_sidecar(&path, &"b".repeat(64));

    let report = ChecksumSync::new().detect_drift(&path).unwrap();
    assert!(report.has_drift());
    assert_eq!(report.status(), DriftStatus::Drift);
}

#[test]
fn test_single_present_matching_copy_is_correct() {
    // A missing copy does not make the artifact incorrect
    let dir = TempDir::new().unwrap();
    let path = write_artifact(dir.path(), "doc.md", None);
    write_sidecar(&path, &body_digest());

    let report = ChecksumSync::new().detect_drift(&path).unwrap();
    assert!(!report.has_drift());
    assert!(report.is_correct());
    assert_eq!(report.frontmatter, None);
}

#[test]
fn test_stale_embedded_copy_is_incorrect() {
    let dir = TempDir::new().unwrap();
    let path = write_artifact(dir.path(), "doc.md", Some(&"a".repeat(64)));

    let report = ChecksumSync::new().detect_drift(&path).unwrap();
    assert!(!report.has_drift());
    assert!(!report.is_correct());
}

#[test]
fn test_pending_placeholder_is_recognized() {
    let dir = TempDir::new().unwrap();
    let path = write_artifact(dir.path(), "doc.md", Some("pending"));

    let report = ChecksumSync::new().detect_drift(&path).unwrap();
    assert_eq!(report.frontmatter, Some(ChecksumField::Pending));
    assert!(!report.has_drift());
    assert!(report.is_correct());
    assert_eq!(report.status(), DriftStatus::Pending);
}

#[test]
fn test_sync_frontmatter_to_sidecar() {
    let dir = TempDir::new().unwrap();
    let digest = "1".repeat(64);
    let path = write_artifact(dir.path(), "doc.md", Some(&digest));
    let sidecar = write_sidecar(&path, &"2".repeat(64));

    ChecksumSync::new()
        .sync(&path, SyncSource::Frontmatter)
        .unwrap();

    let record: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&sidecar).unwrap()).unwrap();
    assert_eq!(record["checksum_sha256"], digest);
    // Other sidecar fields survive the rewrite
    assert_eq!(record["vault_id"], "vault://Demo/Doc/v1.0");
    assert_eq!(record["version"], "1.0.0");
}

#[test]
fn test_sync_sidecar_to_frontmatter_preserves_block() {
    let dir = TempDir::new().unwrap();
    let digest = "3".repeat(64);
    let path = write_artifact(dir.path(), "doc.md", Some(&"4".repeat(64)));
    write_sidecar(&path, &digest);

    ChecksumSync::new().sync(&path, SyncSource::Sidecar).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    // Field order and surrounding lines are untouched
    assert!(content.starts_with("---\ntitle: Artifact\nchecksum_sha256: "));
    assert!(content.contains(&format!("checksum_sha256: {digest}\nowner: docs\n---\n")));
    assert!(content.ends_with(BODY));
}

#[test]
fn test_sync_inserts_field_when_absent() {
    let dir = TempDir::new().unwrap();
    let digest = "5".repeat(64);
    let path = write_artifact(dir.path(), "doc.md", None);
    write_sidecar(&path, &digest);

    ChecksumSync::new().sync(&path, SyncSource::Sidecar).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    // Inserted at the end of the block, next to the other metadata
    assert!(content.contains(&format!("owner: docs\nchecksum_sha256: {digest}\n---\n")));
}

#[test]
fn test_sync_requires_source_value() {
    let dir = TempDir::new().unwrap();
    let path = write_artifact(dir.path(), "doc.md", None);

    for source in [SyncSource::Frontmatter, SyncSource::Sidecar] {
        let err = ChecksumSync::new().sync(&path, source).unwrap_err();
        assert!(matches!(err, SyncError::MissingSource { .. }));
    }
}

#[test]
fn test_recalculate_resolves_drift() {
    let dir = TempDir::new().unwrap();
    let path = write_artifact(dir.path(), "doc.md", Some(&"a".repeat(64)));
    write_sidecar(&path, &"b".repeat(64));

    let digest = ChecksumSync::new().recalculate(&path).unwrap();
    assert_eq!(digest, body_digest());

    let report = ChecksumSync::new().detect_drift(&path).unwrap();
    assert!(!report.has_drift());
    assert!(report.is_correct());
    assert_eq!(report.status(), DriftStatus::Ok);
}

#[test]
fn test_recalculate_digest_excludes_metadata_block() {
    // Two documents with different frontmatter but the same body get the
    // same recalculated digest
    let dir = TempDir::new().unwrap();
    let first = write_artifact(dir.path(), "first.md", Some("pending"));
    let second = write_artifact(dir.path(), "second.md", None);

    let tool = ChecksumSync::new();
    assert_eq!(
        tool.recalculate(&first).unwrap(),
        tool.recalculate(&second).unwrap()
    );
}

#[test]
fn test_recalculate_non_markdown_writes_sidecar_only() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.bin");
    fs::write(&path, [0u8, 1, 2, 3]).unwrap();

    let digest = ChecksumSync::new().recalculate(&path).unwrap();
    assert_eq!(digest, digest_bytes(&[0u8, 1, 2, 3]));

    assert_eq!(fs::read(&path).unwrap(), vec![0u8, 1, 2, 3]);
    let sidecar = ChecksumSync::sidecar_path(&path);
    let record: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&sidecar).unwrap()).unwrap();
    assert_eq!(record["checksum_sha256"], digest);
}

#[test]
fn test_dry_run_previews_without_writing() {
    let dir = TempDir::new().unwrap();
    let path = write_artifact(dir.path(), "doc.md", Some(&"a".repeat(64)));
    let before = fs::read_to_string(&path).unwrap();

    let tool = ChecksumSync::dry_run();
    let digest = tool.recalculate(&path).unwrap();
    assert_eq!(digest, body_digest());

    assert_eq!(fs::read_to_string(&path).unwrap(), before);
    assert!(!ChecksumSync::sidecar_path(&path).exists());
}

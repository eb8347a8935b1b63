//! Sidecar lineage sources
//!
//! One `.sidecar.json` per artifact, consumed (never produced) by the
//! graph builder. All fields are optional and unknown fields pass
//! through; a record without a vault id falls back to the file name
//! minus the sidecar suffix as its node key.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::LineageGraph;
use crate::SIDECAR_SUFFIX;

/// Errors for graph construction from sidecar sources
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Sidecar file not found: {}", .0.display())]
    SidecarNotFound(PathBuf),

    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Lineage block of a sidecar record
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SidecarLineage {
    #[serde(default)]
    pub predecessors: Vec<String>,

    #[serde(default)]
    pub successors: Vec<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A sidecar record as found on disk
#[derive(Debug, Clone, Deserialize)]
pub struct SidecarRecord {
    #[serde(default)]
    pub vault_id: Option<String>,

    #[serde(default)]
    pub checksum_sha256: Option<String>,

    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub timestamp: Option<String>,

    #[serde(default)]
    pub lineage: SidecarLineage,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl SidecarRecord {
    /// Node key for this record: the vault id when present and non-empty,
    /// otherwise the file name with the sidecar suffix stripped.
    pub fn node_key(&self, path: &Path) -> String {
        if let Some(vault_id) = self.vault_id.as_deref() {
            if !vault_id.is_empty() {
                return vault_id.to_string();
            }
        }
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        name.strip_suffix(SIDECAR_SUFFIX).unwrap_or(&name).to_string()
    }
}

/// Result of a directory scan. Per-file failures never abort the scan;
/// they are collected so callers can assert on what was skipped.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Number of sidecar files merged into the graph
    pub loaded: usize,

    /// Files that could not be read or parsed
    pub skipped: Vec<SkippedSidecar>,
}

/// A sidecar file excluded from the scan, with the reason
#[derive(Debug)]
pub struct SkippedSidecar {
    pub path: PathBuf,
    pub reason: String,
}

/// Parse one sidecar file and merge it into the graph. Returns the node
/// key it declared.
pub fn load_sidecar(graph: &mut LineageGraph, path: &Path) -> Result<String, GraphError> {
    if !path.exists() {
        return Err(GraphError::SidecarNotFound(path.to_path_buf()));
    }
    let record: SidecarRecord = serde_json::from_str(&fs::read_to_string(path)?)?;
    let key = record.node_key(path);

    let node = graph.declare(&key);
    for (field, value) in [
        ("vault_id", &record.vault_id),
        ("checksum", &record.checksum_sha256),
        ("version", &record.version),
        ("timestamp", &record.timestamp),
    ] {
        if let Some(value) = value {
            if !value.is_empty() {
                node.metadata.insert(field.to_string(), value.clone());
            }
        }
    }

    for predecessor in &record.lineage.predecessors {
        graph.add_edge(predecessor, &key);
    }
    for successor in &record.lineage.successors {
        graph.add_edge(&key, successor);
    }

    Ok(key)
}

/// Recursively scan a directory for `*.sidecar.json` files and merge them
/// all into the graph. Read-only and idempotent with respect to the
/// filesystem; rebuild the graph before rescanning.
pub fn scan_directory(graph: &mut LineageGraph, dir: &Path) -> Result<ScanOutcome, GraphError> {
    if !dir.is_dir() {
        return Err(GraphError::DirectoryNotFound(dir.to_path_buf()));
    }

    let mut outcome = ScanOutcome::default();

    for entry in walkdir::WalkDir::new(dir)
        .follow_links(false)
        .sort_by(|a, b| a.file_name().cmp(b.file_name()))
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| dir.to_path_buf());
                outcome.skipped.push(SkippedSidecar {
                    path,
                    reason: err.to_string(),
                });
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if !entry.file_name().to_string_lossy().ends_with(SIDECAR_SUFFIX) {
            continue;
        }

        match load_sidecar(graph, entry.path()) {
            Ok(_) => outcome.loaded += 1,
            Err(err) => outcome.skipped.push(SkippedSidecar {
                path: entry.path().to_path_buf(),
                reason: err.to_string(),
            }),
        }
    }

    Ok(outcome)
}

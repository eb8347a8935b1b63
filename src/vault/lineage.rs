//! Lineage chain records (lineage_graph.json)
//!
//! Per-artifact predecessor/successor links. An artifact with no
//! predecessor is a root; with no successor, a leaf.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::VaultError;

/// Lineage file name within a vault directory
pub const LINEAGE_FILE: &str = "lineage_graph.json";

/// Lineage relationship for one artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineageChain {
    /// The artifact this chain entry belongs to
    pub artifact_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predecessor: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub successor: Option<String>,

    /// Set when this artifact forked off another line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_point: Option<String>,

    /// Set when this artifact merged two lines
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_point: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl LineageChain {
    pub fn new(artifact_id: &str) -> Self {
        Self {
            artifact_id: artifact_id.to_string(),
            predecessor: None,
            successor: None,
            branch_point: None,
            merge_point: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.predecessor.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.successor.is_none()
    }

    pub fn is_fork(&self) -> bool {
        self.branch_point.is_some()
    }

    pub fn is_merge(&self) -> bool {
        self.merge_point.is_some()
    }
}

/// Load the lineage map, or an empty one if the file is absent.
pub fn load_chains(path: &Path) -> Result<BTreeMap<String, LineageChain>, VaultError> {
    if path.exists() {
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    } else {
        Ok(BTreeMap::new())
    }
}

/// Write the lineage map atomically, pretty-printed with a trailing newline.
pub fn save_chains(path: &Path, chains: &BTreeMap<String, LineageChain>) -> Result<(), VaultError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut json = serde_json::to_string_pretty(chains)?;
    json.push('\n');
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, json)?;
    fs::rename(&temp_path, path)?;
    Ok(())
}

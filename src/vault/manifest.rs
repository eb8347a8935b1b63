//! Vault manifest (vault_manifest.json)
//!
//! Persistent mapping from artifact identifier to file location,
//! registration timestamp, metadata, and checksum, plus a top-level
//! checksums map. Rewritten in full (pretty-printed, trailing newline)
//! on every mutation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::VaultError;

/// Manifest file name within a vault directory
pub const MANIFEST_FILE: &str = "vault_manifest.json";

/// Manifest format version
pub const VAULT_VERSION: &str = "1.0";

/// A registered artifact entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    /// Path to the artifact file as given at registration
    pub file_path: String,

    /// When the artifact was registered
    pub registered_at: DateTime<Utc>,

    /// Free-form caller metadata
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, Value>,

    /// Canonical-text digest recorded at registration
    pub checksum: String,

    /// Unknown fields from richer manifests, passed through verbatim
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// The vault manifest document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaultManifest {
    /// Manifest format version
    pub vault_version: String,

    /// When the vault was first initialized
    pub created_at: DateTime<Utc>,

    /// Registered artifacts keyed by identifier string
    #[serde(default)]
    pub artifacts: BTreeMap<String, ArtifactRecord>,

    /// Identifier to digest map, kept alongside the per-record copies
    #[serde(default)]
    pub checksums: BTreeMap<String, String>,

    /// Unknown top-level fields, passed through verbatim
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl VaultManifest {
    /// Create an empty manifest.
    pub fn new() -> Self {
        Self {
            vault_version: VAULT_VERSION.to_string(),
            created_at: Utc::now(),
            artifacts: BTreeMap::new(),
            checksums: BTreeMap::new(),
            extra: BTreeMap::new(),
        }
    }

    /// Load the manifest, or initialize an empty one if the file is absent.
    pub fn load_or_init(path: &Path) -> Result<Self, VaultError> {
        if path.exists() {
            Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
        } else {
            Ok(Self::new())
        }
    }

    /// Serialize to pretty JSON with a trailing newline.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    /// Write atomically (write-then-rename), creating the vault directory
    /// if needed.
    pub fn save(&self, path: &Path) -> Result<(), VaultError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, self.to_json()?)?;
        fs::rename(&temp_path, path)?;
        Ok(())
    }
}

impl Default for VaultManifest {
    fn default() -> Self {
        Self::new()
    }
}

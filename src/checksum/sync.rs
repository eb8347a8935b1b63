//! Checksum reconciliation
//!
//! Keeps the embedded frontmatter checksum and the `.sidecar.json`
//! checksum for the same artifact consistent: detects drift between the
//! two copies, syncs either direction verbatim, or recomputes from
//! content and rewrites both. Neither copy is authoritative except under
//! `recalculate`.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::engine::{self, ChecksumError};
use super::frontmatter::{self, ChecksumField};
use crate::SIDECAR_SUFFIX;

/// Which redundant copy to treat as the sync source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncSource {
    /// The embedded metadata-block field
    Frontmatter,
    /// The external sidecar record
    Sidecar,
}

impl fmt::Display for SyncSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncSource::Frontmatter => write!(f, "frontmatter"),
            SyncSource::Sidecar => write!(f, "sidecar"),
        }
    }
}

/// Errors for reconciliation operations
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("No {which} checksum to sync from for {}", .path.display())]
    MissingSource { path: PathBuf, which: SyncSource },

    #[error("No metadata block in {}", .0.display())]
    NoMetadataBlock(PathBuf),

    #[error("Checksum error: {0}")]
    Checksum(#[from] ChecksumError),

    #[error("Sidecar JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Per-artifact drift snapshot: the two stored copies plus the digest
/// freshly recomputed from content.
#[derive(Debug, Clone)]
pub struct DriftReport {
    pub path: PathBuf,
    pub frontmatter: Option<ChecksumField>,
    pub sidecar: Option<String>,
    pub computed: String,
}

/// Classified drift state for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriftStatus {
    Ok,
    Drift,
    Incorrect,
    Pending,
}

impl DriftReport {
    /// True iff both copies hold concrete digests and they differ.
    /// A `pending` placeholder never participates in drift comparison.
    pub fn has_drift(&self) -> bool {
        match (&self.frontmatter, &self.sidecar) {
            (Some(field), Some(sidecar)) => field
                .digest()
                .map(|digest| digest != sidecar)
                .unwrap_or(false),
            _ => false,
        }
    }

    /// True iff every present concrete copy equals the recomputed digest.
    /// A missing copy does not make the artifact incorrect; neither does
    /// a `pending` placeholder, which is never verified.
    pub fn is_correct(&self) -> bool {
        let frontmatter_ok = match &self.frontmatter {
            Some(field) => field.digest().map(|d| d == self.computed).unwrap_or(true),
            None => true,
        };
        let sidecar_ok = match &self.sidecar {
            Some(sidecar) => *sidecar == self.computed,
            None => true,
        };
        frontmatter_ok && sidecar_ok
    }

    pub fn status(&self) -> DriftStatus {
        if self.has_drift() {
            DriftStatus::Drift
        } else if !self.is_correct() {
            DriftStatus::Incorrect
        } else if matches!(self.frontmatter, Some(ChecksumField::Pending)) {
            DriftStatus::Pending
        } else {
            DriftStatus::Ok
        }
    }
}

/// Reconciles the frontmatter and sidecar checksum stores for artifacts.
#[derive(Debug, Default)]
pub struct ChecksumSync {
    dry_run: bool,
}

impl ChecksumSync {
    pub fn new() -> Self {
        Self { dry_run: false }
    }

    /// Preview mode: mutators report what they would write without
    /// touching the filesystem.
    pub fn dry_run() -> Self {
        Self { dry_run: true }
    }

    /// Sidecar path for an artifact: the full file name plus `.sidecar.json`.
    pub fn sidecar_path(path: &Path) -> PathBuf {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        path.with_file_name(format!("{name}{SIDECAR_SUFFIX}"))
    }

    /// Read the embedded checksum field. A missing field is `None`, not
    /// an error; so is undecodable content, which cannot carry one. A
    /// missing file is an error.
    pub fn read_frontmatter(&self, path: &Path) -> Result<Option<ChecksumField>, SyncError> {
        if !path.exists() {
            return Err(SyncError::NotFound(path.to_path_buf()));
        }
        let bytes = fs::read(path)?;
        match std::str::from_utf8(&bytes) {
            Ok(text) => Ok(frontmatter::read_checksum(text)),
            Err(_) => Ok(None),
        }
    }

    /// Read the sidecar checksum. An absent sidecar or field is `None`.
    pub fn read_sidecar(&self, path: &Path) -> Result<Option<String>, SyncError> {
        let sidecar = Self::sidecar_path(path);
        if !sidecar.exists() {
            return Ok(None);
        }
        let value: Value = serde_json::from_str(&fs::read_to_string(&sidecar)?)?;
        Ok(value
            .get(frontmatter::CHECKSUM_KEY)
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    /// Compare both stored copies against the recomputed digest.
    pub fn detect_drift(&self, path: &Path) -> Result<DriftReport, SyncError> {
        let computed = engine::digest_file(path, true)?;
        Ok(DriftReport {
            path: path.to_path_buf(),
            frontmatter: self.read_frontmatter(path)?,
            sidecar: self.read_sidecar(path)?,
            computed,
        })
    }

    /// Copy the chosen source's value to the other location verbatim,
    /// without recomputation. Returns the propagated value.
    pub fn sync(&self, path: &Path, source: SyncSource) -> Result<String, SyncError> {
        match source {
            SyncSource::Frontmatter => {
                let field =
                    self.read_frontmatter(path)?
                        .ok_or_else(|| SyncError::MissingSource {
                            path: path.to_path_buf(),
                            which: source,
                        })?;
                let value = field.value().to_string();
                self.write_sidecar(path, &value)?;
                Ok(value)
            }
            SyncSource::Sidecar => {
                let value = self
                    .read_sidecar(path)?
                    .ok_or_else(|| SyncError::MissingSource {
                        path: path.to_path_buf(),
                        which: source,
                    })?;
                self.write_frontmatter(path, &value)?;
                Ok(value)
            }
        }
    }

    /// Recompute the digest from current content (Markdown-aware policy)
    /// and write it to both locations, overwriting any prior values. Both
    /// updates are staged before either file is touched.
    pub fn recalculate(&self, path: &Path) -> Result<String, SyncError> {
        let digest = engine::digest_file(path, true)?;

        let staged_document = if engine::is_markdown(path) {
            let content = fs::read_to_string(path)?;
            let updated = frontmatter::write_checksum(&content, &digest)
                .ok_or_else(|| SyncError::NoMetadataBlock(path.to_path_buf()))?;
            Some(updated)
        } else {
            None
        };
        let staged_sidecar = self.staged_sidecar(path, &digest)?;

        if let Some(document) = staged_document {
            self.write_text(path, &document)?;
        }
        self.write_text(&Self::sidecar_path(path), &staged_sidecar)?;
        Ok(digest)
    }

    fn write_frontmatter(&self, path: &Path, value: &str) -> Result<(), SyncError> {
        if !path.exists() {
            return Err(SyncError::NotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        let updated = frontmatter::write_checksum(&content, value)
            .ok_or_else(|| SyncError::NoMetadataBlock(path.to_path_buf()))?;
        self.write_text(path, &updated)
    }

    fn write_sidecar(&self, path: &Path, value: &str) -> Result<(), SyncError> {
        let staged = self.staged_sidecar(path, value)?;
        self.write_text(&Self::sidecar_path(path), &staged)
    }

    /// Build the updated sidecar document, preserving existing fields.
    /// A missing sidecar gets a minimal skeleton.
    fn staged_sidecar(&self, path: &Path, value: &str) -> Result<String, SyncError> {
        let sidecar = Self::sidecar_path(path);
        let mut record: serde_json::Map<String, Value> = if sidecar.exists() {
            serde_json::from_str(&fs::read_to_string(&sidecar)?)?
        } else {
            let mut skeleton = serde_json::Map::new();
            skeleton.insert("vault_id".to_string(), Value::String(String::new()));
            skeleton.insert("version".to_string(), Value::String("1.0.0".to_string()));
            skeleton
        };
        record.insert(
            frontmatter::CHECKSUM_KEY.to_string(),
            Value::String(value.to_string()),
        );
        let mut rendered = serde_json::to_string_pretty(&record)?;
        rendered.push('\n');
        Ok(rendered)
    }

    /// Write-then-rename; no-op under dry run.
    fn write_text(&self, path: &Path, content: &str) -> Result<(), SyncError> {
        if self.dry_run {
            return Ok(());
        }
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, content)?;
        fs::rename(&temp_path, path)?;
        Ok(())
    }
}

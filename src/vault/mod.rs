//! Vault management
//!
//! One `VaultManager` instance owns one vault directory: a JSON manifest
//! of registered artifacts plus the lineage-chain file. Registration is
//! the sole topology mutator; every query returns inconsistencies as
//! structured issues rather than errors.

mod lineage;
mod manager;
mod manifest;

use std::io;

pub use lineage::{LineageChain, LINEAGE_FILE};
pub use manager::{Direction, LineageReport, VaultManager, VaultState, VerifyOutcome};
pub use manifest::{ArtifactRecord, VaultManifest, MANIFEST_FILE, VAULT_VERSION};

use crate::checksum::ChecksumError;

/// Errors for vault operations
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    #[error("Lineage cycle detected while tracing {start} ({direction})")]
    TraceCycle {
        start: String,
        direction: Direction,
        /// The chain walked before the hop bound was exceeded
        chain: Vec<String>,
    },

    #[error("Checksum error: {0}")]
    Checksum(#[from] ChecksumError),

    #[error("Canonical JSON error: {0}")]
    Canonical(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

//! vaultline - checksum and lineage integrity vault
//!
//! Tracks content-addressed artifacts through SHA-256 checksums held in
//! two redundant stores (embedded frontmatter and JSON sidecars) and a
//! predecessor/successor lineage graph:
//! - checksum engine with byte-exact, Markdown-aware, and canonical-text
//!   policies
//! - frontmatter/sidecar checksum reconciliation
//! - `vault://` identifier registry
//! - vault manager with persisted manifest and lineage chains
//! - lineage graph with cycle and broken-link detection, rendered as
//!   DOT, SVG, or interactive HTML

pub mod checksum;
pub mod config;
pub mod graph;
pub mod ident;
pub mod render;
pub mod vault;

/// Suffix appended to a primary artifact file name to locate its sidecar
pub const SIDECAR_SUFFIX: &str = ".sidecar.json";

pub use checksum::{
    ChecksumError, ChecksumField, ChecksumSync, DriftReport, DriftStatus, SyncError, SyncSource,
    Verification,
};
pub use config::{Settings, SettingsError};
pub use graph::{GraphAnalysis, GraphError, LineageGraph, ScanOutcome};
pub use ident::{ArtifactId, IdError};
pub use vault::{
    Direction, LineageChain, LineageReport, VaultError, VaultManager, VaultManifest, VaultState,
    VerifyOutcome,
};

//! Vault manager
//!
//! Owns one vault directory: registers artifacts with canonical-text
//! checksums, maintains the lineage chains, and answers integrity and
//! lineage queries. All file paths are explicit constructor parameters;
//! there is no process-wide vault state.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use super::lineage::{self, LineageChain, LINEAGE_FILE};
use super::manifest::{ArtifactRecord, VaultManifest, MANIFEST_FILE};
use super::VaultError;
use crate::checksum;
use crate::graph::LineageGraph;
use crate::ident::ArtifactId;

/// Trace direction through the lineage chains
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Follow predecessor links toward the root
    Backward,
    /// Follow successor links toward the leaf
    Forward,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Backward => write!(f, "backward"),
            Direction::Forward => write!(f, "forward"),
        }
    }
}

/// Result of an integrity or chain validation query.
///
/// Inconsistency is the expected output of these queries: every issue is
/// individually enumerable and nothing is thrown.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyOutcome {
    pub valid: bool,
    pub issues: Vec<String>,
}

impl VerifyOutcome {
    pub fn ok() -> Self {
        Self {
            valid: true,
            issues: Vec::new(),
        }
    }

    pub fn fail(issues: Vec<String>) -> Self {
        Self {
            valid: false,
            issues,
        }
    }
}

/// Read-side lineage aggregation
#[derive(Debug, Clone, Serialize)]
pub struct LineageReport {
    pub total_artifacts: usize,
    pub root_nodes: Vec<String>,
    pub leaf_nodes: Vec<String>,
    pub fork_points: Vec<String>,
    /// Forward trace from each root
    pub chains: BTreeMap<String, Vec<String>>,
}

/// Complete vault state for backup or transfer
#[derive(Debug, Clone, Serialize)]
pub struct VaultState {
    pub manifest: VaultManifest,
    pub lineage_graph: BTreeMap<String, LineageChain>,
    pub exported_at: DateTime<Utc>,
    pub state_hash: String,
}

/// Manages one vault directory: checksums, manifest, and lineage.
#[derive(Debug)]
pub struct VaultManager {
    vault_dir: PathBuf,
    manifest_path: PathBuf,
    lineage_path: PathBuf,
    manifest: VaultManifest,
    chains: BTreeMap<String, LineageChain>,
}

impl VaultManager {
    /// Open a vault directory using the standard file names, initializing
    /// empty state if the files do not exist yet.
    pub fn open(vault_dir: impl Into<PathBuf>) -> Result<Self, VaultError> {
        let vault_dir = vault_dir.into();
        let manifest_path = vault_dir.join(MANIFEST_FILE);
        let lineage_path = vault_dir.join(LINEAGE_FILE);
        Self::with_paths(vault_dir, manifest_path, lineage_path)
    }

    /// Open a vault with explicit manifest and lineage file paths.
    pub fn with_paths(
        vault_dir: PathBuf,
        manifest_path: PathBuf,
        lineage_path: PathBuf,
    ) -> Result<Self, VaultError> {
        let manifest = VaultManifest::load_or_init(&manifest_path)?;
        let chains = lineage::load_chains(&lineage_path)?;
        Ok(Self {
            vault_dir,
            manifest_path,
            lineage_path,
            manifest,
            chains,
        })
    }

    pub fn vault_dir(&self) -> &Path {
        &self.vault_dir
    }

    pub fn manifest(&self) -> &VaultManifest {
        &self.manifest
    }

    pub fn chains(&self) -> &BTreeMap<String, LineageChain> {
        &self.chains
    }

    /// Register an artifact: compute its canonical-text digest, create or
    /// overwrite the manifest and chain entries, link the predecessor's
    /// successor, and persist both files before returning.
    ///
    /// This is the sole mutator of graph topology.
    pub fn register(
        &mut self,
        id: &ArtifactId,
        file: &Path,
        predecessor: Option<&ArtifactId>,
        metadata: Option<serde_json::Map<String, Value>>,
    ) -> Result<String, VaultError> {
        let checksum = checksum::digest_canonical_file(file)?;
        let key = id.to_string();

        self.manifest.artifacts.insert(
            key.clone(),
            ArtifactRecord {
                file_path: file.display().to_string(),
                registered_at: Utc::now(),
                metadata: metadata.unwrap_or_default(),
                checksum: checksum.clone(),
                extra: BTreeMap::new(),
            },
        );
        self.manifest.checksums.insert(key.clone(), checksum.clone());

        let mut chain = LineageChain::new(&key);
        chain.predecessor = predecessor.map(|p| p.to_string());
        self.chains.insert(key.clone(), chain);

        if let Some(predecessor) = predecessor {
            if let Some(entry) = self.chains.get_mut(&predecessor.to_string()) {
                entry.successor = Some(key.clone());
            }
        }

        self.persist()?;
        Ok(checksum)
    }

    /// Verify a registered artifact against its recorded checksum.
    pub fn verify(&self, id: &str) -> VerifyOutcome {
        let Some(record) = self.manifest.artifacts.get(id) else {
            return VerifyOutcome::fail(vec![format!("{id} not registered in manifest")]);
        };

        let file = Path::new(&record.file_path);
        if !file.exists() {
            return VerifyOutcome::fail(vec![format!(
                "Artifact file not found: {}",
                record.file_path
            )]);
        }

        let Some(expected) = self.manifest.checksums.get(id) else {
            return VerifyOutcome::fail(vec!["No checksum recorded for artifact".to_string()]);
        };

        match checksum::digest_canonical_file(file) {
            Ok(actual) if &actual == expected => VerifyOutcome::ok(),
            Ok(actual) => VerifyOutcome::fail(vec![format!(
                "Checksum mismatch: expected {expected}, got {actual}"
            )]),
            Err(err) => VerifyOutcome::fail(vec![format!("Checksum computation failed: {err}")]),
        }
    }

    /// Trace the lineage chain from an identifier, including it.
    ///
    /// The walk stops when the next link is absent, or one hop after it
    /// points at an unregistered node (the dangling id terminates the
    /// trace without error). A walk longer than the number of registered
    /// nodes can only mean a cycle and is returned as `TraceCycle`
    /// carrying the partial chain.
    pub fn trace(&self, id: &str, direction: Direction) -> Result<Vec<String>, VaultError> {
        let (chain, cycle) = self.walk(id, direction);
        if cycle {
            Err(VaultError::TraceCycle {
                start: id.to_string(),
                direction,
                chain,
            })
        } else {
            Ok(chain)
        }
    }

    fn walk(&self, id: &str, direction: Direction) -> (Vec<String>, bool) {
        if !self.chains.contains_key(id) {
            return (Vec::new(), false);
        }

        let hop_limit = self.chains.len();
        let mut chain = vec![id.to_string()];
        let mut current = id.to_string();
        let mut hops = 0usize;

        loop {
            let Some(entry) = self.chains.get(&current) else {
                // Dangling link: already appended, not followed further
                break;
            };
            let next = match direction {
                Direction::Backward => entry.predecessor.as_ref(),
                Direction::Forward => entry.successor.as_ref(),
            };
            let Some(next) = next else {
                break;
            };
            if hops >= hop_limit {
                return (chain, true);
            }
            hops += 1;
            chain.push(next.clone());
            current = next.clone();
        }

        (chain, false)
    }

    /// Validate the backward chain from an identifier: every predecessor
    /// must name this node as its successor. All breaks are reported, not
    /// just the first.
    pub fn validate_chain(&self, id: &str) -> VerifyOutcome {
        if !self.chains.contains_key(id) {
            return VerifyOutcome::fail(vec![format!("{id} not in lineage graph")]);
        }

        let (backward, cycle) = self.walk(id, Direction::Backward);
        let mut issues = Vec::new();
        if cycle {
            issues.push(format!(
                "Lineage cycle detected: {}",
                backward.join(" -> ")
            ));
        }

        for i in 1..backward.len() {
            let earlier = &backward[i];
            let later = &backward[i - 1];
            let Some(entry) = self.chains.get(earlier) else {
                issues.push(format!("Missing lineage entry for {earlier}"));
                continue;
            };
            if entry.successor.as_deref() != Some(later.as_str()) {
                issues.push(format!(
                    "Lineage break at {earlier}: expected successor {later}, got {}",
                    entry.successor.as_deref().unwrap_or("none")
                ));
            }
        }

        VerifyOutcome {
            valid: issues.is_empty(),
            issues,
        }
    }

    /// Project the chains into a lineage graph for cycle and broken-link
    /// analysis.
    pub fn graph(&self) -> LineageGraph {
        let mut graph = LineageGraph::new();
        for (id, chain) in &self.chains {
            graph.declare(id);
            if let Some(predecessor) = &chain.predecessor {
                graph.add_edge(predecessor, id);
            }
            if let Some(successor) = &chain.successor {
                graph.add_edge(id, successor);
            }
        }
        graph
    }

    /// Detect cycles over successor edges.
    pub fn detect_cycles(&self) -> Vec<Vec<String>> {
        self.graph().detect_cycles()
    }

    /// Detect references to unregistered nodes, in the direction of the
    /// dangling reference.
    pub fn detect_broken_links(&self) -> Vec<(String, String)> {
        self.graph().detect_broken_links()
    }

    /// Generate the lineage report: roots, leaves, forks, and the forward
    /// chain from each root. Pure read-side aggregation.
    pub fn report(&self) -> LineageReport {
        let mut report = LineageReport {
            total_artifacts: self.chains.len(),
            root_nodes: Vec::new(),
            leaf_nodes: Vec::new(),
            fork_points: Vec::new(),
            chains: BTreeMap::new(),
        };

        for (id, chain) in &self.chains {
            if chain.is_root() {
                report.root_nodes.push(id.clone());
            }
            if chain.is_leaf() {
                report.leaf_nodes.push(id.clone());
            }
            if chain.is_fork() {
                report.fork_points.push(id.clone());
            }
        }

        for root in &report.root_nodes {
            // Best effort: a chain that runs into a cycle is reported as
            // far as it was walked.
            let (chain, _) = self.walk(root, Direction::Forward);
            report.chains.insert(root.clone(), chain);
        }

        report
    }

    /// Export the complete vault state with its canonical hash.
    pub fn export_state(&self) -> Result<VaultState, VaultError> {
        Ok(VaultState {
            manifest: self.manifest.clone(),
            lineage_graph: self.chains.clone(),
            exported_at: Utc::now(),
            state_hash: self.state_hash()?,
        })
    }

    /// Hash of the vault's artifacts and checksums over a canonical
    /// (sorted-key) serialization. Registration order never changes the
    /// hash; any change to an entry or digest does.
    pub fn state_hash(&self) -> Result<String, VaultError> {
        let state = serde_json::json!({
            "artifacts": self.manifest.artifacts,
            "checksums": self.manifest.checksums,
        });
        let canonical = serde_json_canonicalizer::to_vec(&state)
            .map_err(|err| VaultError::Canonical(err.to_string()))?;
        let canonical = String::from_utf8(canonical)
            .map_err(|err| VaultError::Canonical(err.to_string()))?;
        Ok(checksum::digest_canonical_text(&canonical))
    }

    /// Persist manifest and lineage, each written to a temp file and
    /// renamed into place.
    fn persist(&self) -> Result<(), VaultError> {
        self.manifest.save(&self.manifest_path)?;
        lineage::save_chains(&self.lineage_path, &self.chains)?;
        Ok(())
    }
}

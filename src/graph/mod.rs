//! Directed lineage graph
//!
//! Shared read-side structure: the vault manager projects its chains into
//! it and the sidecar scanner builds it from `.sidecar.json` records.
//! Nodes referenced by an edge exist in the graph; nodes that were
//! actually scanned or registered are additionally *declared*. References
//! to undeclared nodes are broken links.

mod sidecar;

use std::collections::{BTreeMap, BTreeSet};

pub use sidecar::{
    load_sidecar, scan_directory, GraphError, ScanOutcome, SidecarLineage, SidecarRecord,
    SkippedSidecar,
};

/// A node in the lineage graph
#[derive(Debug, Clone)]
pub struct LineageNode {
    pub id: String,
    pub predecessors: BTreeSet<String>,
    pub successors: BTreeSet<String>,
    /// Display metadata (vault id, checksum, version, timestamp)
    pub metadata: BTreeMap<String, String>,
}

impl LineageNode {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            predecessors: BTreeSet::new(),
            successors: BTreeSet::new(),
            metadata: BTreeMap::new(),
        }
    }
}

/// Directed graph over artifact identifiers
#[derive(Debug, Clone, Default)]
pub struct LineageGraph {
    nodes: BTreeMap<String, LineageNode>,
    declared: BTreeSet<String>,
}

impl LineageGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node and mark it as declared (scanned or registered).
    pub fn declare(&mut self, id: &str) -> &mut LineageNode {
        self.declared.insert(id.to_string());
        self.nodes
            .entry(id.to_string())
            .or_insert_with(|| LineageNode::new(id))
    }

    /// Add a predecessor-to-successor edge, materializing both endpoints.
    pub fn add_edge(&mut self, from: &str, to: &str) {
        self.nodes
            .entry(from.to_string())
            .or_insert_with(|| LineageNode::new(from))
            .successors
            .insert(to.to_string());
        self.nodes
            .entry(to.to_string())
            .or_insert_with(|| LineageNode::new(to))
            .predecessors
            .insert(from.to_string());
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn is_declared(&self, id: &str) -> bool {
        self.declared.contains(id)
    }

    pub fn node(&self, id: &str) -> Option<&LineageNode> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &LineageNode> {
        self.nodes.values()
    }

    /// Nodes with no predecessors.
    pub fn roots(&self) -> Vec<String> {
        self.nodes
            .values()
            .filter(|node| node.predecessors.is_empty())
            .map(|node| node.id.clone())
            .collect()
    }

    /// Nodes with no successors.
    pub fn leaves(&self) -> Vec<String> {
        self.nodes
            .values()
            .filter(|node| node.successors.is_empty())
            .map(|node| node.id.clone())
            .collect()
    }

    /// Detect cycles over successor edges.
    ///
    /// Depth-first traversal from every node with an explicit work-list
    /// (no call-stack recursion, so graph size does not bound the walk).
    /// The first edge found pointing back into the current path yields a
    /// cycle from the first occurrence of its target through the current
    /// node, closed with the target again; each exploration reports at
    /// most one cycle.
    pub fn detect_cycles(&self) -> Vec<Vec<String>> {
        let mut visited: BTreeSet<String> = BTreeSet::new();
        let mut cycles: Vec<Vec<String>> = Vec::new();

        for start in self.nodes.keys() {
            if visited.contains(start) {
                continue;
            }

            let mut stack: Vec<(String, std::vec::IntoIter<String>)> =
                vec![(start.clone(), self.successors_of(start))];
            let mut path: Vec<String> = vec![start.clone()];
            let mut on_path: BTreeSet<String> = BTreeSet::new();
            on_path.insert(start.clone());
            visited.insert(start.clone());

            'explore: loop {
                let next = match stack.last_mut() {
                    Some((_, successors)) => successors.next(),
                    None => break,
                };
                match next {
                    Some(next) => {
                        if on_path.contains(&next) {
                            // Back-edge: close the loop from the first
                            // occurrence of the target
                            let position = path.iter().position(|id| *id == next).unwrap_or(0);
                            let mut cycle: Vec<String> = path[position..].to_vec();
                            cycle.push(next);
                            cycles.push(cycle);
                            break 'explore;
                        }
                        if !visited.contains(&next) {
                            visited.insert(next.clone());
                            on_path.insert(next.clone());
                            path.push(next.clone());
                            let successors = self.successors_of(&next);
                            stack.push((next, successors));
                        }
                    }
                    None => {
                        if let Some((node, _)) = stack.pop() {
                            on_path.remove(&node);
                            path.pop();
                        }
                    }
                }
            }
        }

        cycles
    }

    /// Detect references to undeclared nodes, emitted in the direction of
    /// the dangling reference.
    pub fn detect_broken_links(&self) -> Vec<(String, String)> {
        let mut broken: BTreeSet<(String, String)> = BTreeSet::new();

        for (id, node) in &self.nodes {
            for predecessor in &node.predecessors {
                if !self.declared.contains(predecessor) {
                    broken.insert((predecessor.clone(), id.clone()));
                }
            }
            for successor in &node.successors {
                if !self.declared.contains(successor) {
                    broken.insert((id.clone(), successor.clone()));
                }
            }
        }

        broken.into_iter().collect()
    }

    fn successors_of(&self, id: &str) -> std::vec::IntoIter<String> {
        self.nodes
            .get(id)
            .map(|node| node.successors.iter().cloned().collect::<Vec<_>>())
            .unwrap_or_default()
            .into_iter()
    }
}

/// Root/leaf/cycle/broken-link summary computed once and shared by every
/// renderer, so all outputs agree on node and edge classification.
#[derive(Debug, Clone)]
pub struct GraphAnalysis {
    pub roots: BTreeSet<String>,
    pub leaves: BTreeSet<String>,
    pub cycles: Vec<Vec<String>>,
    pub cycle_members: BTreeSet<String>,
    pub broken_links: BTreeSet<(String, String)>,
}

impl GraphAnalysis {
    pub fn of(graph: &LineageGraph) -> Self {
        let cycles = graph.detect_cycles();
        let cycle_members = cycles.iter().flatten().cloned().collect();
        Self {
            roots: graph.roots().into_iter().collect(),
            leaves: graph.leaves().into_iter().collect(),
            cycles,
            cycle_members,
            broken_links: graph.detect_broken_links().into_iter().collect(),
        }
    }

    pub fn in_cycle(&self, id: &str) -> bool {
        self.cycle_members.contains(id)
    }

    /// Whether an edge belongs to a detected cycle (both endpoints share
    /// one cycle).
    pub fn edge_in_cycle(&self, from: &str, to: &str) -> bool {
        self.cycles
            .iter()
            .any(|cycle| cycle.iter().any(|id| id == from) && cycle.iter().any(|id| id == to))
    }

    pub fn is_broken(&self, from: &str, to: &str) -> bool {
        self.broken_links
            .contains(&(from.to_string(), to.to_string()))
    }
}

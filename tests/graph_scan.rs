//! Sidecar scan and rendering tests
//!
//! Builds lineage graphs from sidecar directories and checks that every
//! rendering agrees on node and edge classification.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use vaultline::graph::{scan_directory, GraphAnalysis, LineageGraph};
use vaultline::render::{to_dot, to_html};

fn write_sidecar(dir: &Path, name: &str, json: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, json).unwrap();
    path
}

fn scan(dir: &Path) -> (LineageGraph, GraphAnalysis) {
    let mut graph = LineageGraph::new();
    scan_directory(&mut graph, dir).unwrap();
    let analysis = GraphAnalysis::of(&graph);
    (graph, analysis)
}

#[test]
fn test_two_sidecars_forming_a_cycle() {
    let dir = TempDir::new().unwrap();
    write_sidecar(
        dir.path(),
        "a.sidecar.json",
        r#"{"vault_id": "A", "lineage": {"predecessors": [], "successors": ["B"]}}"#,
    );
    write_sidecar(
        dir.path(),
        "b.sidecar.json",
        r#"{"vault_id": "B", "lineage": {"predecessors": [], "successors": ["A"]}}"#,
    );

    let mut graph = LineageGraph::new();
    let outcome = scan_directory(&mut graph, dir.path()).unwrap();
    assert_eq!(outcome.loaded, 2);
    assert!(outcome.skipped.is_empty());

    let cycles = graph.detect_cycles();
    assert_eq!(cycles.len(), 1);
    let cycle = &cycles[0];
    assert_eq!(cycle.len(), 3);
    assert_eq!(cycle.first(), cycle.last());
    assert!(cycle.contains(&"A".to_string()));
    assert!(cycle.contains(&"B".to_string()));
}

#[test]
fn test_unscanned_predecessor_is_a_broken_link() {
    let dir = TempDir::new().unwrap();
    write_sidecar(
        dir.path(),
        "n.sidecar.json",
        r#"{"vault_id": "N", "lineage": {"predecessors": ["Z"], "successors": []}}"#,
    );

    let (graph, _) = scan(dir.path());
    assert_eq!(
        graph.detect_broken_links(),
        vec![("Z".to_string(), "N".to_string())]
    );
}

#[test]
fn test_rescan_into_fresh_graph_is_idempotent() {
    let dir = TempDir::new().unwrap();
    write_sidecar(
        dir.path(),
        "a.sidecar.json",
        r#"{"vault_id": "A", "lineage": {"successors": ["B"]}}"#,
    );
    write_sidecar(dir.path(), "b.sidecar.json", r#"{"vault_id": "B"}"#);

    let (first, _) = scan(dir.path());
    let (second, _) = scan(dir.path());
    assert_eq!(first.len(), second.len());
    assert_eq!(first.roots(), second.roots());
    assert_eq!(first.leaves(), second.leaves());
}

#[test]
fn test_malformed_sidecar_is_skipped_not_fatal() {
    let dir = TempDir::new().unwrap();
    write_sidecar(dir.path(), "good.sidecar.json", r#"{"vault_id": "G"}"#);
    write_sidecar(dir.path(), "bad.sidecar.json", "{broken json");

    let mut graph = LineageGraph::new();
    let outcome = scan_directory(&mut graph, dir.path()).unwrap();
    assert_eq!(outcome.loaded, 1);
    assert_eq!(outcome.skipped.len(), 1);
    assert!(outcome.skipped[0].reason.contains("JSON"));
    assert!(graph.contains("G"));
}

#[test]
fn test_all_renderings_agree_on_classification() {
    let dir = TempDir::new().unwrap();
    write_sidecar(
        dir.path(),
        "a.sidecar.json",
        r#"{"vault_id": "A", "lineage": {"successors": ["B"]}}"#,
    );
    write_sidecar(
        dir.path(),
        "b.sidecar.json",
        r#"{"vault_id": "B", "lineage": {"successors": ["A"]}}"#,
    );
    write_sidecar(
        dir.path(),
        "c.sidecar.json",
        r#"{"vault_id": "C", "lineage": {"predecessors": ["Gone"]}}"#,
    );

    let (graph, analysis) = scan(dir.path());
    let dot = to_dot(&graph, &analysis);
    let html = to_html(&graph, &analysis);

    // Cycle membership: orange nodes in DOT, inCycle flags in HTML
    assert!(dot.contains("\"A\" [label=\"A\", fillcolor=orange, style=filled];"));
    assert!(dot.contains("\"B\" [label=\"B\", fillcolor=orange, style=filled];"));
    assert!(html.contains("\"inCycle\": true"));

    // Broken link rendered dashed in DOT and flagged in HTML
    assert!(dot.contains("\"Gone\" -> \"C\" [style=dashed, color=red, label=\"broken\"];"));
    assert!(html.contains("\"broken\": true"));

    // Stats agree with the analysis
    assert!(html.contains(&format!("<strong>Cycles:</strong> {}", analysis.cycles.len())));
    assert!(html.contains(&format!(
        "<strong>Broken Links:</strong> {}",
        analysis.broken_links.len()
    )));
}

#[test]
fn test_sidecar_metadata_shows_in_dot_labels() {
    let dir = TempDir::new().unwrap();
    write_sidecar(
        dir.path(),
        "a.sidecar.json",
        &format!(
            r#"{{"vault_id": "A", "version": "1.2", "checksum_sha256": "{}"}}"#,
            "d".repeat(64)
        ),
    );

    let (graph, analysis) = scan(dir.path());
    let dot = to_dot(&graph, &analysis);
    assert!(dot.contains("A\\nv1.2\\n[dddddddd]"));
}

#[test]
fn test_node_key_fallback_without_vault_id() {
    let dir = TempDir::new().unwrap();
    write_sidecar(dir.path(), "notes.md.sidecar.json", r#"{"version": "1.0"}"#);

    let (graph, _) = scan(dir.path());
    assert!(graph.contains("notes.md"));
}

#[test]
fn test_merged_graph_roots_and_leaves() {
    let dir = TempDir::new().unwrap();
    write_sidecar(
        dir.path(),
        "a.sidecar.json",
        r#"{"vault_id": "A", "lineage": {"successors": ["B"]}}"#,
    );
    write_sidecar(
        dir.path(),
        "b.sidecar.json",
        r#"{"vault_id": "B", "lineage": {"predecessors": ["A"], "successors": ["C"]}}"#,
    );
    write_sidecar(
        dir.path(),
        "c.sidecar.json",
        r#"{"vault_id": "C", "lineage": {"predecessors": ["B"]}}"#,
    );

    let (graph, analysis) = scan(dir.path());
    assert_eq!(graph.len(), 3);
    assert_eq!(graph.roots(), vec!["A".to_string()]);
    assert_eq!(graph.leaves(), vec!["C".to_string()]);
    assert!(analysis.cycles.is_empty());
    assert!(analysis.broken_links.is_empty());
}

//! GraphViz DOT output
//!
//! Visual vocabulary: green roots, blue leaves, orange cycle members,
//! red heavy edges inside cycles, dashed red edges for broken links.

use crate::graph::{GraphAnalysis, LineageGraph};

/// Render the graph as GraphViz DOT.
pub fn to_dot(graph: &LineageGraph, analysis: &GraphAnalysis) -> String {
    let mut lines = vec![
        "digraph Lineage {".to_string(),
        "  rankdir=LR;".to_string(),
        "  node [shape=box, style=rounded];".to_string(),
        String::new(),
    ];

    for node in graph.nodes() {
        let mut label_parts = vec![node.id.clone()];
        if let Some(version) = node.metadata.get("version") {
            label_parts.push(format!("v{version}"));
        }
        if let Some(checksum) = node.metadata.get("checksum") {
            label_parts.push(format!("[{}]", prefix(checksum, 8)));
        }
        let label = label_parts.join("\\n");

        if !graph.is_declared(&node.id) {
            // Referenced but never scanned/registered: rendered hollow
            lines.push(format!(
                "  \"{}\" [label=\"{label}\", style=\"rounded,dashed\"];",
                node.id
            ));
            continue;
        }

        let fillcolor = if analysis.in_cycle(&node.id) {
            "orange"
        } else if node.successors.is_empty() {
            "lightblue"
        } else if node.predecessors.is_empty() {
            "lightgreen"
        } else {
            "lightgray"
        };
        lines.push(format!(
            "  \"{}\" [label=\"{label}\", fillcolor={fillcolor}, style=filled];",
            node.id
        ));
    }

    lines.push(String::new());

    for node in graph.nodes() {
        for successor in &node.successors {
            if analysis.is_broken(&node.id, successor) {
                continue;
            }
            let style = if analysis.edge_in_cycle(&node.id, successor) {
                " [color=red, penwidth=2]"
            } else {
                ""
            };
            lines.push(format!("  \"{}\" -> \"{successor}\"{style};", node.id));
        }
    }

    for (from, to) in &analysis.broken_links {
        lines.push(format!(
            "  \"{from}\" -> \"{to}\" [style=dashed, color=red, label=\"broken\"];"
        ));
    }

    lines.push("}".to_string());
    lines.join("\n")
}

fn prefix(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_graph() -> (LineageGraph, GraphAnalysis) {
        let mut graph = LineageGraph::new();
        graph.declare("A");
        graph.declare("B");
        graph.declare("C");
        graph.add_edge("A", "B");
        graph.add_edge("B", "A");
        graph.add_edge("C", "Gone");
        let analysis = GraphAnalysis::of(&graph);
        (graph, analysis)
    }

    #[test]
    fn test_dot_structure() {
        let (graph, analysis) = build_graph();
        let dot = to_dot(&graph, &analysis);
        assert!(dot.starts_with("digraph Lineage {"));
        assert!(dot.ends_with('}'));
        assert!(dot.contains("rankdir=LR;"));
    }

    #[test]
    fn test_cycle_members_are_orange_with_red_edges() {
        let (graph, analysis) = build_graph();
        let dot = to_dot(&graph, &analysis);
        assert!(dot.contains("\"A\" [label=\"A\", fillcolor=orange, style=filled];"));
        assert!(dot.contains("\"A\" -> \"B\" [color=red, penwidth=2];"));
        assert!(dot.contains("\"B\" -> \"A\" [color=red, penwidth=2];"));
    }

    #[test]
    fn test_broken_edge_rendered_dashed_only() {
        let (graph, analysis) = build_graph();
        let dot = to_dot(&graph, &analysis);
        assert!(dot.contains("\"C\" -> \"Gone\" [style=dashed, color=red, label=\"broken\"];"));
        assert!(!dot.contains("\"C\" -> \"Gone\";"));
    }

    #[test]
    fn test_undeclared_node_rendered_hollow() {
        let (graph, analysis) = build_graph();
        let dot = to_dot(&graph, &analysis);
        assert!(dot.contains("\"Gone\" [label=\"Gone\", style=\"rounded,dashed\"];"));
    }

    #[test]
    fn test_label_includes_version_and_checksum_prefix() {
        let mut graph = LineageGraph::new();
        let node = graph.declare("A");
        node.metadata
            .insert("version".to_string(), "1.0".to_string());
        node.metadata
            .insert("checksum".to_string(), "abcdef0123456789".to_string());
        let analysis = GraphAnalysis::of(&graph);

        let dot = to_dot(&graph, &analysis);
        assert!(dot.contains("A\\nv1.0\\n[abcdef01]"));
    }
}

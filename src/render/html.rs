//! Self-contained interactive HTML rendering
//!
//! Embeds the node and edge data as JSON for client-side exploration.
//! Classification comes from the shared `GraphAnalysis`.

use serde_json::json;

use crate::graph::{GraphAnalysis, LineageGraph};

const STYLE: &str = r#"
        body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; margin: 20px; background: #f5f5f5; }
        .container { max-width: 1200px; margin: 0 auto; background: white; padding: 20px; border-radius: 8px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }
        .stats { background: #f9f9f9; padding: 15px; border-radius: 5px; margin-bottom: 20px; }
        .stats div { display: inline-block; margin-right: 20px; }
        .graph { border: 1px solid #ddd; border-radius: 5px; padding: 20px; background: white; min-height: 200px; }
        .node { display: inline-block; padding: 10px 15px; margin: 5px; border-radius: 5px; border: 2px solid #333; background: #f0f0f0; cursor: pointer; }
        .node.root { background: #90ee90; }
        .node.leaf { background: #add8e6; }
        .node.cycle { background: #ffb347; border-color: #ff6347; }
        .metadata { font-size: 0.85em; color: #666; margin-top: 5px; }
        .issues { background: #fff3cd; padding: 15px; border-radius: 5px; margin-top: 20px; border-left: 4px solid #ffc107; }
        .legend { margin-top: 20px; padding: 15px; background: #f9f9f9; border-radius: 5px; }
        .legend-item { display: inline-block; margin-right: 20px; }
        .legend-color { display: inline-block; width: 20px; height: 20px; border-radius: 3px; border: 1px solid #333; margin-right: 5px; vertical-align: middle; }
"#;

const SCRIPT: &str = r#"
        const graphDiv = document.getElementById('graph');
        nodes.forEach(node => {
            const nodeDiv = document.createElement('div');
            nodeDiv.className = 'node';
            if (node.isRoot) nodeDiv.classList.add('root');
            if (node.isLeaf) nodeDiv.classList.add('leaf');
            if (node.inCycle) nodeDiv.classList.add('cycle');

            let html = `<strong>${node.id}</strong>`;
            if (node.metadata.version) {
                html += `<div class="metadata">Version: ${node.metadata.version}</div>`;
            }
            if (node.metadata.checksum) {
                html += `<div class="metadata">Checksum: ${node.metadata.checksum.substring(0, 12)}...</div>`;
            }
            if (node.predecessors.length > 0) {
                html += `<div class="metadata">&larr; ${node.predecessors.length} predecessor(s)</div>`;
            }
            if (node.successors.length > 0) {
                html += `<div class="metadata">&rarr; ${node.successors.length} successor(s)</div>`;
            }
            nodeDiv.innerHTML = html;
            nodeDiv.title = JSON.stringify(node.metadata, null, 2);
            nodeDiv.addEventListener('click', () => {
                alert(`Node: ${node.id}\n\nPredecessors: ${node.predecessors.join(', ') || 'None'}\nSuccessors: ${node.successors.join(', ') || 'None'}`);
            });
            graphDiv.appendChild(nodeDiv);
        });
"#;

/// Render the graph as a self-contained interactive HTML document.
pub fn to_html(graph: &LineageGraph, analysis: &GraphAnalysis) -> String {
    let nodes: Vec<serde_json::Value> = graph
        .nodes()
        .map(|node| {
            json!({
                "id": node.id,
                "label": node.id,
                "metadata": node.metadata,
                "predecessors": node.predecessors,
                "successors": node.successors,
                "isRoot": node.predecessors.is_empty(),
                "isLeaf": node.successors.is_empty(),
                "inCycle": analysis.in_cycle(&node.id),
            })
        })
        .collect();

    let edges: Vec<serde_json::Value> = graph
        .nodes()
        .flat_map(|node| {
            node.successors.iter().map(|successor| {
                json!({
                    "from": node.id,
                    "to": successor,
                    "inCycle": analysis.edge_in_cycle(&node.id, successor),
                    "broken": analysis.is_broken(&node.id, successor),
                })
            })
        })
        .collect();

    let issues_section = if analysis.cycles.is_empty() && analysis.broken_links.is_empty() {
        String::new()
    } else {
        let cycle_items: String = analysis
            .cycles
            .iter()
            .map(|cycle| format!("<li>{}</li>", cycle.join(" &rarr; ")))
            .collect();
        let broken_items: String = analysis
            .broken_links
            .iter()
            .map(|(from, to)| format!("<li>{from} &rarr; {to}</li>"))
            .collect();
        format!(
            "        <div class=\"issues\">\n            <h3>Issues Detected</h3>\n            \
             <div><strong>Cycles:</strong> {}</div>\n            <ul>{cycle_items}</ul>\n            \
             <div><strong>Broken Links:</strong> {}</div>\n            <ul>{broken_items}</ul>\n        </div>\n",
            analysis.cycles.len(),
            analysis.broken_links.len(),
        )
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>Lineage Graph</title>
    <style>{STYLE}    </style>
</head>
<body>
    <div class="container">
        <h1>Lineage Graph</h1>

        <div class="stats">
            <div><strong>Nodes:</strong> {node_count}</div>
            <div><strong>Roots:</strong> {root_count}</div>
            <div><strong>Leaves:</strong> {leaf_count}</div>
            <div><strong>Cycles:</strong> {cycle_count}</div>
            <div><strong>Broken Links:</strong> {broken_count}</div>
        </div>

        <div class="graph" id="graph"></div>

{issues_section}
        <div class="legend">
            <h3>Legend</h3>
            <div class="legend-item"><span class="legend-color" style="background: #90ee90;"></span>Root (no predecessors)</div>
            <div class="legend-item"><span class="legend-color" style="background: #add8e6;"></span>Leaf (no successors)</div>
            <div class="legend-item"><span class="legend-color" style="background: #ffb347;"></span>In cycle</div>
        </div>
    </div>

    <script>
        const nodes = {nodes_json};
        const edges = {edges_json};
{SCRIPT}    </script>
</body>
</html>
"#,
        node_count = graph.len(),
        root_count = analysis.roots.len(),
        leaf_count = analysis.leaves.len(),
        cycle_count = analysis.cycles.len(),
        broken_count = analysis.broken_links.len(),
        nodes_json = serde_json::to_string_pretty(&nodes).unwrap_or_else(|_| "[]".to_string()),
        edges_json = serde_json::to_string_pretty(&edges).unwrap_or_else(|_| "[]".to_string()),
    )
}

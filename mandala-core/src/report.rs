// Report generation for crawl results and routes

use crate::path::Path;
use mandala_scanner::{CrawlResult, Graph, Node, NodeKind};
use petgraph::dot::Dot;
use petgraph::graph::DiGraph;
use serde::{Deserialize, Serialize};

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
    Dot,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "dot" | "graphviz" => Some(ReportFormat::Dot),
            _ => None,
        }
    }
}

pub fn generate_graph_report(
    result: &CrawlResult,
    format: ReportFormat,
) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(generate_text_graph_report(result)),
        ReportFormat::Json => generate_json_graph_report(result),
        ReportFormat::Dot => Ok(generate_dot(&result.graph)),
    }
}

pub fn generate_text_graph_report(result: &CrawlResult) -> String {
    let graph = &result.graph;
    let mut report = String::new();

    report.push_str(RULE);
    report.push_str("                        MANDALA FEDERATION REPORT\n");
    report.push_str(RULE);
    report.push('\n');

    report.push_str(&format!("Seed:         {}\n", result.seed));
    report.push_str(&format!(
        "Documents:    {} fetched, {} failed\n",
        result.fetched.len(),
        result.failures.len()
    ));
    report.push_str(&format!("Providers:    {}\n", graph.providers().count()));
    report.push_str(&format!("Extensions:   {}\n", graph.extensions().count()));
    report.push_str(&format!("Edges:        {}\n", graph.edge_count()));
    if result.truncated {
        report.push_str("\nNote: address budget reached, the federation was only partially crawled.\n");
    }
    report.push('\n');

    if graph.node_count() > 0 {
        report.push_str(RULE);
        report.push_str("PROVIDERS\n");
        report.push_str(RULE);
        report.push('\n');

        for provider in graph.providers() {
            report.push_str(&format!("{} [{}]\n", provider.label, provider.id));

            let mut extensions = Vec::new();
            let mut peers = Vec::new();
            for edge in graph.outgoing(&provider.id) {
                match graph.node(&edge.to) {
                    Some(node) if node.kind == NodeKind::Extension => extensions.push((edge, node)),
                    Some(node) => peers.push((edge, node)),
                    None => {}
                }
            }

            if extensions.is_empty() && peers.is_empty() {
                report.push_str("  (no document merged)\n");
            }
            for (edge, node) in extensions {
                report.push_str(&format!("  ☎ {:<8} {}\n", edge.label, node.label));
            }
            for (edge, node) in peers {
                report.push_str(&format!("  → {:<8} {} [{}]\n", edge.label, node.label, node.id));
            }
            report.push('\n');
        }
    }

    if !result.failures.is_empty() {
        report.push_str(RULE);
        report.push_str("FAILURES\n");
        report.push_str(RULE);
        report.push('\n');
        for failure in &result.failures {
            report.push_str(&format!(
                "  [{}] {}\n        {}\n",
                failure.kind, failure.address, failure.message
            ));
        }
        report.push('\n');
    }

    report
}

pub fn generate_json_graph_report(result: &CrawlResult) -> Result<String, serde_json::Error> {
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "Mandala",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json",
            },
            "crawl": {
                "seed": result.seed,
                "fetched": result.fetched,
                "failures": result.failures,
                "truncated": result.truncated,
            },
            "summary": {
                "providers": result.graph.providers().count(),
                "extensions": result.graph.extensions().count(),
                "edges": result.graph.edge_count(),
            },
            "graph": result.graph,
        }
    });

    serde_json::to_string_pretty(&json_report)
}

/// Graphviz rendering: providers as boxes, extensions as ellipses, edges
/// labelled with their prefix or extension number.
pub fn generate_dot(graph: &Graph) -> String {
    render_dot(&graph.to_petgraph())
}

fn render_dot(projected: &DiGraph<Node, String>) -> String {
    let dot = Dot::with_attr_getters(
        projected,
        &[],
        &|_, _| String::new(),
        &|_, (_, node)| match node.kind {
            NodeKind::Provider => "shape=box".to_string(),
            NodeKind::Extension => "shape=ellipse".to_string(),
        },
    );
    format!("{}", dot)
}

pub fn generate_route_report(
    graph: &Graph,
    start: &str,
    target: &str,
    path: Option<&Path>,
    format: ReportFormat,
) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(generate_text_route_report(graph, start, target, path)),
        ReportFormat::Json => generate_json_route_report(start, target, path),
        ReportFormat::Dot => Ok(match path {
            Some(path) => generate_route_dot(path),
            None => format!(
                "// {}digraph {{\n}}\n",
                generate_text_route_report(graph, start, target, None)
            ),
        }),
    }
}

fn display_name(graph: &Graph, id: &str) -> String {
    graph
        .node(id)
        .map(|n| n.label.clone())
        .unwrap_or_else(|| id.to_string())
}

/// Renders a route as `A (prefix) → B (extension) → Target`, followed by
/// the number to dial.
pub fn format_route(path: &Path) -> String {
    let mut parts: Vec<String> = path
        .steps
        .iter()
        .map(|step| format!("{} ({})", step.node.label, step.edge.label))
        .collect();
    parts.push(path.target.label.clone());
    parts.join(" → ")
}

pub fn generate_text_route_report(graph: &Graph, start: &str, target: &str, path: Option<&Path>) -> String {
    let from = display_name(graph, start);
    let to = display_name(graph, target);

    match path {
        Some(path) => {
            let mut report = String::new();
            report.push_str(&format!("Route from {} to {}:\n", from, to));
            report.push_str(&format!("  {}\n", format_route(path)));
            report.push_str(&format!("Dial:           {}\n", path.dial_number()));
            report.push_str(&format!("Hops:           {}\n", path.len()));
            report.push_str(&format!("Provider hops:  {}\n", path.provider_hops()));
            report
        }
        None => format!("No route from {} to {} was found.\n", from, to),
    }
}

pub fn generate_json_route_report(
    start: &str,
    target: &str,
    path: Option<&Path>,
) -> Result<String, serde_json::Error> {
    let json_report = serde_json::json!({
        "from": start,
        "to": target,
        "found": path.is_some(),
        "dial_number": path.map(Path::dial_number),
        "provider_hops": path.map(Path::provider_hops),
        "route": path,
    });

    serde_json::to_string_pretty(&json_report)
}

fn generate_route_dot(path: &Path) -> String {
    let mut projected = DiGraph::new();
    let mut previous = None;
    for step in &path.steps {
        let index = projected.add_node(step.node.clone());
        if let Some((from, label)) = previous.take() {
            projected.add_edge(from, index, label);
        }
        previous = Some((index, step.edge.label.clone()));
    }
    let target = projected.add_node(path.target.clone());
    if let Some((from, label)) = previous {
        projected.add_edge(from, target, label);
    }
    render_dot(&projected)
}

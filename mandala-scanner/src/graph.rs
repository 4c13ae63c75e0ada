use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Provider,
    Extension,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Provider => write!(f, "provider"),
            NodeKind::Extension => write!(f, "extension"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
}

impl Node {
    pub fn provider(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind: NodeKind::Provider,
        }
    }

    pub fn extension(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind: NodeKind::Extension,
        }
    }

    pub fn is_provider(&self) -> bool {
        self.kind == NodeKind::Provider
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// Directed, labelled relation. The label is an extension number for
/// provider -> extension edges and a routing prefix for provider -> provider edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub label: String,
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            label: label.into(),
        }
    }
}

/// Append-only directed multigraph of the federation.
///
/// Nodes are unique by id and kept in discovery order. Edges may repeat
/// between the same pair of nodes. Outgoing edges of a node are returned in
/// the order they were added, which is the declaration order of the source
/// documents.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    #[serde(skip)]
    index: HashMap<String, usize>,
    #[serde(skip)]
    outgoing: HashMap<String, Vec<usize>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `node` unless a node with the same id already exists.
    /// Returns whether the node was inserted.
    pub fn add_node(&mut self, node: Node) -> bool {
        if self.index.contains_key(&node.id) {
            return false;
        }
        self.index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        true
    }

    pub fn add_edge(&mut self, edge: Edge) {
        self.outgoing
            .entry(edge.from.clone())
            .or_default()
            .push(self.edges.len());
        self.edges.push(edge);
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn outgoing<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a Edge> + use<'a> {
        self.outgoing
            .get(id)
            .into_iter()
            .flatten()
            .map(move |&i| &self.edges[i])
    }

    pub fn providers(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.kind == NodeKind::Provider)
    }

    pub fn extensions(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.kind == NodeKind::Extension)
    }

    /// Finds the extension node a provider advertises under `extension`.
    pub fn find_extension(&self, provider_id: &str, extension: &str) -> Option<&Node> {
        self.outgoing(provider_id)
            .filter(|e| e.label == extension)
            .filter_map(|e| self.node(&e.to))
            .find(|n| n.kind == NodeKind::Extension)
    }

    /// Projects the graph into petgraph, e.g. for DOT export.
    pub fn to_petgraph(&self) -> DiGraph<Node, String> {
        let mut projected = DiGraph::with_capacity(self.nodes.len(), self.edges.len());
        let indices: HashMap<&str, NodeIndex> = self
            .nodes
            .iter()
            .map(|n| (n.id.as_str(), projected.add_node(n.clone())))
            .collect();

        for edge in &self.edges {
            if let (Some(&from), Some(&to)) =
                (indices.get(edge.from.as_str()), indices.get(edge.to.as_str()))
            {
                projected.add_edge(from, to, edge.label.clone());
            }
        }
        projected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Graph {
        let mut graph = Graph::new();
        graph.add_node(Node::provider("p1", "Provider One"));
        graph.add_node(Node::provider("p2", "Provider Two"));
        graph.add_node(Node::extension("p1#0", "Reception"));
        graph.add_edge(Edge::new("p1", "p1#0", "100"));
        graph.add_edge(Edge::new("p1", "p2", "8"));
        graph.add_edge(Edge::new("p1", "p2", "9"));
        graph
    }

    #[test]
    fn test_add_node_is_idempotent_by_id() {
        let mut graph = sample();
        assert!(!graph.add_node(Node::provider("p1", "Renamed")));
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.node("p1").unwrap().label, "Provider One");
    }

    #[test]
    fn test_outgoing_keeps_insertion_order_and_parallel_edges() {
        let graph = sample();
        let labels: Vec<&str> = graph.outgoing("p1").map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["100", "8", "9"]);
        assert_eq!(graph.outgoing("p2").count(), 0);
        assert_eq!(graph.outgoing("missing").count(), 0);
    }

    #[test]
    fn test_find_extension() {
        let graph = sample();
        assert_eq!(graph.find_extension("p1", "100").unwrap().id, "p1#0");
        // prefix edges point at providers, not extensions
        assert!(graph.find_extension("p1", "8").is_none());
        assert!(graph.find_extension("p2", "100").is_none());
    }

    #[test]
    fn test_kind_filters() {
        let graph = sample();
        assert_eq!(graph.providers().count(), 2);
        assert_eq!(graph.extensions().count(), 1);
    }

    #[test]
    fn test_to_petgraph() {
        let projected = sample().to_petgraph();
        assert_eq!(projected.node_count(), 3);
        assert_eq!(projected.edge_count(), 3);
    }

    #[test]
    fn test_serializes_nodes_and_edges_only() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["nodes"].as_array().unwrap().len(), 3);
        assert_eq!(json["edges"].as_array().unwrap().len(), 3);
        assert_eq!(json["nodes"][2]["kind"], "extension");
        assert!(json.get("index").is_none());
    }
}

// Route search over a crawled federation graph

use mandala_scanner::{Edge, Graph, Node};
use serde::Serialize;
use std::collections::{HashSet, VecDeque};
use tracing::debug;

/// How many provider nodes a route may leave before it is pruned.
pub const DEFAULT_MAX_PROVIDER_HOPS: usize = 2;

#[derive(Debug, Clone, Copy)]
pub struct PathOptions {
    pub max_provider_hops: usize,
}

impl Default for PathOptions {
    fn default() -> Self {
        Self {
            max_provider_hops: DEFAULT_MAX_PROVIDER_HOPS,
        }
    }
}

/// One hop of a route: the node being left and the edge taken out of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathStep {
    pub node: Node,
    pub edge: Edge,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Path {
    pub steps: Vec<PathStep>,
    pub target: Node,
}

impl Path {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Number of provider nodes the route passes through.
    pub fn provider_hops(&self) -> usize {
        self.steps.iter().filter(|s| s.node.is_provider()).count()
    }

    /// The edge labels along the route, concatenated: the routing prefixes
    /// followed by the extension number.
    pub fn dial_number(&self) -> String {
        self.steps.iter().map(|s| s.edge.label.as_str()).collect()
    }
}

struct SearchState {
    node: String,
    steps: Vec<PathStep>,
    provider_hops: usize,
}

/// Breadth-first search from `start` to `target`.
///
/// Returns the first route found, which has the fewest edges among routes
/// that leave at most `max_provider_hops` providers. Among equally short
/// routes the one using earlier-declared edges wins. `None` means no such
/// route exists, including when either id is unknown.
pub fn find_path(graph: &Graph, start: &str, target: &str, options: &PathOptions) -> Option<Path> {
    let mut visited: HashSet<String> = HashSet::new();
    let mut queue: VecDeque<SearchState> = VecDeque::new();
    queue.push_back(SearchState {
        node: start.to_string(),
        steps: Vec::new(),
        provider_hops: 0,
    });

    while let Some(state) = queue.pop_front() {
        if !visited.insert(state.node.clone()) {
            continue;
        }

        let Some(current) = graph.node(&state.node) else {
            continue;
        };

        if state.node == target {
            debug!("Route {} -> {} found after visiting {} nodes", start, target, visited.len());
            return Some(Path {
                steps: state.steps,
                target: current.clone(),
            });
        }

        let is_provider = current.is_provider();
        if is_provider && state.provider_hops >= options.max_provider_hops {
            continue;
        }

        let provider_hops = state.provider_hops + usize::from(is_provider);
        for edge in graph.outgoing(&state.node) {
            let mut steps = state.steps.clone();
            steps.push(PathStep {
                node: current.clone(),
                edge: edge.clone(),
            });
            queue.push_back(SearchState {
                node: edge.to.clone(),
                steps,
                provider_hops,
            });
        }
    }

    debug!("No route {} -> {} after visiting {} nodes", start, target, visited.len());
    None
}

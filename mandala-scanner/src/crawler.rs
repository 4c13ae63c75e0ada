use crate::document::Mantela;
use crate::error::Result;
use crate::graph::{Edge, Graph, Node};
use crate::result::{CrawlFailure, CrawlResult};
use crate::source::{DocumentSource, HttpSource};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// Called before each fetch with the number of documents merged so far and
/// the address about to be fetched.
pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;

/// Breadth-first crawler over a mantela federation.
///
/// Fetches are strictly sequential: the next address is only fetched once the
/// previous one has been merged or has failed, so the frontier and the graph
/// need no synchronization.
pub struct Crawler {
    source: Box<dyn DocumentSource>,
    max_documents: Option<usize>,
    progress_callback: Option<ProgressCallback>,
}

impl Crawler {
    pub fn new(source: impl DocumentSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            max_documents: None,
            progress_callback: None,
        }
    }

    /// Crawler backed by [`HttpSource`] with the given per-fetch timeout.
    pub fn http(timeout_secs: u64) -> Result<Self> {
        Ok(Self::new(HttpSource::with_timeout(timeout_secs)?))
    }

    /// Stops once this many addresses have been fetched, whether or not the
    /// fetch succeeded.
    pub fn with_max_documents(mut self, max_documents: usize) -> Self {
        self.max_documents = Some(max_documents);
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Crawls the federation reachable from `seed`. Individual fetch or parse
    /// failures are recorded in the result and never abort the crawl.
    pub async fn crawl(&self, seed: &str) -> CrawlResult {
        info!("Starting crawl from {}", seed);

        let mut result = CrawlResult::new(seed.to_string());
        let mut visited: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<String> = VecDeque::new();
        let mut sequence = 0usize;

        queue.push_back(normalize_address(seed));

        while let Some(address) = queue.pop_front() {
            if visited.contains(&address) {
                continue;
            }

            // Counts attempted addresses, failed ones included.
            if let Some(max) = self.max_documents
                && visited.len() >= max
            {
                info!("Budget of {} addresses reached, leaving {} queued", max, queue.len() + 1);
                result.truncated = true;
                break;
            }

            // Marked before fetching so a failing address is not retried either.
            visited.insert(address.clone());

            if let Some(ref callback) = self.progress_callback {
                callback(result.fetched.len(), address.clone());
            }

            debug!("Fetching {}", address);
            let document = match self.source.fetch(&address).await {
                Ok(document) => document,
                Err(e) => {
                    warn!("Skipping {}: {}", address, e);
                    result.failures.push(CrawlFailure::from_error(address, &e));
                    continue;
                }
            };

            let Some(peers) = merge_document(&mut result.graph, &document, &mut sequence) else {
                warn!(
                    "Skipping {}: identifier '{}' is already an extension id",
                    address, document.about_me.identifier
                );
                result
                    .failures
                    .push(CrawlFailure::conflict(address, &document.about_me.identifier));
                continue;
            };
            for peer in peers {
                debug!("Queuing {} (from {})", peer, address);
                queue.push_back(peer);
            }
            result.fetched.push(address);
        }

        info!(
            "Crawl complete. {} documents, {} nodes, {} edges, {} failures",
            result.fetched.len(),
            result.graph.node_count(),
            result.graph.edge_count(),
            result.failures.len()
        );
        result
    }
}

/// Adds one document's provider, extensions and peers to `graph` and returns
/// the peer addresses to crawl next, or `None` when the document's own
/// identifier is already taken by an extension node.
///
/// A peer node created here keeps the name the referencing document gave it,
/// even if the peer later describes itself differently.
fn merge_document(graph: &mut Graph, document: &Mantela, sequence: &mut usize) -> Option<Vec<String>> {
    let me = &document.about_me;
    if is_extension(graph, &me.identifier) {
        return None;
    }
    graph.add_node(Node::provider(&me.identifier, &me.name));

    // Identifiers this document names can't be handed out as extension ids.
    let named: HashSet<&str> = document
        .providers
        .iter()
        .map(|entry| entry.identifier.as_str())
        .chain(std::iter::once(me.identifier.as_str()))
        .collect();

    for entry in &document.extensions {
        let id = next_extension_id(graph, &named, &me.identifier, sequence);
        graph.add_node(Node::extension(&id, &entry.name));
        graph.add_edge(Edge::new(&me.identifier, id, &entry.extension));
    }

    let mut peers = Vec::with_capacity(document.providers.len());
    for entry in &document.providers {
        if is_extension(graph, &entry.identifier) {
            warn!(
                "Ignoring peer '{}' of {}: identifier is already an extension id",
                entry.identifier, me.identifier
            );
            continue;
        }
        graph.add_node(Node::provider(&entry.identifier, &entry.name));
        graph.add_edge(Edge::new(&me.identifier, &entry.identifier, &entry.prefix));

        let address = normalize_address(&entry.mantela);
        if !address.is_empty() {
            peers.push(address);
        }
    }
    Some(peers)
}

fn is_extension(graph: &Graph, id: &str) -> bool {
    graph.node(id).is_some_and(|node| !node.is_provider())
}

/// `"{provider}#{n}"` for the first `n` from `sequence` not already in use.
fn next_extension_id(graph: &Graph, named: &HashSet<&str>, provider: &str, sequence: &mut usize) -> String {
    loop {
        let id = format!("{}#{}", provider, sequence);
        *sequence += 1;
        if !graph.contains(&id) && !named.contains(id.as_str()) {
            return id;
        }
    }
}

/// Canonical form of an address used for de-duplication. URLs lose their
/// fragment; anything else is only trimmed.
pub fn normalize_address(address: &str) -> String {
    let trimmed = address.trim();
    match Url::parse(trimmed) {
        Ok(mut url) => {
            url.set_fragment(None);
            url.to_string()
        }
        Err(_) => trimmed.to_string(),
    }
}

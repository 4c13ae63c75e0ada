use crate::error::ScanError;
use crate::graph::Graph;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    Fetch,
    Parse,
    /// The document's own identifier is already an extension id in the graph.
    Conflict,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Fetch => write!(f, "fetch"),
            FailureKind::Parse => write!(f, "parse"),
            FailureKind::Conflict => write!(f, "conflict"),
        }
    }
}

/// An address whose document could not be used. The crawl carried on without it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlFailure {
    pub address: String,
    pub kind: FailureKind,
    pub message: String,
}

impl CrawlFailure {
    pub fn from_error(address: String, error: &ScanError) -> Self {
        let kind = if error.is_parse_failure() {
            FailureKind::Parse
        } else {
            FailureKind::Fetch
        };
        Self {
            address,
            kind,
            message: error.to_string(),
        }
    }

    pub fn conflict(address: String, identifier: &str) -> Self {
        Self {
            address,
            kind: FailureKind::Conflict,
            message: format!("identifier '{}' is already used by an extension", identifier),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CrawlResult {
    pub seed: String,
    pub graph: Graph,
    /// Addresses whose documents were fetched and merged, in crawl order.
    pub fetched: Vec<String>,
    pub failures: Vec<CrawlFailure>,
    /// Set when the address budget ran out before the frontier was empty.
    pub truncated: bool,
}

impl CrawlResult {
    pub fn new(seed: String) -> Self {
        Self {
            seed,
            graph: Graph::new(),
            fetched: Vec::new(),
            failures: Vec::new(),
            truncated: false,
        }
    }
}

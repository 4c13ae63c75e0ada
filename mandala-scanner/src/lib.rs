pub mod crawler;
pub mod document;
pub mod error;
pub mod graph;
pub mod result;
pub mod source;

pub use crawler::Crawler;
pub use document::Mantela;
pub use error::ScanError;
pub use graph::{Edge, Graph, Node, NodeKind};
pub use result::{CrawlFailure, CrawlResult, FailureKind};
pub use source::{DocumentSource, HttpSource, MemorySource};

pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{crawl_options_from_args, parse_seed, resolve_target, write_report};

// Re-export route search and crawl functionality from mandala-core
pub use mandala_core::{
    CrawlOptions, PathOptions, ReportFormat, execute_crawl, find_path,
};

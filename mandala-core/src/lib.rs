pub mod crawl;
pub mod path;
pub mod report;

pub use crawl::{CrawlOptions, CrawlProgressCallback, execute_crawl, execute_crawl_with_source};
pub use path::{DEFAULT_MAX_PROVIDER_HOPS, Path, PathOptions, PathStep, find_path};
pub use report::ReportFormat;

/// Printed to stderr so reports on stdout stay machine-readable.
pub fn print_banner() {
    eprintln!(
        r#"
   __  __                 _       _
  |  \/  | __ _ _ __   __| | __ _| | __ _
  | |\/| |/ _` | '_ \ / _` |/ _` | |/ _` |
  | |  | | (_| | | | | (_| | (_| | | (_| |
  |_|  |_|\__,_|_| |_|\__,_|\__,_|_|\__,_|
        mantela federation explorer v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}

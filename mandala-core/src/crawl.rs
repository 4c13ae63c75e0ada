use indicatif::{ProgressBar, ProgressStyle};
use mandala_scanner::crawler::ProgressCallback;
use mandala_scanner::source::DEFAULT_TIMEOUT_SECS;
use mandala_scanner::{CrawlResult, Crawler, DocumentSource, HttpSource};
use std::sync::Arc;
use std::time::Duration;

/// Options for configuring a crawl operation
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Address of the first mantela document. `None` leaves the crawler idle.
    pub seed: Option<String>,
    pub timeout_secs: u64,
    pub max_documents: Option<usize>,
    pub show_progress_bars: bool,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            seed: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_documents: None,
            show_progress_bars: false,
        }
    }
}

/// Callback for reporting crawl progress
pub type CrawlProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Execute a crawl over HTTP with the given options.
///
/// Returns `Ok(None)` when no seed was given. Fetch failures are part of the
/// returned result; the only error is failing to set up the HTTP client.
pub async fn execute_crawl(
    options: CrawlOptions,
    progress_callback: Option<CrawlProgressCallback>,
) -> Result<Option<CrawlResult>, String> {
    if options.seed.is_none() {
        return Ok(None);
    }

    let source = HttpSource::with_timeout(options.timeout_secs)
        .map_err(|e| format!("Failed to create HTTP client: {}", e))?;

    Ok(execute_crawl_with_source(options, source, progress_callback).await)
}

/// Same as [`execute_crawl`], reading documents from `source`.
pub async fn execute_crawl_with_source(
    options: CrawlOptions,
    source: impl DocumentSource + 'static,
    progress_callback: Option<CrawlProgressCallback>,
) -> Option<CrawlResult> {
    let CrawlOptions {
        seed,
        max_documents,
        show_progress_bars,
        ..
    } = options;
    let seed = seed?;

    let progress_bar = if show_progress_bars {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Starting crawl...");
        Some(pb)
    } else {
        None
    };

    let pb_clone = progress_bar.clone();
    let internal_callback: ProgressCallback = Arc::new(move |fetched: usize, address: String| {
        if let Some(ref pb) = pb_clone {
            pb.set_message(format!("{} documents merged, fetching {}", fetched, address));
        }
        if let Some(ref callback) = progress_callback {
            callback(address);
        }
    });

    let mut crawler = Crawler::new(source).with_progress_callback(internal_callback);
    if let Some(max) = max_documents {
        crawler = crawler.with_max_documents(max);
    }

    let result = crawler.crawl(&seed).await;

    if let Some(pb) = progress_bar {
        pb.finish_and_clear();
    }

    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mandala_scanner::MemorySource;
    use std::sync::Mutex;

    #[tokio::test]
    async fn test_no_seed_is_idle() {
        let result = execute_crawl(CrawlOptions::default(), None).await;
        assert!(matches!(result, Ok(None)));
    }

    #[tokio::test]
    async fn test_progress_callback_receives_addresses() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let source = MemorySource::new().with_document(
            "a",
            r#"{"aboutMe":{"identifier":"a","name":"A"},"providers":[{"identifier":"b","name":"B","prefix":"2","mantela":"b"}]}"#,
        );

        let options = CrawlOptions {
            seed: Some("a".to_string()),
            ..CrawlOptions::default()
        };
        let result = execute_crawl_with_source(
            options,
            source,
            Some(Arc::new(move |address: String| seen_clone.lock().unwrap().push(address))),
        )
        .await
        .unwrap();

        assert_eq!(result.fetched, vec!["a"]);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(*seen.lock().unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_max_documents_is_forwarded() {
        let source = MemorySource::new().with_document(
            "a",
            r#"{"aboutMe":{"identifier":"a","name":"A"},"providers":[{"identifier":"b","name":"B","prefix":"2","mantela":"b"}]}"#,
        );

        let options = CrawlOptions {
            seed: Some("a".to_string()),
            max_documents: Some(1),
            ..CrawlOptions::default()
        };
        let result = execute_crawl_with_source(options, source, None).await.unwrap();

        assert!(result.truncated);
    }
}

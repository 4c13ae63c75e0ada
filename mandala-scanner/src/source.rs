use crate::document::Mantela;
use crate::error::{Result, ScanError};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;
use url::Url;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Where mantela documents come from. The crawler only needs
/// "fetch the document at this address, or fail".
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch(&self, address: &str) -> Result<Mantela>;
}

/// Fetches documents over HTTP(S).
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("Mandala/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.div_ceil(2)))
            .pool_idle_timeout(Duration::from_secs(90))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl DocumentSource for HttpSource {
    async fn fetch(&self, address: &str) -> Result<Mantela> {
        let url = Url::parse(address)
            .map_err(|e| ScanError::InvalidAddress(format!("{}: {}", address, e)))?;

        debug!("GET {}", url);
        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.text().await?;

        Mantela::from_json(&body)
    }
}

/// Serves documents from memory, keyed by address. Counts every fetch so
/// callers can check how often each address was requested.
#[derive(Default)]
pub struct MemorySource {
    documents: HashMap<String, String>,
    fetches: Mutex<Vec<String>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, address: impl Into<String>, body: impl Into<String>) -> Self {
        self.documents.insert(address.into(), body.into());
        self
    }

    pub fn insert(&mut self, address: impl Into<String>, body: impl Into<String>) {
        self.documents.insert(address.into(), body.into());
    }

    /// Every address requested so far, in request order.
    pub async fn fetches(&self) -> Vec<String> {
        self.fetches.lock().await.clone()
    }

    pub async fn fetch_count(&self, address: &str) -> usize {
        self.fetches
            .lock()
            .await
            .iter()
            .filter(|a| a.as_str() == address)
            .count()
    }
}

#[async_trait]
impl DocumentSource for MemorySource {
    async fn fetch(&self, address: &str) -> Result<Mantela> {
        self.fetches.lock().await.push(address.to_string());

        let body = self
            .documents
            .get(address)
            .ok_or_else(|| ScanError::NotFound(address.to_string()))?;
        Mantela::from_json(body)
    }
}

#[async_trait]
impl<S: DocumentSource + ?Sized> DocumentSource for std::sync::Arc<S> {
    async fn fetch(&self, address: &str) -> Result<Mantela> {
        (**self).fetch(address).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    const DOC: &str = r#"{
        "aboutMe": { "identifier": "tokyo", "name": "Tokyo" },
        "extensions": [ { "name": "Reception", "extension": "100" } ],
        "providers": []
    }"#;

    #[tokio::test]
    async fn test_http_fetch_parses_document() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/mantela.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/json")
                    .set_body_string(DOC),
            )
            .mount(&mock_server)
            .await;

        let source = HttpSource::new().unwrap();
        let doc = source
            .fetch(&format!("{}/mantela.json", mock_server.uri()))
            .await
            .unwrap();

        assert_eq!(doc.about_me.identifier, "tokyo");
        assert_eq!(doc.extensions.len(), 1);
    }

    #[tokio::test]
    async fn test_http_error_status_is_fetch_failure() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/mantela.json"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let source = HttpSource::new().unwrap();
        let err = source
            .fetch(&format!("{}/mantela.json", mock_server.uri()))
            .await
            .unwrap_err();

        assert!(matches!(err, ScanError::HttpError(_)));
        assert!(!err.is_parse_failure());
    }

    #[tokio::test]
    async fn test_http_garbage_body_is_parse_failure() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/mantela.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
            .mount(&mock_server)
            .await;

        let source = HttpSource::new().unwrap();
        let err = source
            .fetch(&format!("{}/mantela.json", mock_server.uri()))
            .await
            .unwrap_err();

        assert!(err.is_parse_failure());
    }

    #[tokio::test]
    async fn test_http_slow_response_times_out() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(DOC)
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&mock_server)
            .await;

        let source = HttpSource::with_timeout(1).unwrap();
        let err = source
            .fetch(&format!("{}/slow.json", mock_server.uri()))
            .await
            .unwrap_err();

        assert!(matches!(err, ScanError::HttpError(ref e) if e.is_timeout()));
    }

    #[tokio::test]
    async fn test_http_rejects_non_url_address() {
        let source = HttpSource::new().unwrap();
        let err = source.fetch("not a url").await.unwrap_err();
        assert!(matches!(err, ScanError::InvalidAddress(_)));
    }

    #[tokio::test]
    async fn test_memory_source_records_fetches() {
        let source = MemorySource::new().with_document("a", DOC);

        assert!(source.fetch("a").await.is_ok());
        assert!(matches!(
            source.fetch("b").await,
            Err(ScanError::NotFound(_))
        ));
        assert_eq!(source.fetch_count("a").await, 1);
        assert_eq!(source.fetches().await, vec!["a", "b"]);
    }
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("No document at {0}")]
    NotFound(String),

    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),
}

impl ScanError {
    /// Whether the failure happened while reading the document rather than fetching it.
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, ScanError::ParseError(_))
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;

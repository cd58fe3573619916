use reqwest::StatusCode;
use url::Url;

/// Errors surfaced by the download engine.
#[derive(Debug, thiserror::Error)]
pub enum RipError {
    #[error("Manifest parse error: {0}")]
    ManifestParse(String),

    #[error("Selection {ordinal} is out of range (1..={available})")]
    SelectionOutOfRange { ordinal: usize, available: usize },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} fetching {url}")]
    Status { status: StatusCode, url: Url },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Mux failed: {0}")]
    MuxFailure(String),
}

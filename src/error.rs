use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportAnalystError {
    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to decode document: {0}")]
    Decode(String),

    #[error("Completion service error: {0}")]
    RemoteService(String),

    #[error("Expected fenced `{tag}` block was missing or unparsable: {details}")]
    ExtractionMismatch { tag: String, details: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for ReportAnalystError {
    fn from(err: reqwest::Error) -> Self {
        ReportAnalystError::RemoteService(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ReportAnalystError>;

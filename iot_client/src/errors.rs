use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {0}")]
    Status(reqwest::StatusCode),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid timestamp: {0}")]
    Timestamp(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Transport failures as opposed to a document that arrived but was unusable
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Http(_) | Error::Status(_) | Error::Io(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

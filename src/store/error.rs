use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] ureq::Error),

    #[error("backend error ({code}): {message}")]
    Backend { code: u16, message: String },

    #[error("base64 decode error: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("invalid UTF-8 in remote content: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("remote store misconfigured: {0}")]
    Misconfigured(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("post not found: {0}")]
    PostNotFound(String),

    #[error("invalid import: {0}")]
    InvalidImport(String),

    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

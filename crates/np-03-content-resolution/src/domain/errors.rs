//! # Content Errors
//!
//! All variants are `CONTENT_RESOLUTION_FAILED`; the backend is kept for
//! observability. Callers retry them through the sweep.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContentError {
    #[error("Content resolution failed (ipfs): {0}")]
    Ipfs(String),

    #[error("Content resolution failed (subgraph): {0}")]
    Subgraph(String),

    #[error("Content resolution failed (chat): {0}")]
    Chat(String),

    /// Pointer or fetched document does not have the expected shape.
    #[error("Content resolution failed (invalid payload): {0}")]
    InvalidPayload(String),
}

impl From<shared_types::DirectoryError> for ContentError {
    fn from(err: shared_types::DirectoryError) -> Self {
        ContentError::Chat(err.to_string())
    }
}

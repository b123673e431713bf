//! # Feed Errors

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FeedError {
    /// `data.type` missing or not one of 1, 3, 4.
    #[error("Invalid payload type: {0}")]
    InvalidPayloadType(String),

    /// Subset payload without a recipient map.
    #[error("Subset payload has no recipient map")]
    MissingRecipients,

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

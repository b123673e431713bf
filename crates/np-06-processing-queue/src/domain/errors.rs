//! # Queue Errors
//!
//! `QueueError` is what ingestion callers see. `PipelineError` never
//! reaches a caller during a sweep; it only bumps the row's attempts.

use crate::ports::outbound::StoreError;
use np_01_payload_codec::CodecError;
use np_03_content_resolution::ContentError;
use np_04_feed_composition::FeedError;
use np_05_recipient_resolution::RecipientError;
use shared_types::DirectoryError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error(transparent)]
    Identity(#[from] CodecError),

    #[error("Content resolution failed: {0}")]
    Content(#[from] ContentError),

    #[error("Feed composition failed: {0}")]
    Feed(#[from] FeedError),

    #[error("Recipient resolution failed: {0}")]
    Recipients(#[from] RecipientError),

    #[error("Directory error: {0}")]
    Directory(String),
}

impl From<DirectoryError> for PipelineError {
    fn from(err: DirectoryError) -> Self {
        PipelineError::Directory(err.to_string())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error(transparent)]
    Identity(#[from] CodecError),

    #[error("Invalid sender: {0}")]
    InvalidSender(String),

    /// Rejected at ingestion; the scheme's reason is retained.
    #[error("Verification failed: {0}")]
    VerificationFailed(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("Directory error: {0}")]
    Directory(String),
}

impl From<DirectoryError> for QueueError {
    fn from(err: DirectoryError) -> Self {
        QueueError::Directory(err.to_string())
    }
}

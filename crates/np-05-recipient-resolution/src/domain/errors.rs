//! # Recipient Errors
//!
//! A settings mismatch is never an error; it only makes a subscriber
//! ineligible.

use shared_types::DirectoryError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecipientError {
    /// Subset recipient map larger than the configured maximum.
    #[error("Subset has {count} recipients, limit is {max}")]
    SubsetLimitExceeded { count: usize, max: usize },

    /// Subset payload whose recipients are not an address map.
    #[error("Subset payload has no recipient map")]
    MissingRecipients,

    /// Chat senders must carry a `pgpv2` proof.
    #[error("Chat sender requires a pgpv2 proof, got: {0}")]
    UnsupportedChatProof(String),

    #[error("Chat not found: {0}")]
    ChatNotFound(String),

    #[error("Recipient {0} is not a member of the chat")]
    NotChatMember(String),

    #[error("Directory error: {0}")]
    Directory(String),
}

impl From<DirectoryError> for RecipientError {
    fn from(err: DirectoryError) -> Self {
        RecipientError::Directory(err.to_string())
    }
}

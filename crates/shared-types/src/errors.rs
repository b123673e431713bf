//! # Error Types
//!
//! Defines error types used across subsystems.

use thiserror::Error;

/// Errors raised while parsing addresses and enum codes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AddressError {
    /// Not a CAIP-10 address or DID.
    #[error("Malformed CAIP address: {0}")]
    Malformed(String),

    /// Chain id segment is not numeric.
    #[error("Invalid chain id: {0}")]
    InvalidChainId(String),

    /// Sender type code outside 0..=3.
    #[error("Unknown sender type: {0}")]
    UnknownSenderType(u8),
}

/// Errors returned by the channel and chat directories.
#[derive(Debug, Clone, Error)]
pub enum DirectoryError {
    /// The backing store could not be reached or failed the query.
    #[error("Directory unavailable: {0}")]
    Unavailable(String),

    /// A stored value could not be decoded.
    #[error("Corrupt directory record: {0}")]
    Corrupt(String),
}

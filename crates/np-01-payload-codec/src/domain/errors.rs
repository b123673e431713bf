//! # Codec Errors

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    /// Identity is not valid UTF-8/hex or lacks a known storage prefix.
    #[error("Malformed payload identity: {0}")]
    MalformedIdentity(String),

    /// Proof has an unknown scheme or the wrong arity for its scheme.
    #[error("Malformed verification proof: {0}")]
    MalformedProof(String),
}

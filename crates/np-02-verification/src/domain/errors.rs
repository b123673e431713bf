//! # Verification Errors
//!
//! Every variant is a `VERIFICATION_FAILED` reason; the `Display` string is
//! what gets logged and returned to the ingesting caller.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VerificationError {
    /// Proof did not decode, or its scheme is unknown. Not attempted.
    #[error("Malformed proof: {0}")]
    MalformedProof(String),

    #[error("Malformed identity: {0}")]
    MalformedIdentity(String),

    #[error("Malformed sender: {0}")]
    MalformedSender(String),

    /// Channel or alias missing, blocked, deactivated or unverified.
    #[error("Channel ineligible: {0}")]
    ChannelIneligible(String),

    #[error("No communicator configured for chain {0}")]
    UnsupportedChain(u64),

    // -------------------------------------------------------------------------
    // eip155
    // -------------------------------------------------------------------------
    #[error("Transaction receipt not found: {0}")]
    ReceiptNotFound(String),

    #[error("No SendNotification log from the communicator")]
    NoMatchingLog,

    #[error("Event log could not be decoded: {0}")]
    EventDecode(String),

    #[error("On-chain channel {actual} does not match sender {expected}")]
    EventChannelMismatch { expected: String, actual: String },

    #[error("On-chain identity does not match the payload identity")]
    EventIdentityMismatch,

    // -------------------------------------------------------------------------
    // eip712
    // -------------------------------------------------------------------------
    #[error("Invalid signature format: {0}")]
    InvalidSignature(String),

    /// EIP-2: S must be in the lower half of the curve order.
    #[error("Malleable signature (high S value)")]
    MalleableSignature,

    #[error("Invalid recovery ID: {0}")]
    InvalidRecoveryId(u8),

    #[error("Failed to recover public key")]
    RecoveryFailed,

    #[error("Signer {0} is neither the sender nor a delegate")]
    SignerNotAuthorized(String),

    // -------------------------------------------------------------------------
    // thegraph
    // -------------------------------------------------------------------------
    #[error("Channel has no subgraph {0}")]
    SubgraphMismatch(String),

    #[error("Notification number mismatch: proof {proof}, identity {identity}")]
    NotificationNumberMismatch { proof: String, identity: String },

    // -------------------------------------------------------------------------
    // pgpv2 / w2wv1
    // -------------------------------------------------------------------------
    #[error("No public key registered for {0}")]
    MissingPublicKey(String),

    #[error("PGP signature invalid")]
    PgpSignatureInvalid,

    #[error("Chat not found: {0}")]
    ChatNotFound(String),

    #[error("{0} is not a member of the chat")]
    NotChatMember(String),

    #[error("{0} has not approved the chat")]
    NoChatIntent(String),

    #[error("Video call rejected: {0}")]
    VideoCallRejected(String),

    #[error("Message not found: {0}")]
    MessageNotFound(String),

    #[error("Message origin {0} matches neither the proof DID nor the sender")]
    MessageOriginMismatch(String),

    // -------------------------------------------------------------------------
    // Collaborators
    // -------------------------------------------------------------------------
    #[error("Directory error: {0}")]
    Directory(String),

    #[error("Chain client error: {0}")]
    Chain(String),

    #[error("PGP verifier error: {0}")]
    Pgp(String),
}

impl From<shared_types::DirectoryError> for VerificationError {
    fn from(err: shared_types::DirectoryError) -> Self {
        VerificationError::Directory(err.to_string())
    }
}

impl From<np_01_payload_codec::CodecError> for VerificationError {
    fn from(err: np_01_payload_codec::CodecError) -> Self {
        match err {
            np_01_payload_codec::CodecError::MalformedIdentity(reason) => {
                VerificationError::MalformedIdentity(reason)
            }
            np_01_payload_codec::CodecError::MalformedProof(reason) => {
                VerificationError::MalformedProof(reason)
            }
        }
    }
}

impl VerificationError {
    /// Whether the scheme check never ran (proof unusable).
    pub fn is_not_attempted(&self) -> bool {
        matches!(self, VerificationError::MalformedProof(_))
    }
}

//! # Verification Subsystem (NP-02)
//!
//! Authenticates the origin of incoming notification payloads before they
//! are persisted.
//!
//! ## Architecture
//!
//! This subsystem follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): digests, signer recovery, log decoding, no I/O
//! - **Ports Layer** (`ports/`): `VerificationApi` in, chain/PGP clients out
//! - **Service Layer** (`service.rs`): eligibility checks and scheme dispatch
//!
//! ## Schemes
//!
//! | Proof | Check |
//! |-------|-------|
//! | `eip155:<chainId>` | `SendNotification` log in the tx receipt matches sender and identity |
//! | `eip712v1` / `eip712v2` | typed-data signer is the sender or one of its delegates |
//! | `thegraph` | channel's registered subgraph and notification number match |
//! | `pgpv2` | PGP signature, chat membership and intent, video call rules |
//! | `w2wv1` | referenced chat message originates from the sender |
//!
//! ## Security Notes
//!
//! - **Malleability Prevention (EIP-2)**: Signatures with high S values are rejected
//! - Verification never writes; a rejected payload is never persisted

pub mod domain;
pub mod metrics;
pub mod ports;
pub mod service;

pub use domain::abi::{decode_send_notification, SendNotificationEvent};
pub use domain::ecdsa::{address_from_pubkey, keccak256, EcdsaSignature};
pub use domain::eip712::{typed_data_digest, Eip712Domain, TypedMessage};
pub use domain::entities::{
    LogEntry, TransactionReceipt, VerificationConfig, VerificationOutcome, VerificationRequest,
    VerificationRules,
};
pub use domain::errors::VerificationError;
pub use ports::inbound::VerificationApi;
pub use ports::outbound::{ChainClient, ChainError, PgpError, PgpVerifier};
pub use service::VerificationService;

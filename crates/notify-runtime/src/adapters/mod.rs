//! # Runtime Adapters
//!
//! Outbound-port implementations backed by real infrastructure.

pub mod chain;
pub mod content;
pub mod delivery;
pub mod pgp_verifier;
pub mod seed;

pub use chain::RpcChainClient;
pub use content::HttpContentStore;
pub use delivery::LogTransport;
pub use pgp_verifier::{HttpPgpVerifier, LocalPgpVerifier};
pub use seed::DirectorySeed;

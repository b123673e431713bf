//! # Outbound Ports (Driven Ports / SPI)
//!
//! Channel and chat lookups come from `shared_types` (`ChannelDirectory`,
//! `ChatDirectory`). The ports below are specific to verification.

use crate::domain::entities::TransactionReceipt;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainError {
    /// No RPC endpoint is configured for the chain.
    #[error("No RPC endpoint for chain {0}")]
    UnknownChain(u64),

    #[error("RPC error: {0}")]
    Rpc(String),
}

/// Read access to the chains the communicator is deployed on.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// `Ok(None)` when the transaction is unknown or still pending.
    async fn get_transaction_receipt(
        &self,
        chain_id: u64,
        tx_hash: &str,
    ) -> Result<Option<TransactionReceipt>, ChainError>;
}

#[derive(Debug, Error)]
pub enum PgpError {
    #[error("Invalid public key: {0}")]
    InvalidKey(String),

    #[error("PGP backend error: {0}")]
    Backend(String),
}

/// Detached-signature check against an armored public key.
#[async_trait]
pub trait PgpVerifier: Send + Sync {
    async fn verify(
        &self,
        message: &str,
        signature: &str,
        public_key: &str,
    ) -> Result<bool, PgpError>;
}

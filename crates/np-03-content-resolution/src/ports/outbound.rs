//! # Outbound Ports (Driven Ports / SPI)
//!
//! Stored chat messages are read through `shared_types::ChatDirectory`.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContentStoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Backend error: {0}")]
    Backend(String),
}

/// "Fetch JSON by pointer" services.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Fetch a JSON document from IPFS by CID.
    async fn get_by_pointer(&self, pointer: &str) -> Result<Value, ContentStoreError>;

    /// Run a GraphQL query against a subgraph endpoint; returns the full
    /// response document (`{"data": {...}}`).
    async fn query(&self, endpoint: &str, query: &str) -> Result<Value, ContentStoreError>;
}

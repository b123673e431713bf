//! # Outbound Ports (Driven Ports / SPI)

use crate::domain::entities::{FeedRecord, NewPayload, PayloadItem};
use async_trait::async_trait;
use np_04_feed_composition::FeedItem;
use serde_json::Value;
use shared_types::PayloadId;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Payload not found: {0}")]
    NotFound(PayloadId),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// The `payloads` table.
#[async_trait]
pub trait PayloadStore: Send + Sync {
    async fn insert(&self, row: NewPayload) -> Result<PayloadId, StoreError>;

    async fn get(&self, id: PayloadId) -> Result<Option<PayloadItem>, StoreError>;

    /// Unprocessed rows with `attempts < max_attempts`, ordered by
    /// `attempts ASC, timestamp DESC`, at most `limit`.
    async fn select_pending(
        &self,
        max_attempts: u32,
        limit: usize,
    ) -> Result<Vec<PayloadItem>, StoreError>;

    /// Store the normalized payload and set `processed`.
    async fn mark_processed(&self, id: PayloadId, payload: &Value) -> Result<(), StoreError>;

    /// Increment `attempts`, returning the new count.
    async fn bump_attempts(&self, id: PayloadId) -> Result<u32, StoreError>;

    async fn count_pending(&self, max_attempts: u32) -> Result<usize, StoreError>;

    async fn select_abandoned(&self, max_attempts: u32) -> Result<Vec<PayloadItem>, StoreError>;
}

/// The `feeds` table.
#[async_trait]
pub trait FeedStore: Send + Sync {
    async fn insert(&self, record: FeedRecord) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Delivery via {transport} failed: {reason}")]
pub struct DeliveryError {
    pub transport: String,
    pub reason: String,
}

/// A socket, SNS or other delivery sink.
#[async_trait]
pub trait DeliveryTransport: Send + Sync {
    fn name(&self) -> &str;

    async fn publish(&self, item: &FeedItem) -> Result<(), DeliveryError>;
}

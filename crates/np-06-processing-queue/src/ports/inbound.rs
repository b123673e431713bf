//! # Inbound Ports (Driving Ports / API)

use crate::domain::entities::{IncomingPayload, IngestOutcome, PayloadItem, ResolvedFeed, SweepReport};
use crate::domain::errors::QueueError;
use async_trait::async_trait;

#[async_trait]
pub trait QueueApi: Send + Sync {
    /// Verify, persist and make one inline attempt at processing a payload.
    ///
    /// Verification failures are returned and nothing is stored.
    async fn add_external_payload(&self, payload: IncomingPayload)
        -> Result<IngestOutcome, QueueError>;

    /// One sweep over pending rows.
    async fn batch_process_payloads(&self) -> Result<SweepReport, QueueError>;

    /// Verify and resolve without persisting or delivering.
    async fn simulate(&self, payload: IncomingPayload) -> Result<ResolvedFeed, QueueError>;

    /// Rows still eligible for a sweep.
    async fn pending_count(&self) -> Result<usize, QueueError>;

    /// Rows that ran out of attempts.
    async fn abandoned(&self) -> Result<Vec<PayloadItem>, QueueError>;
}

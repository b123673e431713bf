//! # Processing Queue Subsystem (NP-06)
//!
//! Ingests verified payloads, drives the bounded-retry sweep and hands
//! resolved feeds to delivery.
//!
//! ## Architecture
//!
//! ```text
//! add_external_payload ──► VerificationApi ──► PayloadStore
//!                                                  │
//!          inline attempt / batch_process_payloads │
//!                                                  ▼
//!                FeedPipeline (identity → content → compose → recipients)
//!                                                  │
//!                              FeedStore ◄─────────┴────► DeliveryFanout
//! ```
//!
//! `simulate` runs the same pipeline and discards the result instead of
//! storing it.
//!
//! ## Guarantees
//!
//! - Rows are never deleted; exhausted rows stay for audit.
//! - A sweep processes its rows sequentially, and a row is never run twice
//!   concurrently within one process.
//! - Delivery is at most once per transport and never blocks the queue.

pub mod adapters;
pub mod delivery;
pub mod domain;
pub mod metrics;
pub mod pipeline;
pub mod ports;
pub mod service;

pub use adapters::{InMemoryFeedStore, InMemoryPayloadStore};
pub use delivery::DeliveryFanout;
pub use domain::entities::{
    FeedRecord, IncomingPayload, IngestOutcome, NewPayload, PayloadItem, QueueConfig,
    ResolvedFeed, SweepReport, DEFAULT_BATCH_SIZE, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_SWEEP_INTERVAL_SECS,
};
pub use domain::errors::{PipelineError, QueueError};
pub use pipeline::FeedPipeline;
pub use ports::inbound::QueueApi;
pub use ports::outbound::{DeliveryError, DeliveryTransport, FeedStore, PayloadStore, StoreError};
pub use service::{ProcessingQueue, QueuePorts};

//! # Queue Entities
//!
//! ## Row lifecycle
//!
//! ```text
//! RECEIVED → VERIFIED → PERSISTED(attempts=0, processed=false)
//!     → PROCESSED
//!     → attempts += 1 (retried by the next sweep)
//!     → ABANDONED (attempts == max_attempts, never deleted)
//! ```

use np_01_payload_codec::StorageType;
use np_02_verification::VerificationRules;
use np_04_feed_composition::{FeedItem, FeedPayload};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::{PayloadId, SenderType, Timestamp};

/// A payload as submitted by the ingestion endpoint.
#[derive(Debug, Clone)]
pub struct IncomingPayload {
    pub verification_proof: String,
    /// CAIP address or DID of the sender.
    pub sender: String,
    pub sender_type: SenderType,
    /// CAIP address of the recipient (the channel itself for broadcasts).
    pub recipient: String,
    /// Chain tag (`ETH_MAINNET`, ...) or `SIMULATE`.
    pub source: String,
    /// UTF-8 identity text or its `0x` hex encoding.
    pub identity: Vec<u8>,
    pub rules: VerificationRules,
}

/// Columns of a new `payloads` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPayload {
    pub verification_proof: String,
    pub sender: String,
    pub delegate: Option<String>,
    pub channel: Option<String>,
    pub sender_type: SenderType,
    pub recipient: String,
    pub storage_type: StorageType,
    /// Normalized identity text.
    pub identity: String,
    pub source: String,
    pub is_spam: bool,
    pub og_payload: Option<Value>,
    pub timestamp: Timestamp,
}

/// A persisted `payloads` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadItem {
    pub id: PayloadId,
    pub verification_proof: String,
    pub sender: String,
    pub delegate: Option<String>,
    /// Core-chain channel resolved at verification.
    pub channel: Option<String>,
    pub sender_type: SenderType,
    pub recipient: String,
    pub storage_type: StorageType,
    pub identity: String,
    pub source: String,
    pub is_spam: bool,
    /// Inline payload at ingestion; the normalized payload once processed.
    pub og_payload: Option<Value>,
    pub processed: bool,
    pub attempts: u32,
    pub timestamp: Timestamp,
}

impl PayloadItem {
    pub fn from_new(id: PayloadId, row: NewPayload) -> Self {
        Self {
            id,
            verification_proof: row.verification_proof,
            sender: row.sender,
            delegate: row.delegate,
            channel: row.channel,
            sender_type: row.sender_type,
            recipient: row.recipient,
            storage_type: row.storage_type,
            identity: row.identity,
            source: row.source,
            is_spam: row.is_spam,
            og_payload: row.og_payload,
            processed: false,
            attempts: 0,
            timestamp: row.timestamp,
        }
    }

    pub fn is_abandoned(&self, max_attempts: u32) -> bool {
        !self.processed && self.attempts >= max_attempts
    }
}

/// Output of the pipeline for one payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFeed {
    /// Normalized content JSON, persisted back to the row.
    pub content: Value,
    pub payload: FeedPayload,
    pub subscribed: Option<FeedItem>,
    /// Feed for unsubscribed (spam) or chat-unapproved recipients.
    pub spam: Option<FeedItem>,
}

impl ResolvedFeed {
    pub fn items(&self) -> impl Iterator<Item = (&FeedItem, bool)> {
        self.subscribed
            .iter()
            .map(|item| (item, false))
            .chain(self.spam.iter().map(|item| (item, true)))
    }
}

/// A `feeds` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedRecord {
    pub payload_id: PayloadId,
    pub item: FeedItem,
    pub is_spam: bool,
}

/// Result of `add_external_payload`.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    Persisted {
        payload_id: PayloadId,
        /// Whether the inline attempt already processed the row.
        processed: bool,
    },
    /// `SIMULATE` source: resolved but never stored.
    Simulated(Box<ResolvedFeed>),
}

/// Counts of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    pub selected: usize,
    pub processed: usize,
    pub failed: usize,
    pub abandoned: usize,
}

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_BATCH_SIZE: usize = 50;
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Attempts after which a row is abandoned.
    pub max_attempts: u32,
    /// Rows selected per sweep.
    pub batch_size: usize,
    pub sweep_interval_secs: u64,
    /// Chain assumed for sender DIDs without a chain id.
    pub default_chain_id: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            batch_size: DEFAULT_BATCH_SIZE,
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
            default_chain_id: 1,
        }
    }
}

impl QueueConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("max_attempts must be at least 1".into());
        }
        if self.batch_size == 0 {
            return Err("batch_size must be at least 1".into());
        }
        if self.sweep_interval_secs == 0 {
            return Err("sweep_interval_secs must be at least 1".into());
        }
        Ok(())
    }
}

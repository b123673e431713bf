//! # Shared Outbound Ports
//!
//! Read-only views of the relational store and the chat store, plus a
//! time source. Production adapters live in the runtime; tests use
//! `InMemoryDirectory` and `FixedTimeSource`.

use crate::entities::{AliasMapping, Channel, Chat, ChatMessage, Subscriber, Timestamp};
use crate::errors::DirectoryError;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};

/// Channel, alias, delegate and subscriber lookups.
#[async_trait]
pub trait ChannelDirectory: Send + Sync {
    /// Look up a channel by its core-chain address.
    async fn get_channel(&self, address: &str) -> Result<Option<Channel>, DirectoryError>;

    /// Look up an alias mapping by the alias' CAIP address.
    async fn get_alias(&self, alias_address: &str) -> Result<Option<AliasMapping>, DirectoryError>;

    /// Addresses allowed to sign on behalf of `channel`.
    async fn get_delegates(&self, channel: &str) -> Result<Vec<String>, DirectoryError>;

    /// Current subscribers of `channel`.
    async fn get_subscribers(&self, channel: &str) -> Result<Vec<Subscriber>, DirectoryError>;

    /// The subscription row for one address, whether or not it is current.
    async fn get_subscriber(
        &self,
        channel: &str,
        subscriber: &str,
    ) -> Result<Option<Subscriber>, DirectoryError>;
}

/// Chat, message and key lookups.
#[async_trait]
pub trait ChatDirectory: Send + Sync {
    async fn get_chat(&self, chat_id: &str) -> Result<Option<Chat>, DirectoryError>;

    /// Look up a stored message by its `v2:<hash>` reference.
    async fn get_message_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<ChatMessage>, DirectoryError>;

    /// Armored public key registered for `did`.
    async fn get_public_key(&self, did: &str) -> Result<Option<String>, DirectoryError>;
}

/// Time source for consistent timestamp handling.
///
/// Abstracted to allow testing with deterministic time.
pub trait TimeSource: Send + Sync {
    /// Returns the current unix time in seconds.
    fn now(&self) -> Timestamp;
}

/// Default system time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

/// Settable time source for tests and replays.
#[derive(Debug, Default)]
pub struct FixedTimeSource {
    time: AtomicU64,
}

impl FixedTimeSource {
    pub fn new(initial: Timestamp) -> Self {
        Self {
            time: AtomicU64::new(initial),
        }
    }

    pub fn advance(&self, secs: u64) {
        self.time.fetch_add(secs, Ordering::SeqCst);
    }

    pub fn set(&self, time: Timestamp) {
        self.time.store(time, Ordering::SeqCst);
    }
}

impl TimeSource for FixedTimeSource {
    fn now(&self) -> Timestamp {
        self.time.load(Ordering::SeqCst)
    }
}

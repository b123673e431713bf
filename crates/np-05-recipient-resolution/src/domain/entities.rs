//! # Recipient Entities

use np_04_feed_composition::{ChannelMeta, FeedPayload};
use serde::{Deserialize, Serialize};
use shared_types::{PayloadType, SenderType};

/// Default cap on subset recipient maps.
pub const DEFAULT_MAX_SUBSET_RECIPIENTS: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientConfig {
    pub max_subset_recipients: usize,
}

impl Default for RecipientConfig {
    fn default() -> Self {
        Self {
            max_subset_recipients: DEFAULT_MAX_SUBSET_RECIPIENTS,
        }
    }
}

/// Inputs of one recipient resolution.
#[derive(Debug, Clone, Copy)]
pub struct RecipientQuery<'a> {
    pub payload_type: PayloadType,
    pub sender_type: SenderType,
    /// Resolved channel address for channel senders, the sender DID for
    /// chat senders.
    pub sender: &'a str,
    /// Plain lowercase target address (single payloads).
    pub recipient: &'a str,
    pub feed: &'a FeedPayload,
    pub channel_meta: Option<&'a ChannelMeta>,
    /// Target is not subscribed to the channel.
    pub is_spam: bool,
}

/// Recipient set split by subscription (or chat approval).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRecipients {
    pub subscribed: Vec<String>,
    pub unsubscribed: Vec<String>,
}

impl ResolvedRecipients {
    pub fn is_empty(&self) -> bool {
        self.subscribed.is_empty() && self.unsubscribed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.subscribed.len() + self.unsubscribed.len()
    }
}

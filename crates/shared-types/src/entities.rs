//! # Core Domain Entities
//!
//! ## Clusters
//!
//! - **Identity**: `CaipAddress`, `SenderType`, `PayloadType`
//! - **Channels**: `Channel`, `AliasMapping`, `Subscriber`
//! - **Chat**: `Chat`, `ChatMessage`

use crate::errors::AddressError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Unix timestamp in seconds.
pub type Timestamp = u64;

/// Row identifier of a persisted payload.
pub type PayloadId = u64;

/// Pseudo-source used for dry runs. Items from this source skip channel
/// eligibility checks and are never persisted.
pub const SIMULATE_SOURCE: &str = "SIMULATE";

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// Chain-agnostic account identifier.
///
/// Accepted forms:
/// - `eip155:1:0xabc…` (namespace, chain id, address)
/// - `eip155:0xabc…` (DID form used by chat, no chain id)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaipAddress {
    pub namespace: String,
    pub chain_id: Option<u64>,
    pub address: String,
}

impl CaipAddress {
    /// Parse a CAIP-10 address or a chain-less DID.
    pub fn parse(value: &str) -> Result<Self, AddressError> {
        let parts: Vec<&str> = value.split(':').collect();
        match parts.as_slice() {
            [namespace, chain, address]
                if !namespace.is_empty() && !address.is_empty() =>
            {
                let chain_id = chain
                    .parse::<u64>()
                    .map_err(|_| AddressError::InvalidChainId(chain.to_string()))?;
                Ok(Self {
                    namespace: namespace.to_string(),
                    chain_id: Some(chain_id),
                    address: address.to_string(),
                })
            }
            [namespace, address] if !namespace.is_empty() && !address.is_empty() => Ok(Self {
                namespace: namespace.to_string(),
                chain_id: None,
                address: address.to_string(),
            }),
            _ => Err(AddressError::Malformed(value.to_string())),
        }
    }

    /// The bare account address, lowercased.
    pub fn address_lower(&self) -> String {
        self.address.to_lowercase()
    }

    /// The chain-less DID form (`eip155:0xabc…`), lowercased.
    pub fn to_did(&self) -> String {
        format!("{}:{}", self.namespace, self.address).to_lowercase()
    }

    /// Strip any CAIP prefix from `value`, returning the trailing address.
    ///
    /// Plain addresses pass through unchanged.
    pub fn plain(value: &str) -> &str {
        value.rsplit(':').next().unwrap_or(value)
    }
}

impl fmt::Display for CaipAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.chain_id {
            Some(chain) => write!(f, "{}:{}:{}", self.namespace, chain, self.address),
            None => write!(f, "{}:{}", self.namespace, self.address),
        }
    }
}

/// Origin of a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SenderType {
    Channel = 0,
    W2W = 1,
    PushVideo = 2,
    PushSpace = 3,
}

impl SenderType {
    /// Chat, video and space senders are authenticated by chat proofs.
    pub fn is_chat(self) -> bool {
        !matches!(self, SenderType::Channel)
    }
}

impl TryFrom<u8> for SenderType {
    type Error = AddressError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SenderType::Channel),
            1 => Ok(SenderType::W2W),
            2 => Ok(SenderType::PushVideo),
            3 => Ok(SenderType::PushSpace),
            other => Err(AddressError::UnknownSenderType(other)),
        }
    }
}

impl From<SenderType> for u8 {
    fn from(value: SenderType) -> Self {
        value as u8
    }
}

/// Audience of a notification, taken from `data.type` of the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PayloadType {
    Broadcast,
    Single,
    Subset,
}

impl PayloadType {
    /// Parse from the payload's `data.type`, which may be a string or number.
    pub fn from_value(value: &Value) -> Option<Self> {
        let raw = match value {
            Value::Number(n) => n.as_u64()?,
            Value::String(s) => s.trim().parse().ok()?,
            _ => return None,
        };
        Self::from_code(raw)
    }

    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            1 => Some(PayloadType::Broadcast),
            3 => Some(PayloadType::Single),
            4 => Some(PayloadType::Subset),
            _ => None,
        }
    }

    pub fn code(self) -> u64 {
        match self {
            PayloadType::Broadcast => 1,
            PayloadType::Single => 3,
            PayloadType::Subset => 4,
        }
    }
}

// =============================================================================
// CLUSTER B: CHANNELS
// =============================================================================

/// A registered notification sender on a core chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Lowercased `0x` address on the core chain.
    pub channel: String,
    pub name: String,
    pub icon: String,
    pub url: String,
    pub blocked: bool,
    pub activation_status: bool,
    /// JSON array of setting descriptors, if the channel publishes settings.
    pub channel_settings: Option<String>,
    /// `"<pollSeconds>+<subgraphId>"` when the channel has a subgraph.
    pub subgraph_details: Option<String>,
}

impl Channel {
    pub fn is_eligible(&self) -> bool {
        !self.blocked && self.activation_status
    }

    /// Registered subgraph id, if any.
    pub fn subgraph_id(&self) -> Option<&str> {
        self.subgraph_details
            .as_deref()
            .and_then(|details| details.split_once('+'))
            .map(|(_, id)| id)
            .filter(|id| !id.is_empty())
    }
}

/// A channel's representative identity on a non-core chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasMapping {
    /// CAIP address of the alias (`eip155:<chain>:0x…`).
    pub alias_address: String,
    /// Lowercased core-chain channel address.
    pub channel: String,
    pub is_alias_verified: bool,
    pub blocked: bool,
    pub activation_status: bool,
}

/// A row of the `subscribers` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriber {
    pub channel: String,
    pub alias: Option<String>,
    /// Lowercased subscriber address.
    pub subscriber: String,
    pub signature: Option<String>,
    pub is_currently_subscribed: bool,
    /// JSON array of the subscriber's own setting descriptors.
    pub user_settings: Option<String>,
    pub minimal_user_settings: Option<String>,
    pub origin: Option<String>,
    pub timestamp: Timestamp,
}

// =============================================================================
// CLUSTER C: CHAT
// =============================================================================

/// A chat thread (one-to-one, group, video call or space).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub chat_id: String,
    /// Member DIDs joined with `_`.
    pub combined_did: String,
    /// DIDs that approved the chat, joined with `+`.
    pub intent: String,
    pub admins: Vec<String>,
    pub group_name: Option<String>,
}

impl Chat {
    pub fn members(&self) -> Vec<String> {
        split_dids(&self.combined_did, '_')
    }

    pub fn approved(&self) -> Vec<String> {
        split_dids(&self.intent, '+')
    }

    pub fn is_group(&self) -> bool {
        self.group_name.is_some()
    }

    pub fn has_member(&self, did: &str) -> bool {
        contains_did(&self.members(), did)
    }

    pub fn has_intent(&self, did: &str) -> bool {
        contains_did(&self.approved(), did)
    }

    pub fn is_admin(&self, did: &str) -> bool {
        contains_did(&self.admins, did)
    }
}

/// A stored chat message, addressed by its `v2:<hash>` reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub reference: String,
    pub chat_id: String,
    pub from_did: String,
    pub to_did: String,
    pub message_type: String,
    pub message_content: String,
    pub timestamp: Timestamp,
}

fn split_dids(joined: &str, separator: char) -> Vec<String> {
    joined
        .split(separator)
        .filter(|did| !did.is_empty())
        .map(|did| did.to_lowercase())
        .collect()
}

fn contains_did(dids: &[String], did: &str) -> bool {
    dids.iter().any(|d| d.eq_ignore_ascii_case(did))
}

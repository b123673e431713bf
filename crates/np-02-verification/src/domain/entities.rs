//! # Domain Entities
//!
//! Requests, outcomes and configuration for payload verification.

use super::errors::VerificationError;
use np_01_payload_codec::PayloadIdentity;
use serde::{Deserialize, Serialize};
use shared_types::{CaipAddress, SenderType, SIMULATE_SOURCE};
use std::collections::HashMap;

/// Options a trusted caller may attach to a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRules {
    /// Accept the payload even when its proof cannot be verified.
    pub bypass_verification: bool,
}

/// Everything needed to authenticate one incoming payload.
#[derive(Debug, Clone)]
pub struct VerificationRequest {
    /// Raw proof string (decoded by the service).
    pub proof: String,
    pub identity: PayloadIdentity,
    pub sender: CaipAddress,
    pub sender_type: SenderType,
    pub recipient: String,
    pub chain_id: u64,
    pub source: String,
    pub rules: VerificationRules,
}

impl VerificationRequest {
    pub fn is_simulation(&self) -> bool {
        self.source == SIMULATE_SOURCE
    }
}

/// Result of verification. Never an `Err`: failures carry their reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationOutcome {
    pub verified: bool,
    pub error: Option<VerificationError>,
    /// Delegate whose signature was accepted on behalf of the channel.
    pub delegate: Option<String>,
    /// Core-chain channel the sender resolved to.
    pub channel: Option<String>,
}

impl VerificationOutcome {
    pub fn verified(channel: Option<String>, delegate: Option<String>) -> Self {
        Self {
            verified: true,
            error: None,
            delegate,
            channel,
        }
    }

    pub fn failed(error: VerificationError, channel: Option<String>) -> Self {
        Self {
            verified: false,
            error: Some(error),
            delegate: None,
            channel,
        }
    }

    pub fn reason(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }
}

/// Receipt log as returned by `eth_getTransactionReceipt`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub address: String,
    /// `0x`-prefixed hex.
    pub data: String,
    pub topics: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub logs: Vec<LogEntry>,
}

/// Verification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationConfig {
    /// Chains on which channels are registered directly (others use aliases).
    pub core_chain_ids: Vec<u64>,
    /// Communicator contract per chain id.
    pub communicators: HashMap<u64, String>,
    pub eip712_domain_name: String,
}

impl VerificationConfig {
    pub fn is_core_chain(&self, chain_id: u64) -> bool {
        self.core_chain_ids.contains(&chain_id)
    }

    /// The chain assumed for chain-less DIDs.
    pub fn primary_chain_id(&self) -> u64 {
        self.core_chain_ids.first().copied().unwrap_or(1)
    }

    pub fn communicator(&self, chain_id: u64) -> Result<&str, VerificationError> {
        self.communicators
            .get(&chain_id)
            .map(String::as_str)
            .ok_or(VerificationError::UnsupportedChain(chain_id))
    }
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            core_chain_ids: vec![1, 11155111],
            communicators: HashMap::from([
                (1, "0xb3971BCef2D791bc4027BbfedFb47319A4AAaaAa".to_string()),
                (11155111, "0x0C34d54a09CFe75BCcd878A469206Ae77E0fe6e7".to_string()),
                (137, "0xb3971BCef2D791bc4027BbfedFb47319A4AAaaAa".to_string()),
                (56, "0xb3971BCef2D791bc4027BbfedFb47319A4AAaaAa".to_string()),
            ]),
            eip712_domain_name: "EPNS COMM V1".to_string(),
        }
    }
}

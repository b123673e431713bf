//! # Feed Entities
//!
//! `FeedPayload` is the canonical notification; `FeedItem` wraps it with the
//! delivery header handed to transports.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::{Channel, PayloadType, SenderType, Timestamp};
use std::collections::BTreeMap;

/// Display metadata of the sending channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMeta {
    pub channel: String,
    pub name: String,
    pub icon: String,
    pub url: String,
    pub channel_settings: Option<String>,
}

impl ChannelMeta {
    /// Stand-in for senders that are not registered channels.
    pub fn internal() -> Self {
        Self {
            channel: "0x0000000000000000000000000000000000000000".to_string(),
            name: "Push".to_string(),
            icon: "https://push.org/assets/push-icon.png".to_string(),
            url: "https://push.org".to_string(),
            channel_settings: None,
        }
    }
}

impl From<&Channel> for ChannelMeta {
    fn from(channel: &Channel) -> Self {
        Self {
            channel: channel.channel.clone(),
            name: channel.name.clone(),
            icon: channel.icon.clone(),
            url: channel.url.clone(),
            channel_settings: channel.channel_settings.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedNotification {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedData {
    /// Payload type code (`"1"`, `"3"`, `"4"`).
    #[serde(rename = "type")]
    pub kind: String,
    pub app: String,
    pub icon: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sectype: Option<String>,
    pub asub: String,
    pub amsg: String,
    pub acta: String,
    pub aimg: String,
    pub etime: Option<Timestamp>,
    pub hidden: bool,
    pub silent: bool,
    #[serde(rename = "additionalMeta", skip_serializing_if = "Option::is_none")]
    pub additional_meta: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    pub epoch: Timestamp,
    /// Notification setting index (`"<index>-<type>[-<value>]"`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
}

impl FeedData {
    pub fn payload_type(&self) -> Option<PayloadType> {
        PayloadType::from_value(&Value::String(self.kind.clone()))
    }
}

/// Channel string for broadcasts; `address -> secret` otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Recipients {
    Broadcast(String),
    Targeted(BTreeMap<String, Option<String>>),
}

impl Recipients {
    pub fn targeted(&self) -> Vec<String> {
        match self {
            Recipients::Broadcast(_) => Vec::new(),
            Recipients::Targeted(map) => map.keys().cloned().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedPayload {
    pub notification: FeedNotification,
    pub data: FeedData,
    pub recipients: Recipients,
    #[serde(rename = "verificationProof")]
    pub verification_proof: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRecipient {
    pub addr: String,
    pub ts: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedHeader {
    pub sender: String,
    pub recipients_resolved: Vec<ResolvedRecipient>,
    pub sender_type: SenderType,
    pub source: String,
    /// Recipients are not subscribed (or have not approved the chat).
    #[serde(default)]
    pub is_spam: bool,
}

/// Final output unit handed to delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedItem {
    pub header: FeedHeader,
    pub payload: FeedPayload,
}

impl FeedItem {
    pub fn new(
        sender: impl Into<String>,
        recipients: &[String],
        sender_type: SenderType,
        source: impl Into<String>,
        payload: FeedPayload,
        ts: Timestamp,
    ) -> Self {
        Self {
            header: FeedHeader {
                sender: sender.into(),
                recipients_resolved: recipients
                    .iter()
                    .map(|addr| ResolvedRecipient {
                        addr: addr.clone(),
                        ts,
                    })
                    .collect(),
                sender_type,
                source: source.into(),
                is_spam: false,
            },
            payload,
        }
    }

    /// Mark the feed as spam so transports can route it separately.
    pub fn into_spam(mut self) -> Self {
        self.header.is_spam = true;
        self
    }

    pub fn recipient_addresses(&self) -> Vec<&str> {
        self.header
            .recipients_resolved
            .iter()
            .map(|r| r.addr.as_str())
            .collect()
    }
}

//! # Recipient Resolver
//!
//! ## Channel senders
//!
//! | Payload | Recipients |
//! |---------|------------|
//! | Broadcast | current subscribers, filtered by settings |
//! | Single | the target; spam targets bypass settings |
//! | Subset | the recipient map, split by subscription |
//!
//! ## Chat senders
//!
//! Chat, video and space senders must carry a `pgpv2` proof. Members of the
//! referenced chat (minus the sender) are split by whether they approved
//! the chat.

use crate::domain::entities::{RecipientConfig, RecipientQuery, ResolvedRecipients};
use crate::domain::errors::RecipientError;
use crate::domain::settings::{NotificationSettingIndex, SettingsMatcher};
use crate::ports::inbound::RecipientApi;
use async_trait::async_trait;
use np_01_payload_codec::VerificationProof;
use np_04_feed_composition::Recipients;
use shared_types::{CaipAddress, ChannelDirectory, ChatDirectory, PayloadType};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

pub struct RecipientResolver {
    channels: Arc<dyn ChannelDirectory>,
    chats: Arc<dyn ChatDirectory>,
    matcher: SettingsMatcher,
    config: RecipientConfig,
}

impl RecipientResolver {
    pub fn new(
        channels: Arc<dyn ChannelDirectory>,
        chats: Arc<dyn ChatDirectory>,
        config: RecipientConfig,
    ) -> Self {
        Self {
            channels,
            chats,
            matcher: SettingsMatcher,
            config,
        }
    }

    async fn resolve_channel(
        &self,
        query: &RecipientQuery<'_>,
    ) -> Result<ResolvedRecipients, RecipientError> {
        let channel = query.sender;
        let settings = query
            .channel_meta
            .and_then(|meta| meta.channel_settings.as_deref());
        let index = NotificationSettingIndex::parse_lenient(query.feed.data.index.as_deref());

        match query.payload_type {
            PayloadType::Broadcast => {
                let subscribers = self.channels.get_subscribers(channel).await?;
                Ok(ResolvedRecipients {
                    subscribed: self.matcher.matching(settings, &subscribers, index.as_ref()),
                    unsubscribed: Vec::new(),
                })
            }
            PayloadType::Single => {
                if query.is_spam {
                    return Ok(ResolvedRecipients {
                        subscribed: Vec::new(),
                        unsubscribed: vec![query.recipient.to_string()],
                    });
                }
                let row = self
                    .channels
                    .get_subscriber(channel, query.recipient)
                    .await?
                    .filter(|row| row.is_currently_subscribed);
                let subscribed = match row {
                    Some(row) => self.matcher.matching(settings, &[row], index.as_ref()),
                    // Unsubscribed since ingestion.
                    None => Vec::new(),
                };
                Ok(ResolvedRecipients {
                    subscribed,
                    unsubscribed: Vec::new(),
                })
            }
            PayloadType::Subset => {
                let targets = self.subset_targets(query)?;
                let current: HashSet<String> = self
                    .channels
                    .get_subscribers(channel)
                    .await?
                    .into_iter()
                    .map(|row| row.subscriber.to_lowercase())
                    .collect();
                let (subscribed, unsubscribed) = targets
                    .into_iter()
                    .partition(|address| current.contains(address));
                Ok(ResolvedRecipients {
                    subscribed,
                    unsubscribed,
                })
            }
        }
    }

    fn subset_targets(&self, query: &RecipientQuery<'_>) -> Result<Vec<String>, RecipientError> {
        let Recipients::Targeted(map) = &query.feed.recipients else {
            return Err(RecipientError::MissingRecipients);
        };
        if map.len() > self.config.max_subset_recipients {
            return Err(RecipientError::SubsetLimitExceeded {
                count: map.len(),
                max: self.config.max_subset_recipients,
            });
        }
        Ok(map.keys().map(|address| address.to_lowercase()).collect())
    }

    async fn resolve_chat(
        &self,
        query: &RecipientQuery<'_>,
    ) -> Result<ResolvedRecipients, RecipientError> {
        let chat_id = match VerificationProof::decode(&query.feed.verification_proof) {
            Ok(VerificationProof::PgpV2 { chat_id, .. }) => chat_id,
            Ok(other) => return Err(RecipientError::UnsupportedChatProof(other.scheme())),
            Err(_) => {
                return Err(RecipientError::UnsupportedChatProof(
                    query.feed.verification_proof.clone(),
                ))
            }
        };
        let chat = self
            .chats
            .get_chat(&chat_id)
            .await?
            .ok_or_else(|| RecipientError::ChatNotFound(chat_id.clone()))?;

        let sender = CaipAddress::plain(query.sender).to_lowercase();
        let approved: HashSet<String> = chat
            .approved()
            .iter()
            .map(|did| CaipAddress::plain(did).to_lowercase())
            .filter(|address| *address != sender)
            .collect();
        let members: Vec<String> = chat
            .members()
            .iter()
            .map(|did| CaipAddress::plain(did).to_lowercase())
            .filter(|address| *address != sender)
            .collect();

        let targets: Vec<String> = match query.payload_type {
            PayloadType::Broadcast => members,
            PayloadType::Single => {
                let recipient = query.recipient.to_lowercase();
                if !members.contains(&recipient) {
                    return Err(RecipientError::NotChatMember(recipient));
                }
                vec![recipient]
            }
            PayloadType::Subset => self
                .subset_targets(query)?
                .into_iter()
                .filter(|address| members.contains(address))
                .collect(),
        };

        let (subscribed, unsubscribed) = targets
            .into_iter()
            .partition(|address| approved.contains(address));
        Ok(ResolvedRecipients {
            subscribed,
            unsubscribed,
        })
    }
}

#[async_trait]
impl RecipientApi for RecipientResolver {
    async fn resolve(
        &self,
        query: &RecipientQuery<'_>,
    ) -> Result<ResolvedRecipients, RecipientError> {
        let resolved = if query.sender_type.is_chat() {
            self.resolve_chat(query).await?
        } else {
            self.resolve_channel(query).await?
        };
        debug!(
            sender = query.sender,
            subscribed = resolved.subscribed.len(),
            unsubscribed = resolved.unsubscribed.len(),
            "[np-05] Resolved recipients"
        );
        Ok(resolved)
    }
}

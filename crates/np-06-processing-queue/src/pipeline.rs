//! # Feed Pipeline
//!
//! The single resolution path shared by the inline attempt, the sweep and
//! simulation:
//!
//! ```text
//! identity → content → compose → recipients → FeedItem(s)
//! ```
//!
//! Only reads; persisting the outcome is the caller's job.

use crate::domain::entities::{PayloadItem, ResolvedFeed};
use crate::domain::errors::PipelineError;
use np_01_payload_codec::PayloadIdentity;
use np_03_content_resolution::ContentApi;
use np_04_feed_composition::{ChannelMeta, FeedComposer, FeedError, FeedItem};
use np_05_recipient_resolution::{RecipientApi, RecipientQuery};
use shared_types::{CaipAddress, ChannelDirectory, TimeSource};
use std::sync::Arc;
use tracing::debug;

pub struct FeedPipeline {
    channels: Arc<dyn ChannelDirectory>,
    content: Arc<dyn ContentApi>,
    composer: FeedComposer,
    recipients: Arc<dyn RecipientApi>,
    time: Arc<dyn TimeSource>,
}

impl FeedPipeline {
    pub fn new(
        channels: Arc<dyn ChannelDirectory>,
        content: Arc<dyn ContentApi>,
        recipients: Arc<dyn RecipientApi>,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            channels,
            content,
            composer: FeedComposer::new(time.clone()),
            recipients,
            time,
        }
    }

    pub async fn resolve(&self, item: &PayloadItem) -> Result<ResolvedFeed, PipelineError> {
        let identity = PayloadIdentity::decode_str(&item.identity)?;
        let inline = identity.inline_json();
        let content = self.content.resolve(&identity, inline.as_ref()).await?;

        let (sender, channel_meta) = if item.sender_type.is_chat() {
            let did = CaipAddress::parse(&item.sender)
                .map(|address| address.to_did())
                .unwrap_or_else(|_| item.sender.to_lowercase());
            (did, None)
        } else {
            let channel = item
                .channel
                .clone()
                .unwrap_or_else(|| CaipAddress::plain(&item.sender).to_lowercase());
            let meta = self
                .channels
                .get_channel(&channel)
                .await?
                .map(|row| ChannelMeta::from(&row));
            (channel, meta)
        };

        let recipient = CaipAddress::plain(&item.recipient).to_lowercase();
        let payload = self.composer.compose(
            channel_meta.as_ref(),
            &content,
            &recipient,
            &item.verification_proof,
        )?;
        let payload_type = payload
            .data
            .payload_type()
            .ok_or_else(|| FeedError::InvalidPayloadType(payload.data.kind.clone()))?;

        let query = RecipientQuery {
            payload_type,
            sender_type: item.sender_type,
            sender: &sender,
            recipient: &recipient,
            feed: &payload,
            channel_meta: channel_meta.as_ref(),
            is_spam: item.is_spam,
        };
        let resolved = self.recipients.resolve(&query).await?;

        let now = self.time.now();
        let feed_item = |addresses: &[String]| {
            (!addresses.is_empty()).then(|| {
                FeedItem::new(
                    &sender,
                    addresses,
                    item.sender_type,
                    &item.source,
                    payload.clone(),
                    now,
                )
            })
        };
        let subscribed = feed_item(&resolved.subscribed);
        let spam = feed_item(&resolved.unsubscribed).map(FeedItem::into_spam);

        debug!(
            payload_id = item.id,
            subscribed = resolved.subscribed.len(),
            spam = resolved.unsubscribed.len(),
            "[np-06] Pipeline resolved payload"
        );

        Ok(ResolvedFeed {
            content,
            payload,
            subscribed,
            spam,
        })
    }
}

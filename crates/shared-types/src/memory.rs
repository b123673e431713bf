//! In-memory directory adapter.
//!
//! Backs both `ChannelDirectory` and `ChatDirectory` with hash maps. Used by
//! the runtime in dev mode and by tests across the workspace. Keys are
//! lowercased on insert and on lookup.

use crate::entities::{AliasMapping, Channel, Chat, ChatMessage, Subscriber};
use crate::errors::DirectoryError;
use crate::ports::{ChannelDirectory, ChatDirectory};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Default)]
pub struct InMemoryDirectory {
    channels: RwLock<HashMap<String, Channel>>,
    aliases: RwLock<HashMap<String, AliasMapping>>,
    delegates: RwLock<HashMap<String, Vec<String>>>,
    /// channel -> subscriber -> row
    subscribers: RwLock<HashMap<String, HashMap<String, Subscriber>>>,
    chats: RwLock<HashMap<String, Chat>>,
    messages: RwLock<HashMap<String, ChatMessage>>,
    keys: RwLock<HashMap<String, String>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_channel(&self, mut channel: Channel) {
        channel.channel = channel.channel.to_lowercase();
        self.channels.write().insert(channel.channel.clone(), channel);
    }

    pub fn insert_alias(&self, mut alias: AliasMapping) {
        alias.channel = alias.channel.to_lowercase();
        self.aliases
            .write()
            .insert(alias.alias_address.to_lowercase(), alias);
    }

    pub fn add_delegate(&self, channel: &str, delegate: &str) {
        self.delegates
            .write()
            .entry(channel.to_lowercase())
            .or_default()
            .push(delegate.to_lowercase());
    }

    pub fn insert_subscriber(&self, mut subscriber: Subscriber) {
        subscriber.channel = subscriber.channel.to_lowercase();
        subscriber.subscriber = subscriber.subscriber.to_lowercase();
        self.subscribers
            .write()
            .entry(subscriber.channel.clone())
            .or_default()
            .insert(subscriber.subscriber.clone(), subscriber);
    }

    pub fn insert_chat(&self, chat: Chat) {
        self.chats.write().insert(chat.chat_id.clone(), chat);
    }

    pub fn insert_message(&self, message: ChatMessage) {
        self.messages
            .write()
            .insert(message.reference.clone(), message);
    }

    pub fn insert_public_key(&self, did: &str, key: &str) {
        self.keys.write().insert(did.to_lowercase(), key.to_string());
    }
}

#[async_trait]
impl ChannelDirectory for InMemoryDirectory {
    async fn get_channel(&self, address: &str) -> Result<Option<Channel>, DirectoryError> {
        Ok(self.channels.read().get(&address.to_lowercase()).cloned())
    }

    async fn get_alias(&self, alias_address: &str) -> Result<Option<AliasMapping>, DirectoryError> {
        Ok(self
            .aliases
            .read()
            .get(&alias_address.to_lowercase())
            .cloned())
    }

    async fn get_delegates(&self, channel: &str) -> Result<Vec<String>, DirectoryError> {
        Ok(self
            .delegates
            .read()
            .get(&channel.to_lowercase())
            .cloned()
            .unwrap_or_default())
    }

    async fn get_subscribers(&self, channel: &str) -> Result<Vec<Subscriber>, DirectoryError> {
        let subscribers = self.subscribers.read();
        let mut rows: Vec<Subscriber> = subscribers
            .get(&channel.to_lowercase())
            .map(|rows| {
                rows.values()
                    .filter(|row| row.is_currently_subscribed)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        rows.sort_by(|a, b| a.subscriber.cmp(&b.subscriber));
        Ok(rows)
    }

    async fn get_subscriber(
        &self,
        channel: &str,
        subscriber: &str,
    ) -> Result<Option<Subscriber>, DirectoryError> {
        Ok(self
            .subscribers
            .read()
            .get(&channel.to_lowercase())
            .and_then(|rows| rows.get(&subscriber.to_lowercase()))
            .cloned())
    }
}

#[async_trait]
impl ChatDirectory for InMemoryDirectory {
    async fn get_chat(&self, chat_id: &str) -> Result<Option<Chat>, DirectoryError> {
        Ok(self.chats.read().get(chat_id).cloned())
    }

    async fn get_message_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<ChatMessage>, DirectoryError> {
        Ok(self.messages.read().get(reference).cloned())
    }

    async fn get_public_key(&self, did: &str) -> Result<Option<String>, DirectoryError> {
        Ok(self.keys.read().get(&did.to_lowercase()).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lookups_are_case_insensitive() {
        let directory = InMemoryDirectory::new();
        directory.insert_channel(Channel {
            channel: "0xABC".into(),
            name: "Alpha".into(),
            ..Default::default()
        });
        directory.add_delegate("0xabc", "0xDEF");

        let channel = directory.get_channel("0xAbc").await.unwrap().unwrap();
        assert_eq!(channel.name, "Alpha");
        assert_eq!(directory.get_delegates("0xABC").await.unwrap(), vec!["0xdef"]);
    }

    #[tokio::test]
    async fn test_get_subscribers_skips_unsubscribed() {
        let directory = InMemoryDirectory::new();
        directory.insert_subscriber(Subscriber {
            channel: "0xc".into(),
            subscriber: "0x2".into(),
            is_currently_subscribed: true,
            ..Default::default()
        });
        directory.insert_subscriber(Subscriber {
            channel: "0xc".into(),
            subscriber: "0x1".into(),
            is_currently_subscribed: false,
            ..Default::default()
        });

        let rows = directory.get_subscribers("0xC").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].subscriber, "0x2");
        assert!(directory.get_subscriber("0xc", "0x1").await.unwrap().is_some());
    }
}

//! Directory seed file.
//!
//! The dev runtime keeps channels, subscribers and chats in memory; the seed
//! is the JSON document they are loaded from at startup. Every section is
//! optional.

use crate::container::ConfigError;
use serde::Deserialize;
use shared_types::{AliasMapping, Channel, Chat, ChatMessage, InMemoryDirectory, Subscriber};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DirectorySeed {
    pub channels: Vec<Channel>,
    pub aliases: Vec<AliasMapping>,
    /// channel -> delegate addresses
    pub delegates: HashMap<String, Vec<String>>,
    pub subscribers: Vec<Subscriber>,
    pub chats: Vec<Chat>,
    pub messages: Vec<ChatMessage>,
    /// DID -> armored public key
    pub public_keys: HashMap<String, String>,
}

impl DirectorySeed {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|e| ConfigError::Seed(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Seed(format!("{}: {e}", path.display())))?;
        Self::from_json(&text)
    }

    pub fn apply(self, directory: &InMemoryDirectory) {
        for channel in self.channels {
            directory.insert_channel(channel);
        }
        for alias in self.aliases {
            directory.insert_alias(alias);
        }
        for (channel, delegates) in self.delegates {
            for delegate in delegates {
                directory.add_delegate(&channel, &delegate);
            }
        }
        for subscriber in self.subscribers {
            directory.insert_subscriber(subscriber);
        }
        for chat in self.chats {
            directory.insert_chat(chat);
        }
        for message in self.messages {
            directory.insert_message(message);
        }
        for (did, key) in self.public_keys {
            directory.insert_public_key(&did, &key);
        }
    }
}

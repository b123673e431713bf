//! # Domain Entities

use super::errors::ContentError;
use serde::{Deserialize, Serialize};

/// Content backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Base URL of the IPFS gateway (`<gateway>/<cid>`).
    pub ipfs_gateway: String,
    /// Base URL of the subgraph host (`<base>/<subgraphId>`).
    pub subgraph_base_url: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            ipfs_gateway: "https://ipfs.io/ipfs".to_string(),
            subgraph_base_url: "https://api.thegraph.com/subgraphs/name".to_string(),
        }
    }
}

impl ContentConfig {
    pub fn subgraph_endpoint(&self, subgraph_id: &str) -> String {
        format!("{}/{}", self.subgraph_base_url.trim_end_matches('/'), subgraph_id)
    }
}

/// `"<scheme>:<subgraphId>+<notificationNumber>"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubgraphPointer {
    pub subgraph_id: String,
    pub notification_number: u64,
}

impl SubgraphPointer {
    pub fn parse(pointer: &str) -> Result<Self, ContentError> {
        let invalid = || ContentError::InvalidPayload(format!("subgraph pointer {pointer}"));
        let (_, rest) = pointer.split_once(':').ok_or_else(invalid)?;
        let (subgraph_id, number) = rest.split_once('+').ok_or_else(invalid)?;
        if subgraph_id.is_empty() {
            return Err(invalid());
        }
        Ok(Self {
            subgraph_id: subgraph_id.to_string(),
            notification_number: number.trim().parse().map_err(|_| invalid())?,
        })
    }

    /// The two query shapes, in the order they are attempted.
    pub fn queries(&self) -> [(&'static str, String); 2] {
        ["epnsPushNotifications", "pushNotifications"].map(|field| {
            (
                field,
                format!(
                    "{{ {field}(where: {{notificationNumber: {}}}) {{ notificationNumber recipient notification }} }}",
                    self.notification_number
                ),
            )
        })
    }
}

/// Chat message kinds a `4+<prefix>:<cid>` pointer can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatPointerKind {
    Chat,
    Video,
    Space,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPointer {
    pub kind: ChatPointerKind,
    pub cid: String,
}

impl ChatPointer {
    pub fn parse(pointer: &str) -> Result<Self, ContentError> {
        let (prefix, cid) = pointer
            .split_once(':')
            .filter(|(_, cid)| !cid.is_empty())
            .ok_or_else(|| ContentError::InvalidPayload(format!("chat pointer {pointer}")))?;
        let kind = match prefix {
            "video" => ChatPointerKind::Video,
            "space" | "spaces" => ChatPointerKind::Space,
            _ => ChatPointerKind::Chat,
        };
        Ok(Self {
            kind,
            cid: cid.to_string(),
        })
    }

    /// Stored message reference.
    pub fn reference(&self) -> String {
        format!("v2:{}", self.cid)
    }
}

//! # Inbound Ports (Driving Ports / API)

use crate::domain::errors::ContentError;
use async_trait::async_trait;
use np_01_payload_codec::PayloadIdentity;
use serde_json::Value;

#[async_trait]
pub trait ContentApi: Send + Sync {
    /// Resolve an identity to the canonical payload JSON.
    ///
    /// `inline` is the payload carried by the identity itself, if any.
    async fn resolve(
        &self,
        identity: &PayloadIdentity,
        inline: Option<&Value>,
    ) -> Result<Value, ContentError>;
}

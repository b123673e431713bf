//! Inbound port: recipient resolution API.

use crate::domain::entities::{RecipientQuery, ResolvedRecipients};
use crate::domain::errors::RecipientError;
use async_trait::async_trait;

#[async_trait]
pub trait RecipientApi: Send + Sync {
    /// Compute the subscribed and unsubscribed recipients of a feed.
    async fn resolve(&self, query: &RecipientQuery<'_>)
        -> Result<ResolvedRecipients, RecipientError>;
}

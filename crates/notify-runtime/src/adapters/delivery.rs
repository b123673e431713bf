//! Delivery transport that writes resolved feeds to the log.
//!
//! Socket and SNS transports plug into the same port from outside the engine.

use async_trait::async_trait;
use np_04_feed_composition::FeedItem;
use np_06_processing_queue::{DeliveryError, DeliveryTransport};
use tracing::info;

#[derive(Debug, Default)]
pub struct LogTransport;

#[async_trait]
impl DeliveryTransport for LogTransport {
    fn name(&self) -> &str {
        "log"
    }

    async fn publish(&self, item: &FeedItem) -> Result<(), DeliveryError> {
        info!(
            sender = %item.header.sender,
            recipients = item.header.recipients_resolved.len(),
            source = %item.header.source,
            title = %item.payload.notification.title,
            "[runtime] Feed published"
        );
        Ok(())
    }
}

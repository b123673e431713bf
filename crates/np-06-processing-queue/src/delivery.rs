//! # Delivery Fan-out
//!
//! Each transport gets its own task. Publishing is unordered, does not wait
//! for completion and is never retried here; a failing transport does not
//! affect the others.

use crate::ports::outbound::DeliveryTransport;
use np_04_feed_composition::FeedItem;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Clone, Default)]
pub struct DeliveryFanout {
    transports: Vec<Arc<dyn DeliveryTransport>>,
}

impl DeliveryFanout {
    pub fn new(transports: Vec<Arc<dyn DeliveryTransport>>) -> Self {
        Self { transports }
    }

    pub fn with_transport(mut self, transport: Arc<dyn DeliveryTransport>) -> Self {
        self.transports.push(transport);
        self
    }

    pub fn len(&self) -> usize {
        self.transports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transports.is_empty()
    }

    /// Spawn one publish per transport. Must be called inside a Tokio runtime.
    ///
    /// The handles are only for callers that want to observe completion.
    pub fn publish(&self, item: &FeedItem) -> Vec<JoinHandle<()>> {
        self.transports
            .iter()
            .map(|transport| {
                let transport = Arc::clone(transport);
                let item = item.clone();
                tokio::spawn(async move {
                    match transport.publish(&item).await {
                        Ok(()) => debug!(
                            transport = transport.name(),
                            recipients = item.header.recipients_resolved.len(),
                            "[np-06] Feed delivered"
                        ),
                        Err(e) => warn!("[np-06] {}", e),
                    }
                })
            })
            .collect()
    }
}

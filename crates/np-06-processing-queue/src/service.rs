//! # Processing Queue
//!
//! ## Ingestion
//!
//! 1. Decode the identity and sender, then verify. Failures are returned
//!    and nothing is stored.
//! 2. Persist the row (`processed = false`, `attempts = 0`).
//! 3. Make one best-effort inline run of the pipeline.
//!
//! ## Sweep
//!
//! Up to `batch_size` pending rows are replayed strictly one after another.
//! Success stores the feeds and marks the row processed; any failure bumps
//! `attempts`. Rows at `max_attempts` are abandoned and never selected again.

use crate::delivery::DeliveryFanout;
use crate::domain::entities::{
    FeedRecord, IncomingPayload, IngestOutcome, NewPayload, PayloadItem, QueueConfig,
    ResolvedFeed, SweepReport,
};
use crate::domain::errors::QueueError;
use crate::metrics;
use crate::pipeline::FeedPipeline;
use crate::ports::inbound::QueueApi;
use crate::ports::outbound::{FeedStore, PayloadStore, StoreError};
use async_trait::async_trait;
use np_01_payload_codec::PayloadIdentity;
use np_02_verification::{
    VerificationApi, VerificationError, VerificationOutcome, VerificationRequest,
};
use parking_lot::Mutex;
use shared_types::{
    CaipAddress, ChannelDirectory, PayloadId, TimeSource, SIMULATE_SOURCE,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Collaborators of the queue.
pub struct QueuePorts {
    pub verifier: Arc<dyn VerificationApi>,
    pub channels: Arc<dyn ChannelDirectory>,
    pub pipeline: FeedPipeline,
    pub payloads: Arc<dyn PayloadStore>,
    pub feeds: Arc<dyn FeedStore>,
    pub fanout: DeliveryFanout,
    pub time: Arc<dyn TimeSource>,
}

/// Outcome of one pipeline run against a stored row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunOutcome {
    Processed,
    Retrying,
    Abandoned,
    /// Another run holds the row.
    Skipped,
}

pub struct ProcessingQueue {
    ports: QueuePorts,
    config: QueueConfig,
    /// Rows currently inside a pipeline run.
    in_flight: Mutex<HashSet<PayloadId>>,
    sweep_lock: tokio::sync::Mutex<()>,
}

impl ProcessingQueue {
    pub fn new(ports: QueuePorts, config: QueueConfig) -> Self {
        Self {
            ports,
            config,
            in_flight: Mutex::new(HashSet::new()),
            sweep_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Decode and verify an incoming payload.
    async fn verify(
        &self,
        payload: &IncomingPayload,
    ) -> Result<(PayloadIdentity, VerificationOutcome), QueueError> {
        let identity = PayloadIdentity::decode(&payload.identity)?;
        let sender = CaipAddress::parse(&payload.sender)
            .map_err(|e| QueueError::InvalidSender(e.to_string()))?;

        let request = VerificationRequest {
            proof: payload.verification_proof.clone(),
            identity: identity.clone(),
            chain_id: sender.chain_id.unwrap_or(self.config.default_chain_id),
            sender,
            sender_type: payload.sender_type,
            recipient: payload.recipient.clone(),
            source: payload.source.clone(),
            rules: payload.rules,
        };
        let outcome = self.ports.verifier.verify(&request).await;

        if !outcome.verified {
            let bypassed = payload.rules.bypass_verification
                && outcome
                    .error
                    .as_ref()
                    .is_some_and(VerificationError::is_not_attempted);
            if !bypassed {
                let reason = outcome.reason().unwrap_or_else(|| "not verified".into());
                metrics::record_ingest("rejected");
                return Err(QueueError::VerificationFailed(reason));
            }
            info!(sender = %payload.sender, "[np-06] Verification bypassed by rules");
        }
        Ok((identity, outcome))
    }

    /// A channel's non-broadcast target that is not currently subscribed.
    async fn is_spam(
        &self,
        payload: &IncomingPayload,
        channel: Option<&str>,
    ) -> Result<bool, QueueError> {
        if payload.sender_type.is_chat() {
            return Ok(false);
        }
        let Some(channel) = channel else {
            return Ok(false);
        };
        let recipient = CaipAddress::plain(&payload.recipient).to_lowercase();
        if recipient == channel {
            return Ok(false);
        }
        let row = self
            .ports
            .channels
            .get_subscriber(channel, &recipient)
            .await?;
        Ok(!row.is_some_and(|row| row.is_currently_subscribed))
    }

    async fn new_row(&self, payload: &IncomingPayload) -> Result<NewPayload, QueueError> {
        let (identity, outcome) = self.verify(payload).await?;
        let is_spam = self.is_spam(payload, outcome.channel.as_deref()).await?;
        Ok(NewPayload {
            verification_proof: payload.verification_proof.clone(),
            sender: payload.sender.clone(),
            delegate: outcome.delegate,
            channel: outcome.channel,
            sender_type: payload.sender_type,
            recipient: payload.recipient.clone(),
            storage_type: identity.storage_type,
            identity: identity.encode(),
            source: payload.source.clone(),
            is_spam,
            og_payload: identity.inline_json(),
            timestamp: self.ports.time.now(),
        })
    }

    fn claim(&self, id: PayloadId) -> Option<Claim<'_>> {
        self.in_flight.lock().insert(id).then_some(Claim { queue: self, id })
    }

    /// Run the pipeline for a stored row and record the result.
    async fn process(&self, item: &PayloadItem) -> RunOutcome {
        let Some(_claim) = self.claim(item.id) else {
            debug!(payload_id = item.id, "[np-06] Row already in flight");
            return RunOutcome::Skipped;
        };

        let result = match self.ports.pipeline.resolve(item).await {
            Ok(resolved) => self.commit(item, &resolved).await.map(|()| resolved),
            Err(e) => {
                warn!(payload_id = item.id, attempts = item.attempts, "[np-06] Pipeline failed: {}", e);
                return self.fail(item).await;
            }
        };

        match result {
            Ok(resolved) => {
                metrics::record_pipeline_run(true);
                for (feed, _) in resolved.items() {
                    self.ports.fanout.publish(feed);
                }
                info!(payload_id = item.id, "[np-06] Payload processed");
                RunOutcome::Processed
            }
            Err(e) => {
                warn!(payload_id = item.id, "[np-06] Could not store feed: {}", e);
                self.fail(item).await
            }
        }
    }

    async fn commit(&self, item: &PayloadItem, resolved: &ResolvedFeed) -> Result<(), StoreError> {
        for (feed, is_spam) in resolved.items() {
            self.ports
                .feeds
                .insert(FeedRecord {
                    payload_id: item.id,
                    item: feed.clone(),
                    is_spam,
                })
                .await?;
        }
        self.ports
            .payloads
            .mark_processed(item.id, &resolved.content)
            .await
    }

    async fn fail(&self, item: &PayloadItem) -> RunOutcome {
        metrics::record_pipeline_run(false);
        match self.ports.payloads.bump_attempts(item.id).await {
            Ok(attempts) if attempts >= self.config.max_attempts => {
                warn!(payload_id = item.id, attempts, "[np-06] Payload abandoned");
                metrics::record_abandoned();
                RunOutcome::Abandoned
            }
            Ok(attempts) => {
                debug!(payload_id = item.id, attempts, "[np-06] Payload will be retried");
                RunOutcome::Retrying
            }
            Err(e) => {
                error!(payload_id = item.id, "[np-06] Could not bump attempts: {}", e);
                RunOutcome::Retrying
            }
        }
    }
}

/// Releases a row's in-flight marker on drop.
struct Claim<'a> {
    queue: &'a ProcessingQueue,
    id: PayloadId,
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        self.queue.in_flight.lock().remove(&self.id);
    }
}

#[async_trait]
impl QueueApi for ProcessingQueue {
    async fn add_external_payload(
        &self,
        payload: IncomingPayload,
    ) -> Result<IngestOutcome, QueueError> {
        if payload.source == SIMULATE_SOURCE {
            let resolved = self.simulate(payload).await?;
            return Ok(IngestOutcome::Simulated(Box::new(resolved)));
        }

        let row = self.new_row(&payload).await?;
        let payload_id = self.ports.payloads.insert(row).await?;
        metrics::record_ingest("persisted");
        info!(
            payload_id,
            sender = %payload.sender,
            source = %payload.source,
            "[np-06] Payload persisted"
        );

        let processed = match self.ports.payloads.get(payload_id).await? {
            Some(item) => self.process(&item).await == RunOutcome::Processed,
            None => false,
        };
        Ok(IngestOutcome::Persisted {
            payload_id,
            processed,
        })
    }

    async fn batch_process_payloads(&self) -> Result<SweepReport, QueueError> {
        let Ok(_guard) = self.sweep_lock.try_lock() else {
            debug!("[np-06] Sweep already running, skipping");
            return Ok(SweepReport::default());
        };

        let rows = self
            .ports
            .payloads
            .select_pending(self.config.max_attempts, self.config.batch_size)
            .await?;
        let mut report = SweepReport {
            selected: rows.len(),
            ..Default::default()
        };

        for row in &rows {
            match self.process(row).await {
                RunOutcome::Processed => report.processed += 1,
                RunOutcome::Retrying => report.failed += 1,
                RunOutcome::Abandoned => {
                    report.failed += 1;
                    report.abandoned += 1;
                }
                RunOutcome::Skipped => {}
            }
        }

        if report.selected > 0 {
            info!(
                selected = report.selected,
                processed = report.processed,
                failed = report.failed,
                abandoned = report.abandoned,
                "[np-06] Sweep complete"
            );
        }
        Ok(report)
    }

    async fn simulate(&self, payload: IncomingPayload) -> Result<ResolvedFeed, QueueError> {
        let row = self.new_row(&payload).await?;
        let item = PayloadItem::from_new(0, row);
        let resolved = self.ports.pipeline.resolve(&item).await?;
        debug!(sender = %payload.sender, "[np-06] Simulated payload");
        Ok(resolved)
    }

    async fn pending_count(&self) -> Result<usize, QueueError> {
        Ok(self
            .ports
            .payloads
            .count_pending(self.config.max_attempts)
            .await?)
    }

    async fn abandoned(&self) -> Result<Vec<PayloadItem>, QueueError> {
        Ok(self
            .ports
            .payloads
            .select_abandoned(self.config.max_attempts)
            .await?)
    }
}

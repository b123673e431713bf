//! Dependency wiring.
//!
//! ```text
//! InMemoryDirectory ─┬─> np-02 VerificationService ──────────────┐
//!                    ├─> np-03 ContentResolver ──┐                 │
//!                    ├─> np-05 RecipientResolver ┴─> FeedPipeline ─┴─> np-06 ProcessingQueue
//!                    └─> spam lookup ──────────────────────────────┘
//! ```

use super::config::{ConfigError, EngineConfig};
use crate::adapters::{
    DirectorySeed, HttpContentStore, HttpPgpVerifier, LocalPgpVerifier, LogTransport,
    RpcChainClient,
};
use np_02_verification::{PgpVerifier, VerificationService};
use np_03_content_resolution::ContentResolver;
use np_05_recipient_resolution::RecipientResolver;
use np_06_processing_queue::{
    DeliveryFanout, DeliveryTransport, FeedPipeline, InMemoryFeedStore, InMemoryPayloadStore,
    ProcessingQueue, QueuePorts,
};
use shared_types::{InMemoryDirectory, SystemTimeSource, TimeSource};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub struct EngineContainer {
    pub config: EngineConfig,
    pub directory: Arc<InMemoryDirectory>,
    pub payloads: Arc<InMemoryPayloadStore>,
    pub feeds: Arc<InMemoryFeedStore>,
    pub queue: Arc<ProcessingQueue>,
}

impl EngineContainer {
    /// Build from configuration, loading the directory seed if one is set.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        let directory = Arc::new(InMemoryDirectory::new());
        if let Some(path) = &config.directory_seed {
            DirectorySeed::load(path)?.apply(&directory);
            info!(path = %path.display(), "[runtime] Directory seed loaded");
        }
        Self::with_directory(config, directory, vec![Arc::new(LogTransport)])
    }

    pub fn with_directory(
        config: EngineConfig,
        directory: Arc<InMemoryDirectory>,
        transports: Vec<Arc<dyn DeliveryTransport>>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        let time: Arc<dyn TimeSource> = Arc::new(SystemTimeSource);

        for chain_id in config.verification.communicators.keys() {
            if !config.rpc_endpoints.contains_key(chain_id) {
                warn!(chain_id, "[runtime] No RPC endpoint; eip155 proofs on this chain will fail");
            }
        }
        let chain = Arc::new(RpcChainClient::new(http.clone(), config.rpc_endpoints.clone()));

        let pgp: Arc<dyn PgpVerifier> = match &config.pgp_verifier_url {
            Some(url) => {
                info!(url = %url, "[runtime] Using remote PGP verifier");
                Arc::new(HttpPgpVerifier::new(http.clone(), url.clone()))
            }
            None => Arc::new(LocalPgpVerifier),
        };

        let verifier = Arc::new(VerificationService::new(
            directory.clone(),
            directory.clone(),
            chain,
            pgp,
            config.verification.clone(),
        ));
        let content = Arc::new(ContentResolver::new(
            Arc::new(HttpContentStore::new(http, config.content.ipfs_gateway.clone())),
            directory.clone(),
            config.content.clone(),
        ));
        let recipients = Arc::new(RecipientResolver::new(
            directory.clone(),
            directory.clone(),
            config.recipients.clone(),
        ));

        let payloads = Arc::new(InMemoryPayloadStore::new());
        let feeds = Arc::new(InMemoryFeedStore::new());
        let ports = QueuePorts {
            verifier,
            channels: directory.clone(),
            pipeline: FeedPipeline::new(directory.clone(), content, recipients, time.clone()),
            payloads: payloads.clone(),
            feeds: feeds.clone(),
            fanout: DeliveryFanout::new(transports),
            time,
        };
        let queue = Arc::new(ProcessingQueue::new(ports, config.queue.clone()));

        info!(
            max_attempts = config.queue.max_attempts,
            batch_size = config.queue.batch_size,
            chains = config.rpc_endpoints.len(),
            "[runtime] Engine wired"
        );

        Ok(Self {
            config,
            directory,
            payloads,
            feeds,
            queue,
        })
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.config.queue.sweep_interval_secs)
    }
}

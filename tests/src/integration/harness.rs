//! # Integration Harness
//!
//! Wires the real verification, content, recipient and queue services over
//! an in-memory directory. Only the chain, the content backends and PGP are
//! stubbed. The channel's address is derived from a freshly generated key so
//! `eip712v2` proofs verify for real.

use async_trait::async_trait;
use k256::ecdsa::{RecoveryId, SigningKey};
use np_02_verification::{
    address_from_pubkey, keccak256, typed_data_digest, ChainClient, ChainError, Eip712Domain,
    LogEntry, PgpError, PgpVerifier, TransactionReceipt, TypedMessage, VerificationConfig,
    VerificationRules, VerificationService,
};
use np_03_content_resolution::{ContentConfig, ContentResolver, ContentStore, ContentStoreError};
use np_04_feed_composition::FeedItem;
use np_05_recipient_resolution::{RecipientConfig, RecipientResolver};
use np_06_processing_queue::{
    DeliveryError, DeliveryFanout, DeliveryTransport, FeedPipeline, InMemoryFeedStore,
    InMemoryPayloadStore, IncomingPayload, ProcessingQueue, QueueConfig, QueuePorts,
};
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use shared_types::{Channel, FixedTimeSource, InMemoryDirectory, SenderType, Subscriber};
use std::collections::HashMap;
use std::sync::Arc;

pub const SUBSCRIBER_A: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
pub const SUBSCRIBER_B: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";
pub const OUTSIDER: &str = "0xcccccccccccccccccccccccccccccccccccccccc";

pub const START_TIME: u64 = 1_700_000_000;

// =============================================================================
// STUBBED COLLABORATORS
// =============================================================================

#[derive(Default)]
pub struct StaticChain {
    receipts: RwLock<HashMap<String, TransactionReceipt>>,
}

impl StaticChain {
    pub fn insert(&self, tx_hash: &str, receipt: TransactionReceipt) {
        self.receipts.write().insert(tx_hash.to_string(), receipt);
    }
}

#[async_trait]
impl ChainClient for StaticChain {
    async fn get_transaction_receipt(
        &self,
        _chain_id: u64,
        tx_hash: &str,
    ) -> Result<Option<TransactionReceipt>, ChainError> {
        Ok(self.receipts.read().get(tx_hash).cloned())
    }
}

pub struct RejectingPgp;

#[async_trait]
impl PgpVerifier for RejectingPgp {
    async fn verify(
        &self,
        _message: &str,
        _signature: &str,
        _public_key: &str,
    ) -> Result<bool, PgpError> {
        Ok(false)
    }
}

/// IPFS documents by CID. Subgraph queries always fail.
#[derive(Default)]
pub struct ContentFixtures {
    documents: RwLock<HashMap<String, Value>>,
}

impl ContentFixtures {
    pub fn insert(&self, cid: &str, document: Value) {
        self.documents.write().insert(cid.to_string(), document);
    }
}

#[async_trait]
impl ContentStore for ContentFixtures {
    async fn get_by_pointer(&self, pointer: &str) -> Result<Value, ContentStoreError> {
        self.documents
            .read()
            .get(pointer)
            .cloned()
            .ok_or_else(|| ContentStoreError::NotFound(pointer.to_string()))
    }

    async fn query(&self, endpoint: &str, _query: &str) -> Result<Value, ContentStoreError> {
        Err(ContentStoreError::Backend(format!("{endpoint} unreachable")))
    }
}

#[derive(Default)]
pub struct RecordingTransport {
    pub items: Mutex<Vec<FeedItem>>,
}

#[async_trait]
impl DeliveryTransport for RecordingTransport {
    fn name(&self) -> &str {
        "recording"
    }

    async fn publish(&self, item: &FeedItem) -> Result<(), DeliveryError> {
        self.items.lock().push(item.clone());
        Ok(())
    }
}

// =============================================================================
// SIGNING
// =============================================================================

pub fn key_address(key: &SigningKey) -> String {
    format!("0x{}", hex::encode(address_from_pubkey(key.verifying_key())))
}

/// `eip712v2:<r‖s‖v>` over `identity`, low-S normalized.
pub fn sign_eip712_v2(key: &SigningKey, identity: &str, chain_id: u64) -> String {
    let config = VerificationConfig::default();
    let domain = Eip712Domain {
        name: config.eip712_domain_name.clone(),
        chain_id,
        verifying_contract: config.communicator(chain_id).unwrap().to_string(),
    };
    let digest = typed_data_digest(
        &domain,
        &TypedMessage::V2 {
            data: identity.to_string(),
        },
    )
    .unwrap();

    let (signature, recid) = key.sign_prehash_recoverable(&digest).unwrap();
    let (signature, recid) = match signature.normalize_s() {
        Some(normalized) => (
            normalized,
            RecoveryId::new(!recid.is_y_odd(), recid.is_x_reduced()),
        ),
        None => (signature, recid),
    };
    format!(
        "eip712v2:0x{}{:02x}",
        hex::encode(signature.to_bytes()),
        27 + recid.to_byte()
    )
}

// =============================================================================
// ON-CHAIN EVENTS
// =============================================================================

fn address_topic(address: &str) -> String {
    format!("0x{:0>64}", address.trim_start_matches("0x").to_lowercase())
}

/// A `SendNotification(address,address,bytes)` log as the communicator emits it.
pub fn send_notification_log(
    contract: &str,
    channel: &str,
    recipient: &str,
    identity: &[u8],
) -> LogEntry {
    let mut data = vec![0u8; 32];
    data[31] = 0x20;
    let mut length = [0u8; 32];
    length[24..].copy_from_slice(&(identity.len() as u64).to_be_bytes());
    data.extend_from_slice(&length);
    data.extend_from_slice(identity);
    data.resize(data.len() + (32 - identity.len() % 32) % 32, 0);

    LogEntry {
        address: contract.to_string(),
        data: format!("0x{}", hex::encode(data)),
        topics: vec![
            format!(
                "0x{}",
                hex::encode(keccak256(b"SendNotification(address,address,bytes)"))
            ),
            address_topic(channel),
            address_topic(recipient),
        ],
    }
}

// =============================================================================
// HARNESS
// =============================================================================

pub struct Harness {
    pub key: SigningKey,
    /// Lowercase address of `key`, registered as an active channel.
    pub channel: String,
    pub directory: Arc<InMemoryDirectory>,
    pub chain: Arc<StaticChain>,
    pub content: Arc<ContentFixtures>,
    pub payloads: Arc<InMemoryPayloadStore>,
    pub feeds: Arc<InMemoryFeedStore>,
    pub transport: Arc<RecordingTransport>,
    pub time: Arc<FixedTimeSource>,
    pub queue: ProcessingQueue,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(QueueConfig::default())
    }

    pub fn with_config(config: QueueConfig) -> Self {
        let key = SigningKey::random(&mut rand::thread_rng());
        let channel = key_address(&key);

        let directory = Arc::new(InMemoryDirectory::new());
        directory.insert_channel(channel_row(&channel, None));

        let chain = Arc::new(StaticChain::default());
        let content = Arc::new(ContentFixtures::default());
        let time = Arc::new(FixedTimeSource::new(START_TIME));

        let verifier = Arc::new(VerificationService::new(
            directory.clone(),
            directory.clone(),
            chain.clone(),
            Arc::new(RejectingPgp),
            VerificationConfig::default(),
        ));
        let resolver = Arc::new(ContentResolver::new(
            content.clone(),
            directory.clone(),
            ContentConfig::default(),
        ));
        let recipients = Arc::new(RecipientResolver::new(
            directory.clone(),
            directory.clone(),
            RecipientConfig::default(),
        ));
        let payloads = Arc::new(InMemoryPayloadStore::new());
        let feeds = Arc::new(InMemoryFeedStore::new());
        let transport = Arc::new(RecordingTransport::default());

        let queue = ProcessingQueue::new(
            QueuePorts {
                verifier,
                channels: directory.clone(),
                pipeline: FeedPipeline::new(directory.clone(), resolver, recipients, time.clone()),
                payloads: payloads.clone(),
                feeds: feeds.clone(),
                fanout: DeliveryFanout::default().with_transport(transport.clone()),
                time: time.clone(),
            },
            config,
        );

        Self {
            key,
            channel,
            directory,
            chain,
            content,
            payloads,
            feeds,
            transport,
            time,
            queue,
        }
    }

    /// Republish the channel row with a settings schema.
    pub fn publish_settings(&self, settings: &str) {
        self.directory
            .insert_channel(channel_row(&self.channel, Some(settings)));
    }

    pub fn subscribe(&self, subscriber: &str, user_settings: Option<&str>) {
        self.directory.insert_subscriber(Subscriber {
            channel: self.channel.clone(),
            subscriber: subscriber.to_string(),
            is_currently_subscribed: true,
            user_settings: user_settings.map(str::to_string),
            timestamp: START_TIME,
            ..Default::default()
        });
    }

    pub fn sender(&self) -> String {
        format!("eip155:1:{}", self.channel)
    }

    pub fn incoming(&self, proof: String, identity: &str, recipient: &str) -> IncomingPayload {
        IncomingPayload {
            verification_proof: proof,
            sender: self.sender(),
            sender_type: SenderType::Channel,
            recipient: format!("eip155:1:{recipient}"),
            source: "ETH_MAINNET".into(),
            identity: identity.as_bytes().to_vec(),
            rules: VerificationRules::default(),
        }
    }

    /// An `eip712v2` payload signed by the channel key.
    pub fn signed(&self, identity: &str, recipient: &str) -> IncomingPayload {
        self.incoming(sign_eip712_v2(&self.key, identity, 1), identity, recipient)
    }

    /// Wait for spawned deliveries to land.
    pub async fn delivered(&self, expected: usize) -> Vec<FeedItem> {
        for _ in 0..100 {
            if self.transport.items.lock().len() >= expected {
                break;
            }
            tokio::task::yield_now().await;
        }
        self.transport.items.lock().clone()
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

pub fn channel_row(address: &str, settings: Option<&str>) -> Channel {
    Channel {
        channel: address.to_string(),
        name: "Alpha".into(),
        icon: "https://alpha/icon.png".into(),
        url: "https://alpha".into(),
        activation_status: true,
        channel_settings: settings.map(str::to_string),
        ..Default::default()
    }
}

/// `2+<json>` with a notification and the given `data` object.
pub fn direct_identity(data: Value) -> String {
    format!(
        "2+{}",
        serde_json::json!({
            "notification": {"title": "Rates", "body": "Rates moved"},
            "data": data,
        })
    )
}

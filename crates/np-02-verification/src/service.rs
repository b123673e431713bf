//! # Verification Service
//!
//! Application service implementing `VerificationApi`.
//!
//! ## Flow
//!
//! 1. Channel senders: resolve the sender (directly or through an alias) to
//!    an eligible core-chain channel. Failure short-circuits unless the
//!    request is a simulation.
//! 2. Decode the proof; undecodable proofs are "not attempted".
//! 3. Dispatch on the proof scheme.

use crate::domain::abi::decode_send_notification;
use crate::domain::ecdsa::{address_to_hex, recover_address, EcdsaSignature};
use crate::domain::eip712::{typed_data_digest, Eip712Domain, TypedMessage};
use crate::domain::entities::{VerificationConfig, VerificationOutcome, VerificationRequest};
use crate::domain::errors::VerificationError;
use crate::domain::video::{check_video_call, is_video_payload};
use crate::metrics;
use crate::ports::inbound::VerificationApi;
use crate::ports::outbound::{ChainClient, PgpVerifier};
use async_trait::async_trait;
use np_01_payload_codec::{PayloadIdentity, PgpTag, VerificationProof};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use shared_types::{ChannelDirectory, ChatDirectory, SenderType};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Delegate that signed, if not the sender itself.
type SchemeResult = Result<Option<String>, VerificationError>;

pub struct VerificationService {
    channels: Arc<dyn ChannelDirectory>,
    chats: Arc<dyn ChatDirectory>,
    chain: Arc<dyn ChainClient>,
    pgp: Arc<dyn PgpVerifier>,
    config: VerificationConfig,
}

impl VerificationService {
    pub fn new(
        channels: Arc<dyn ChannelDirectory>,
        chats: Arc<dyn ChatDirectory>,
        chain: Arc<dyn ChainClient>,
        pgp: Arc<dyn PgpVerifier>,
        config: VerificationConfig,
    ) -> Self {
        Self {
            channels,
            chats,
            chain,
            pgp,
            config,
        }
    }

    pub fn config(&self) -> &VerificationConfig {
        &self.config
    }

    /// Resolve a channel sender to its core-chain channel address.
    ///
    /// Core chains look the channel up directly; other chains must go
    /// through a verified alias mapping.
    pub async fn resolve_channel(
        &self,
        request: &VerificationRequest,
    ) -> Result<String, VerificationError> {
        let address = request.sender.address_lower();

        let channel_address = if self.config.is_core_chain(request.chain_id) {
            address
        } else {
            let alias_key = request.sender.to_string();
            let alias = self
                .channels
                .get_alias(&alias_key)
                .await?
                .ok_or_else(|| {
                    VerificationError::ChannelIneligible(format!("no alias for {alias_key}"))
                })?;
            if !alias.is_alias_verified || alias.blocked || !alias.activation_status {
                return Err(VerificationError::ChannelIneligible(format!(
                    "alias {alias_key} is unverified, blocked or inactive"
                )));
            }
            alias.channel
        };

        let channel = self
            .channels
            .get_channel(&channel_address)
            .await?
            .ok_or_else(|| {
                VerificationError::ChannelIneligible(format!("channel {channel_address} not found"))
            })?;
        if !channel.is_eligible() {
            return Err(VerificationError::ChannelIneligible(format!(
                "channel {channel_address} is blocked or inactive"
            )));
        }
        Ok(channel.channel)
    }

    async fn dispatch(
        &self,
        proof: &VerificationProof,
        request: &VerificationRequest,
        channel: Option<&str>,
    ) -> SchemeResult {
        match proof {
            VerificationProof::Eip155 { chain_id, tx_hash } => {
                self.verify_eip155(request, chain_id, tx_hash).await
            }
            VerificationProof::Eip712V1 { signature } => {
                let payload = request.identity.inline_json().ok_or_else(|| {
                    VerificationError::MalformedIdentity(
                        "eip712v1 requires an inline payload".into(),
                    )
                })?;
                let message = TypedMessage::v1_from_payload(&payload);
                self.verify_eip712(request, channel, &message, signature).await
            }
            VerificationProof::Eip712V2 { signature } => {
                let message = TypedMessage::V2 {
                    data: request.identity.encode(),
                };
                self.verify_eip712(request, channel, &message, signature).await
            }
            VerificationProof::TheGraph {
                subgraph_id,
                notification_number,
            } => {
                self.verify_subgraph(request, channel, subgraph_id, notification_number)
                    .await
            }
            VerificationProof::PgpV2 {
                signature,
                tag,
                chat_id,
            } => self.verify_pgp(request, signature, *tag, chat_id).await,
            VerificationProof::W2wV1 {
                reference_hash,
                did,
            } => self.verify_chat_relay(request, reference_hash, did).await,
        }
    }

    async fn verify_eip155(
        &self,
        request: &VerificationRequest,
        chain_id: &str,
        tx_hash: &str,
    ) -> SchemeResult {
        let chain_id: u64 = chain_id
            .parse()
            .map_err(|_| VerificationError::MalformedProof(format!("chain id {chain_id}")))?;
        let communicator = self.config.communicator(chain_id)?;

        let receipt = self
            .chain
            .get_transaction_receipt(chain_id, tx_hash)
            .await
            .map_err(|e| VerificationError::Chain(e.to_string()))?
            .ok_or_else(|| VerificationError::ReceiptNotFound(tx_hash.to_string()))?;

        let sender = request.sender.address_lower();
        let expected_identity = request.identity.encode();
        let mut failure = VerificationError::NoMatchingLog;

        for log in receipt
            .logs
            .iter()
            .filter(|log| log.address.eq_ignore_ascii_case(communicator))
        {
            let event = match decode_send_notification(log) {
                Ok(event) => event,
                Err(e) => {
                    failure = e;
                    continue;
                }
            };
            if event.channel != sender {
                failure = VerificationError::EventChannelMismatch {
                    expected: sender.clone(),
                    actual: event.channel,
                };
                continue;
            }
            let on_chain = event
                .identity_text()
                .and_then(|text| PayloadIdentity::to_text(&text).ok());
            if on_chain.as_deref() != Some(expected_identity.as_str()) {
                failure = VerificationError::EventIdentityMismatch;
                continue;
            }
            return Ok(None);
        }

        Err(failure)
    }

    async fn verify_eip712(
        &self,
        request: &VerificationRequest,
        channel: Option<&str>,
        message: &TypedMessage,
        signature: &str,
    ) -> SchemeResult {
        let domain = Eip712Domain {
            name: self.config.eip712_domain_name.clone(),
            chain_id: request.chain_id,
            verifying_contract: self.config.communicator(request.chain_id)?.to_string(),
        };
        let digest = typed_data_digest(&domain, message)?;
        let signature = EcdsaSignature::from_hex(signature)?;
        let signer = address_to_hex(&recover_address(&digest, &signature)?);

        let sender = request.sender.address_lower();
        if signer == sender {
            return Ok(None);
        }

        let scope = channel.unwrap_or(&sender);
        let delegates = self.channels.get_delegates(scope).await?;
        if delegates.iter().any(|d| d.eq_ignore_ascii_case(&signer)) {
            debug!("[np-02] Signature accepted from delegate {} of {}", signer, scope);
            return Ok(Some(signer));
        }
        Err(VerificationError::SignerNotAuthorized(signer))
    }

    async fn verify_subgraph(
        &self,
        request: &VerificationRequest,
        channel: Option<&str>,
        subgraph_id: &str,
        notification_number: &str,
    ) -> SchemeResult {
        let sender = request.sender.address_lower();
        let address = channel.unwrap_or(&sender);
        let registered = self.channels.get_channel(address).await?;
        let registered_id = registered.as_ref().and_then(|c| c.subgraph_id());
        if registered_id != Some(subgraph_id) {
            return Err(VerificationError::SubgraphMismatch(subgraph_id.to_string()));
        }

        let embedded = request.identity.segment(2).unwrap_or_default();
        if embedded != notification_number {
            return Err(VerificationError::NotificationNumberMismatch {
                proof: notification_number.to_string(),
                identity: embedded.to_string(),
            });
        }
        Ok(None)
    }

    async fn verify_pgp(
        &self,
        request: &VerificationRequest,
        signature: &str,
        tag: PgpTag,
        chat_id: &str,
    ) -> SchemeResult {
        let sender_did = request.sender.to_did();
        let verifying_data = request.identity.encode();
        let additional_meta = request
            .identity
            .inline_json()
            .as_ref()
            .and_then(additional_meta);

        let message = match tag {
            PgpTag::Internal => additional_meta
                .as_ref()
                .and_then(|meta| meta.get("data"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| {
                    VerificationError::MalformedIdentity("missing additionalMeta.data".into())
                })?,
            PgpTag::Meta => {
                let body = json!({ "data": verifying_data }).to_string();
                hex::encode(Sha256::digest(body.as_bytes()))
            }
        };

        let public_key = self
            .chats
            .get_public_key(&sender_did)
            .await?
            .ok_or_else(|| VerificationError::MissingPublicKey(sender_did.clone()))?;
        let valid = self
            .pgp
            .verify(&message, signature, &public_key)
            .await
            .map_err(|e| VerificationError::Pgp(e.to_string()))?;
        if !valid {
            return Err(VerificationError::PgpSignatureInvalid);
        }

        let chat = self
            .chats
            .get_chat(chat_id)
            .await?
            .ok_or_else(|| VerificationError::ChatNotFound(chat_id.to_string()))?;
        if !chat.has_member(&sender_did) {
            return Err(VerificationError::NotChatMember(sender_did));
        }
        if !chat.has_intent(&sender_did) {
            return Err(VerificationError::NoChatIntent(sender_did));
        }

        if let Some(meta) = additional_meta
            .as_ref()
            .filter(|meta| is_video_payload(Some(*meta), &verifying_data))
        {
            check_video_call(meta, &chat, &sender_did)?;
        }
        Ok(None)
    }

    async fn verify_chat_relay(
        &self,
        request: &VerificationRequest,
        reference_hash: &str,
        did: &str,
    ) -> SchemeResult {
        let reference = format!("v2:{reference_hash}");
        let message = self
            .chats
            .get_message_by_reference(&reference)
            .await?
            .ok_or_else(|| VerificationError::MessageNotFound(reference.clone()))?;

        let sender_did = request.sender.to_did();
        let from = &message.from_did;
        if !from.eq_ignore_ascii_case(did) && !from.eq_ignore_ascii_case(&sender_did) {
            return Err(VerificationError::MessageOriginMismatch(from.clone()));
        }

        let chat = self
            .chats
            .get_chat(&message.chat_id)
            .await?
            .ok_or_else(|| VerificationError::ChatNotFound(message.chat_id.clone()))?;
        if !chat.has_intent(from) && !chat.has_intent(&message.to_did) {
            return Err(VerificationError::NoChatIntent(from.clone()));
        }
        Ok(None)
    }
}

#[async_trait]
impl VerificationApi for VerificationService {
    async fn verify(&self, request: &VerificationRequest) -> VerificationOutcome {
        let channel = if request.sender_type == SenderType::Channel {
            match self.resolve_channel(request).await {
                Ok(channel) => Some(channel),
                Err(e) if !request.is_simulation() => {
                    warn!("[np-02] Rejecting {}: {}", request.sender, e);
                    metrics::record_verification("channel", false);
                    return VerificationOutcome::failed(e, None);
                }
                Err(e) => {
                    debug!("[np-02] Simulation ignores ineligible channel: {}", e);
                    Some(request.sender.address_lower())
                }
            }
        } else {
            None
        };

        let proof = match VerificationProof::decode(&request.proof) {
            Ok(proof) => proof,
            Err(e) => {
                warn!("[np-02] Verification not attempted: {}", e);
                metrics::record_verification("unknown", false);
                return VerificationOutcome::failed(e.into(), channel);
            }
        };

        let scheme = proof.scheme();
        match self.dispatch(&proof, request, channel.as_deref()).await {
            Ok(delegate) => {
                info!(
                    scheme = %scheme,
                    sender = %request.sender,
                    "[np-02] Payload verified"
                );
                metrics::record_verification(&scheme, true);
                VerificationOutcome::verified(channel, delegate)
            }
            Err(e) => {
                warn!(scheme = %scheme, sender = %request.sender, "[np-02] Verification failed: {}", e);
                metrics::record_verification(&scheme, false);
                VerificationOutcome::failed(e, channel)
            }
        }
    }
}

/// `data.additionalMeta` of a payload; stringified metadata is parsed back.
fn additional_meta(payload: &Value) -> Option<Value> {
    match payload.get("data")?.get("additionalMeta")? {
        Value::String(raw) => serde_json::from_str(raw).ok(),
        Value::Null => None,
        other => Some(other.clone()),
    }
}

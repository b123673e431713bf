//! # End-to-End Flows
//!
//! Ingestion through verification, content resolution, feed composition and
//! recipient resolution, with the real services of every subsystem:
//!
//! ```text
//! add_external_payload ─> np-02 verify ─> store row ─> inline pipeline run
//!                                                       │
//!                         np-03 content ─> np-04 compose ─> np-05 recipients
//!                                                       │
//!                                       FeedStore rows + delivery fan-out
//! ```

#[cfg(test)]
mod tests {
    use super::super::harness::*;
    use np_02_verification::{TransactionReceipt, VerificationConfig};
    use np_06_processing_queue::{IngestOutcome, PayloadStore, QueueApi, QueueError};
    use serde_json::json;
    use shared_types::SIMULATE_SOURCE;

    fn persisted(outcome: IngestOutcome) -> (u64, bool) {
        match outcome {
            IngestOutcome::Persisted {
                payload_id,
                processed,
            } => (payload_id, processed),
            IngestOutcome::Simulated(_) => panic!("expected a persisted row"),
        }
    }

    // =========================================================================
    // BROADCAST
    // =========================================================================

    /// A signed broadcast from an active channel reaches every subscriber.
    #[tokio::test]
    async fn test_broadcast_reaches_both_subscribers() {
        let h = Harness::new();
        h.subscribe(SUBSCRIBER_A, None);
        h.subscribe(SUBSCRIBER_B, None);

        let identity = direct_identity(json!({"type": "1", "acta": "https://alpha/rates"}));
        let outcome = h
            .queue
            .add_external_payload(h.signed(&identity, &h.channel))
            .await
            .unwrap();
        let (payload_id, processed) = persisted(outcome);
        assert!(processed);

        let row = h.payloads.get(payload_id).await.unwrap().unwrap();
        assert!(!row.is_spam);
        assert_eq!(row.channel.as_deref(), Some(h.channel.as_str()));
        assert_eq!(row.attempts, 0);

        let records = h.feeds.for_payload(payload_id);
        assert_eq!(records.len(), 1);
        let item = &records[0].item;
        assert_eq!(item.recipient_addresses(), vec![SUBSCRIBER_A, SUBSCRIBER_B]);
        assert_eq!(item.header.sender, h.channel);
        assert_eq!(item.payload.notification.title, "Alpha - Rates");
        assert_eq!(item.payload.data.acta, "https://alpha/rates");
        assert_eq!(item.payload.data.epoch, START_TIME);

        let delivered = h.delivered(1).await;
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].recipient_addresses().len(), 2);
    }

    /// Hex-encoded identity bytes, as emitted on chain, verify against the
    /// decoded text.
    #[tokio::test]
    async fn test_hex_identity_bytes_accepted() {
        let h = Harness::new();
        h.subscribe(SUBSCRIBER_A, None);

        let identity = direct_identity(json!({"type": 1}));
        let mut payload = h.signed(&identity, &h.channel);
        payload.identity = format!("0x{}", hex::encode(identity.as_bytes())).into_bytes();

        let (payload_id, processed) = persisted(h.queue.add_external_payload(payload).await.unwrap());
        assert!(processed);
        assert_eq!(h.payloads.get(payload_id).await.unwrap().unwrap().identity, identity);
    }

    /// Storage type 0 with an inline payload goes through content resolution
    /// and composition untouched.
    #[tokio::test]
    async fn test_embedded_inline_payload_becomes_feed() {
        let h = Harness::new();
        h.subscribe(SUBSCRIBER_A, None);

        let identity = format!(
            "0+{}",
            json!({
                "notification": {"title": "Maintenance", "body": "Bridge paused"},
                "data": {"type": "1", "amsg": "Back at 18:00"}
            })
        );
        let (payload_id, processed) = persisted(
            h.queue
                .add_external_payload(h.signed(&identity, &h.channel))
                .await
                .unwrap(),
        );
        assert!(processed);

        let records = h.feeds.for_payload(payload_id);
        assert_eq!(records.len(), 1);
        let item = &records[0].item;
        assert_eq!(item.payload.notification.title, "Alpha - Maintenance");
        assert_eq!(item.payload.notification.body, "Bridge paused");
        assert_eq!(item.payload.data.amsg, "Back at 18:00");
        assert_eq!(item.recipient_addresses(), vec![SUBSCRIBER_A]);
    }

    #[tokio::test]
    async fn test_embedded_pointer_without_json() {
        let h = Harness::new();
        h.subscribe(SUBSCRIBER_A, None);

        let identity = "0+1+Heads up+Fees drop tonight";
        let (payload_id, processed) = persisted(
            h.queue
                .add_external_payload(h.signed(identity, &h.channel))
                .await
                .unwrap(),
        );
        assert!(processed);
        let item = &h.feeds.for_payload(payload_id)[0].item;
        assert_eq!(item.payload.notification.title, "Alpha - Heads up");
        assert_eq!(item.payload.notification.body, "Fees drop tonight");
    }

    // =========================================================================
    // SINGLE / SPAM
    // =========================================================================

    /// A single notification to a non-subscriber is spam, still persisted
    /// and resolved to exactly the target, whatever the settings say.
    #[tokio::test]
    async fn test_single_to_non_subscriber_is_spam() {
        let h = Harness::new();
        h.publish_settings(r#"[{"type":1,"default":false}]"#);
        h.subscribe(SUBSCRIBER_A, None);

        let identity = direct_identity(json!({"type": "3", "index": "1-1"}));
        let (payload_id, processed) = persisted(
            h.queue
                .add_external_payload(h.signed(&identity, OUTSIDER))
                .await
                .unwrap(),
        );
        assert!(processed);

        let row = h.payloads.get(payload_id).await.unwrap().unwrap();
        assert!(row.is_spam);

        let records = h.feeds.for_payload(payload_id);
        assert_eq!(records.len(), 1);
        assert!(records[0].is_spam);
        assert_eq!(records[0].item.recipient_addresses(), vec![OUTSIDER]);

        // Spam feeds are delivered too, flagged for the transports.
        let delivered = h.delivered(1).await;
        assert_eq!(delivered.len(), 1);
        assert!(delivered[0].header.is_spam);
        assert_eq!(delivered[0].recipient_addresses(), vec![OUTSIDER]);
    }

    #[tokio::test]
    async fn test_single_to_subscriber_is_delivered() {
        let h = Harness::new();
        h.subscribe(SUBSCRIBER_A, None);

        let identity = direct_identity(json!({"type": 3}));
        let (payload_id, _) = persisted(
            h.queue
                .add_external_payload(h.signed(&identity, SUBSCRIBER_A))
                .await
                .unwrap(),
        );

        assert!(!h.payloads.get(payload_id).await.unwrap().unwrap().is_spam);
        let records = h.feeds.for_payload(payload_id);
        assert_eq!(records.len(), 1);
        assert!(!records[0].is_spam);
        assert_eq!(records[0].item.recipient_addresses(), vec![SUBSCRIBER_A]);
        assert_eq!(h.delivered(1).await.len(), 1);
    }

    // =========================================================================
    // SUBSET
    // =========================================================================

    #[tokio::test]
    async fn test_subset_partitions_subscribed_and_spam() {
        let h = Harness::new();
        h.subscribe(SUBSCRIBER_A, None);

        let identity = format!(
            "2+{}",
            json!({
                "notification": {"title": "Batch", "body": "For some"},
                "data": {"type": "4"},
                "recipients": {SUBSCRIBER_A: null, OUTSIDER: null}
            })
        );
        let (payload_id, processed) = persisted(
            h.queue
                .add_external_payload(h.signed(&identity, &h.channel))
                .await
                .unwrap(),
        );
        assert!(processed);

        let records = h.feeds.for_payload(payload_id);
        assert_eq!(records.len(), 2);
        let subscribed = records.iter().find(|r| !r.is_spam).unwrap();
        let spam = records.iter().find(|r| r.is_spam).unwrap();
        assert_eq!(subscribed.item.recipient_addresses(), vec![SUBSCRIBER_A]);
        assert_eq!(spam.item.recipient_addresses(), vec![OUTSIDER]);
        assert!(spam.item.header.is_spam);
        assert_eq!(h.delivered(2).await.len(), 2);
    }

    // =========================================================================
    // VERIFICATION FAILURES
    // =========================================================================

    /// An `eip155` proof whose on-chain event names another channel is
    /// rejected and never stored.
    #[tokio::test]
    async fn test_eip155_channel_mismatch_rejected() {
        let h = Harness::new();
        let identity = direct_identity(json!({"type": 1}));
        let communicator = VerificationConfig::default()
            .communicator(1)
            .unwrap()
            .to_string();
        let tx_hash = "0x9f2c1e5a7b3d4c6e8f0a1b2c3d4e5f60718293a4b5c6d7e8f9a0b1c2d3e4f5a6";
        h.chain.insert(
            tx_hash,
            TransactionReceipt {
                logs: vec![send_notification_log(
                    &communicator,
                    "0x9999999999999999999999999999999999999999",
                    &h.channel,
                    identity.as_bytes(),
                )],
            },
        );

        let payload = h.incoming(format!("eip155:1:{tx_hash}"), &identity, &h.channel);
        let err = h.queue.add_external_payload(payload).await.unwrap_err();

        assert!(matches!(err, QueueError::VerificationFailed(_)));
        assert!(h.payloads.is_empty());
        assert!(h.feeds.records().is_empty());
    }

    #[tokio::test]
    async fn test_eip155_matching_event_accepted() {
        let h = Harness::new();
        h.subscribe(SUBSCRIBER_A, None);
        let identity = direct_identity(json!({"type": 1}));
        let communicator = VerificationConfig::default()
            .communicator(1)
            .unwrap()
            .to_string();
        let tx_hash = "0x01";
        h.chain.insert(
            tx_hash,
            TransactionReceipt {
                logs: vec![send_notification_log(
                    &communicator,
                    &h.channel,
                    &h.channel,
                    identity.as_bytes(),
                )],
            },
        );

        let payload = h.incoming(format!("eip155:1:{tx_hash}"), &identity, &h.channel);
        let (_, processed) = persisted(h.queue.add_external_payload(payload).await.unwrap());
        assert!(processed);
    }

    #[tokio::test]
    async fn test_signature_over_other_identity_rejected() {
        let h = Harness::new();
        let signed_for = direct_identity(json!({"type": 1}));
        let sent = direct_identity(json!({"type": 3}));
        let payload = h.incoming(sign_eip712_v2(&h.key, &signed_for, 1), &sent, &h.channel);

        let err = h.queue.add_external_payload(payload).await.unwrap_err();
        assert!(matches!(err, QueueError::VerificationFailed(_)));
        assert!(h.payloads.is_empty());
    }

    #[tokio::test]
    async fn test_blocked_channel_rejected() {
        let h = Harness::new();
        let mut row = channel_row(&h.channel, None);
        row.blocked = true;
        h.directory.insert_channel(row);

        let identity = direct_identity(json!({"type": 1}));
        let err = h
            .queue
            .add_external_payload(h.signed(&identity, &h.channel))
            .await
            .unwrap_err();
        assert!(matches!(err, QueueError::VerificationFailed(_)));
    }

    #[tokio::test]
    async fn test_malformed_identity_rejected_before_verification() {
        let h = Harness::new();
        let payload = h.incoming("eip712v2:0x00".into(), "no-delimiter", &h.channel);
        let err = h.queue.add_external_payload(payload).await.unwrap_err();
        assert!(matches!(err, QueueError::Identity(_)));
        assert!(h.payloads.is_empty());
    }

    // =========================================================================
    // SIMULATION
    // =========================================================================

    #[tokio::test]
    async fn test_simulate_source_writes_nothing() {
        let h = Harness::new();
        h.subscribe(SUBSCRIBER_A, None);
        h.subscribe(SUBSCRIBER_B, None);

        let identity = direct_identity(json!({"type": 1}));
        let mut payload = h.signed(&identity, &h.channel);
        payload.source = SIMULATE_SOURCE.into();

        let outcome = h.queue.add_external_payload(payload).await.unwrap();
        let IngestOutcome::Simulated(feed) = outcome else {
            panic!("expected a simulated feed");
        };
        assert_eq!(
            feed.subscribed.unwrap().recipient_addresses(),
            vec![SUBSCRIBER_A, SUBSCRIBER_B]
        );
        assert!(h.payloads.is_empty());
        assert!(h.feeds.records().is_empty());
        tokio::task::yield_now().await;
        assert!(h.transport.items.lock().is_empty());
    }
}

//! # Retry Sweep
//!
//! Rows whose pipeline run fails stay pending with a bumped attempt counter
//! until they either succeed or reach the cap and are abandoned for audit.

#[cfg(test)]
mod tests {
    use super::super::harness::*;
    use np_06_processing_queue::{IngestOutcome, PayloadStore, QueueApi, QueueConfig};
    use serde_json::json;

    const CID: &str = "bafybeigdyrzt5sfp7udm7hu76uh7y26nf3efuylqabf3oclgtqy55fbzdi";

    fn ipfs_identity() -> String {
        format!("1+{CID}")
    }

    async fn ingest_ipfs(h: &Harness) -> u64 {
        let identity = ipfs_identity();
        match h
            .queue
            .add_external_payload(h.signed(&identity, &h.channel))
            .await
            .unwrap()
        {
            IngestOutcome::Persisted {
                payload_id,
                processed,
            } => {
                assert!(!processed, "IPFS document is not published yet");
                payload_id
            }
            IngestOutcome::Simulated(_) => panic!("expected a persisted row"),
        }
    }

    #[tokio::test]
    async fn test_failed_inline_attempt_is_recovered_by_sweep() {
        let h = Harness::new();
        h.subscribe(SUBSCRIBER_A, None);
        let id = ingest_ipfs(&h).await;
        assert_eq!(h.payloads.get(id).await.unwrap().unwrap().attempts, 1);
        assert_eq!(h.queue.pending_count().await.unwrap(), 1);

        h.content.insert(
            CID,
            json!({
                "notification": {"title": "Late", "body": "Pinned now"},
                "data": {"type": "1"}
            }),
        );
        let report = h.queue.batch_process_payloads().await.unwrap();
        assert_eq!(report.selected, 1);
        assert_eq!(report.processed, 1);

        let row = h.payloads.get(id).await.unwrap().unwrap();
        assert!(row.processed);
        assert_eq!(row.og_payload.unwrap()["notification"]["title"], "Late");
        assert_eq!(
            h.feeds.for_payload(id)[0].item.recipient_addresses(),
            vec![SUBSCRIBER_A]
        );
    }

    /// At `cap - 1`, one more failure reaches the cap and the row is never
    /// selected again.
    #[tokio::test]
    async fn test_row_at_cap_is_abandoned() {
        let h = Harness::with_config(QueueConfig {
            max_attempts: 3,
            ..QueueConfig::default()
        });
        let id = ingest_ipfs(&h).await;
        h.payloads.set_attempts(id, 2);

        let report = h.queue.batch_process_payloads().await.unwrap();
        assert_eq!(report.selected, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.abandoned, 1);

        let row = h.payloads.get(id).await.unwrap().unwrap();
        assert_eq!(row.attempts, 3);
        assert!(!row.processed);

        let report = h.queue.batch_process_payloads().await.unwrap();
        assert_eq!(report.selected, 0);
        assert_eq!(h.queue.pending_count().await.unwrap(), 0);

        let abandoned = h.queue.abandoned().await.unwrap();
        assert_eq!(abandoned.len(), 1);
        assert_eq!(abandoned[0].id, id);

        // Publishing the content afterwards does not revive the row.
        h.content.insert(CID, json!({"notification": {}, "data": {"type": "1"}}));
        assert_eq!(h.queue.batch_process_payloads().await.unwrap().selected, 0);
    }

    #[tokio::test]
    async fn test_repeated_failures_walk_up_to_cap() {
        let h = Harness::with_config(QueueConfig {
            max_attempts: 3,
            ..QueueConfig::default()
        });
        let id = ingest_ipfs(&h).await;

        for expected in 2..=3 {
            h.queue.batch_process_payloads().await.unwrap();
            assert_eq!(h.payloads.get(id).await.unwrap().unwrap().attempts, expected);
        }
        assert!(h.feeds.records().is_empty());
        assert_eq!(h.queue.abandoned().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_sweep_of_processed_rows_is_noop() {
        let h = Harness::new();
        h.subscribe(SUBSCRIBER_A, None);
        let identity = direct_identity(json!({"type": 1}));
        h.queue
            .add_external_payload(h.signed(&identity, &h.channel))
            .await
            .unwrap();
        assert_eq!(h.feeds.records().len(), 1);

        for _ in 0..2 {
            let report = h.queue.batch_process_payloads().await.unwrap();
            assert_eq!(report.selected, 0);
        }
        assert_eq!(h.feeds.records().len(), 1);
    }

    /// Newer rows are tried first within the same attempt count.
    #[tokio::test]
    async fn test_sweep_prefers_fewer_attempts_then_newest() {
        let h = Harness::with_config(QueueConfig {
            batch_size: 1,
            ..QueueConfig::default()
        });
        let older = ingest_ipfs(&h).await;
        h.time.advance(60);
        let newer = ingest_ipfs(&h).await;

        h.queue.batch_process_payloads().await.unwrap();
        assert_eq!(h.payloads.get(newer).await.unwrap().unwrap().attempts, 2);
        assert_eq!(h.payloads.get(older).await.unwrap().unwrap().attempts, 1);

        h.queue.batch_process_payloads().await.unwrap();
        assert_eq!(h.payloads.get(older).await.unwrap().unwrap().attempts, 2);
    }
}

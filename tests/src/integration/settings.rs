//! # Notification Settings Through the Pipeline
//!
//! Broadcasts carrying `data.index` are filtered per subscriber against the
//! channel's published schema and each subscriber's saved choices.

#[cfg(test)]
mod tests {
    use super::super::harness::*;
    use np_06_processing_queue::{IngestOutcome, QueueApi};
    use serde_json::json;

    /// Recipients of the subscribed feed for one signed broadcast.
    async fn broadcast_recipients(h: &Harness, index: &str) -> Vec<String> {
        let identity = direct_identity(json!({"type": "1", "index": index}));
        let outcome = h
            .queue
            .add_external_payload(h.signed(&identity, &h.channel))
            .await
            .unwrap();
        let IngestOutcome::Persisted {
            payload_id,
            processed,
        } = outcome
        else {
            panic!("expected a persisted row");
        };
        assert!(processed);
        h.feeds
            .for_payload(payload_id)
            .iter()
            .filter(|record| !record.is_spam)
            .flat_map(|record| record.item.recipient_addresses())
            .map(str::to_string)
            .collect()
    }

    #[tokio::test]
    async fn test_boolean_default_on_includes_subscriber_without_override() {
        let h = Harness::new();
        h.publish_settings(r#"[{"type":1,"default":true,"description":"Rates"}]"#);
        h.subscribe(SUBSCRIBER_A, None);

        assert_eq!(broadcast_recipients(&h, "1-1").await, vec![SUBSCRIBER_A]);
    }

    #[tokio::test]
    async fn test_type_mismatch_excludes_everyone() {
        let h = Harness::new();
        h.publish_settings(r#"[{"type":1,"default":true}]"#);
        h.subscribe(SUBSCRIBER_A, None);

        // Nobody left: the row is still processed, with no feed stored.
        assert!(broadcast_recipients(&h, "1-0").await.is_empty());
    }

    #[tokio::test]
    async fn test_explicit_opt_out_beats_channel_default() {
        let h = Harness::new();
        h.publish_settings(
            r#"[{"type":2,"default":10,"enabled":true,"lowerLimit":1,"upperLimit":20}]"#,
        );
        h.subscribe(SUBSCRIBER_A, None);
        h.subscribe(SUBSCRIBER_B, Some(r#"[{"type":2,"user":false}]"#));

        assert_eq!(broadcast_recipients(&h, "1-2").await, vec![SUBSCRIBER_A]);
    }

    /// A choice saved under an older schema does not crash the match; the
    /// stale type simply makes the subscriber ineligible.
    #[tokio::test]
    async fn test_stale_override_after_schema_change() {
        let h = Harness::new();
        h.publish_settings(r#"[{"type":1,"default":true}]"#);
        h.subscribe(SUBSCRIBER_A, None);
        h.subscribe(SUBSCRIBER_B, Some(r#"[{"type":1,"user":true}]"#));
        assert_eq!(
            broadcast_recipients(&h, "1-1").await,
            vec![SUBSCRIBER_A, SUBSCRIBER_B]
        );

        h.publish_settings(r#"[{"type":2,"default":5,"enabled":true}]"#);
        assert_eq!(broadcast_recipients(&h, "1-2").await, vec![SUBSCRIBER_A]);
    }

    #[tokio::test]
    async fn test_malformed_index_means_no_filter() {
        let h = Harness::new();
        h.publish_settings(r#"[{"type":1,"default":false}]"#);
        h.subscribe(SUBSCRIBER_A, None);
        h.subscribe(SUBSCRIBER_B, None);

        assert_eq!(
            broadcast_recipients(&h, "first-boolean").await,
            vec![SUBSCRIBER_A, SUBSCRIBER_B]
        );
    }

    #[tokio::test]
    async fn test_ranged_index_value_is_not_bounds_checked() {
        let h = Harness::new();
        h.publish_settings(
            r#"[{"type":2,"default":10,"enabled":true,"lowerLimit":1,"upperLimit":20}]"#,
        );
        h.subscribe(SUBSCRIBER_A, None);

        assert_eq!(broadcast_recipients(&h, "1-2-500").await, vec![SUBSCRIBER_A]);
    }
}

//! # Feed Composer
//!
//! Merges channel metadata, the resolved payload and the verification
//! context into a `FeedPayload`, applying length caps and the business
//! rules for secrets and chat-origin notifications.

use crate::domain::entities::{ChannelMeta, FeedData, FeedNotification, FeedPayload, Recipients};
use crate::domain::errors::FeedError;
use crate::domain::rules::{
    clean, truncate, ACTA_MAX, AIMG_MAX, AMSG_MAX, APP_MAX, ASUB_MAX, BODY_MAX,
    CHAT_EXPIRY_SECS, TITLE_MAX,
};
use np_01_payload_codec::VerificationProof;
use serde_json::Value;
use shared_types::json::{is_truthy, value_as_string};
use shared_types::{PayloadType, TimeSource};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

pub struct FeedComposer {
    time: Arc<dyn TimeSource>,
}

impl FeedComposer {
    pub fn new(time: Arc<dyn TimeSource>) -> Self {
        Self { time }
    }

    /// Compose the canonical feed payload.
    ///
    /// `recipient_lower` is the item's plain lowercase recipient (the channel
    /// itself for broadcasts).
    pub fn compose(
        &self,
        channel_meta: Option<&ChannelMeta>,
        original: &Value,
        recipient_lower: &str,
        verification_proof: &str,
    ) -> Result<FeedPayload, FeedError> {
        if !original.is_object() {
            return Err(FeedError::InvalidPayload("payload is not an object".into()));
        }
        let internal;
        let meta = match channel_meta {
            Some(meta) => meta,
            None => {
                internal = ChannelMeta::internal();
                &internal
            }
        };
        let empty = Value::Null;
        let data = original.get("data").unwrap_or(&empty);
        let notification = original.get("notification").unwrap_or(&empty);
        let text = |object: &Value, key: &str| object.get(key).map(value_as_string).unwrap_or_default();

        let kind = data
            .get("type")
            .ok_or_else(|| FeedError::InvalidPayloadType("missing".into()))?;
        let payload_type = PayloadType::from_value(kind)
            .ok_or_else(|| FeedError::InvalidPayloadType(value_as_string(kind)))?;

        let secret = text(data, "secret");
        let title = if secret.is_empty() {
            format!("{} - {}", meta.name, text(notification, "title"))
        } else {
            format!("{} has sent you a secret message!", meta.name)
        };

        let now = self.time.now();
        let chat_origin = VerificationProof::decode(verification_proof)
            .map(|proof| proof.is_chat_proof())
            .unwrap_or(false);
        let (etime, hidden) = if chat_origin {
            (Some(now + CHAT_EXPIRY_SECS), true)
        } else {
            (
                data.get("etime").and_then(as_timestamp),
                data.get("hidden").is_some_and(is_truthy),
            )
        };

        let recipients = match payload_type {
            PayloadType::Broadcast => Recipients::Broadcast(recipient_lower.to_string()),
            PayloadType::Single => {
                let own_secret = original
                    .get("recipients")
                    .and_then(Value::as_object)
                    .and_then(|map| {
                        map.iter()
                            .find(|(address, _)| address.eq_ignore_ascii_case(recipient_lower))
                    })
                    .and_then(|(_, value)| non_empty(value))
                    .or_else(|| (!secret.is_empty()).then(|| secret.clone()));
                Recipients::Targeted(BTreeMap::from([(recipient_lower.to_string(), own_secret)]))
            }
            PayloadType::Subset => {
                let map = original
                    .get("recipients")
                    .and_then(Value::as_object)
                    .ok_or(FeedError::MissingRecipients)?;
                Recipients::Targeted(
                    map.iter()
                        .map(|(address, value)| (address.to_lowercase(), non_empty(value)))
                        .collect(),
                )
            }
        };

        let additional_meta = match data.get("additionalMeta") {
            None | Some(Value::Null) => None,
            // Untyped metadata is stringified for older clients.
            Some(meta @ Value::Object(map)) if !map.contains_key("type") => {
                Some(Value::String(meta.to_string()))
            }
            Some(other) => Some(other.clone()),
        };

        debug!(
            channel = %meta.channel,
            payload_type = payload_type.code(),
            "[np-04] Composed feed payload"
        );

        Ok(FeedPayload {
            notification: FeedNotification {
                title: clean(&title, TITLE_MAX),
                body: truncate(&text(notification, "body"), BODY_MAX),
            },
            data: FeedData {
                kind: payload_type.code().to_string(),
                app: truncate(&meta.name, APP_MAX),
                icon: meta.icon.clone(),
                url: meta.url.clone(),
                sectype: data.get("sectype").and_then(non_empty),
                asub: truncate(&text(data, "asub"), ASUB_MAX),
                amsg: truncate(&text(data, "amsg"), AMSG_MAX),
                acta: truncate(&text(data, "acta"), ACTA_MAX),
                aimg: truncate(&text(data, "aimg"), AIMG_MAX),
                etime,
                hidden,
                silent: data.get("silent").is_some_and(is_truthy),
                additional_meta,
                sid: data.get("sid").and_then(non_empty),
                epoch: now,
                index: data.get("index").and_then(non_empty),
            },
            recipients,
            verification_proof: verification_proof.to_string(),
        })
    }
}

fn non_empty(value: &Value) -> Option<String> {
    Some(value_as_string(value)).filter(|s| !s.is_empty())
}

fn as_timestamp(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared_types::FixedTimeSource;

    fn composer() -> FeedComposer {
        FeedComposer::new(Arc::new(FixedTimeSource::new(1_000)))
    }

    fn meta() -> ChannelMeta {
        ChannelMeta {
            channel: "0xc".into(),
            name: "Alpha".into(),
            icon: "icon.png".into(),
            url: "https://alpha".into(),
            channel_settings: None,
        }
    }

    #[test]
    fn test_broadcast_title_and_recipients() {
        let payload = json!({
            "notification": {"title": "Launch", "body": "We are live"},
            "data": {"type": 1, "asub": "sub", "amsg": "msg"}
        });
        let feed = composer()
            .compose(Some(&meta()), &payload, "0xc", "eip712v2:0xsig")
            .unwrap();
        assert_eq!(feed.notification.title, "Alpha - Launch");
        assert_eq!(feed.recipients, Recipients::Broadcast("0xc".into()));
        assert_eq!(feed.data.app, "Alpha");
        assert_eq!(feed.data.epoch, 1_000);
        assert!(!feed.data.hidden);
    }

    #[test]
    fn test_secret_title_and_single_recipient() {
        let payload = json!({
            "notification": {"title": "ignored", "body": "b"},
            "data": {"type": "3", "secret": "enc"}
        });
        let feed = composer()
            .compose(Some(&meta()), &payload, "0xa", "eip712v2:0xsig")
            .unwrap();
        assert_eq!(feed.notification.title, "Alpha has sent you a secret message!");
        assert_eq!(
            feed.recipients,
            Recipients::Targeted(BTreeMap::from([("0xa".to_string(), Some("enc".to_string()))]))
        );
    }

    #[test]
    fn test_length_caps() {
        let payload = json!({
            "notification": {"title": "t\u{0}".repeat(100), "body": "b".repeat(400)},
            "data": {
                "type": 1, "asub": "s".repeat(100), "amsg": "m".repeat(600),
                "acta": "a\n".repeat(200), "aimg": "i".repeat(300)
            }
        });
        let long_meta = ChannelMeta {
            name: "N".repeat(60),
            ..meta()
        };
        let feed = composer()
            .compose(Some(&long_meta), &payload, "0xc", "eip712v2:0xsig")
            .unwrap();
        assert_eq!(feed.notification.title.chars().count(), 50);
        assert!(!feed.notification.title.contains('\u{0}'));
        assert_eq!(feed.notification.body.len(), 180);
        assert_eq!(feed.data.app.len(), 40);
        assert_eq!(feed.data.asub.len(), 80);
        assert_eq!(feed.data.amsg.len(), 500);
        assert_eq!(feed.data.acta.chars().count(), 255);
        assert!(feed.data.acta.contains('\n'));
        assert_eq!(feed.data.aimg.len(), 255);
    }

    #[test]
    fn test_body_keeps_line_breaks() {
        let payload = json!({
            "notification": {"title": "Weekly\nrecap", "body": "Line one\nLine two\n\n- item"},
            "data": {"type": 1}
        });
        let feed = composer()
            .compose(Some(&meta()), &payload, "0xc", "eip712v2:0xsig")
            .unwrap();
        assert_eq!(feed.notification.title, "Alpha - Weeklyrecap");
        assert_eq!(feed.notification.body, "Line one\nLine two\n\n- item");
    }

    #[test]
    fn test_chat_proof_forces_ephemeral() {
        let payload = json!({
            "notification": {"title": "t", "body": "b"},
            "data": {"type": 3, "etime": 99999, "hidden": false}
        });
        let feed = composer()
            .compose(None, &payload, "0xa", "pgpv2:sig:meta:chat1")
            .unwrap();
        assert_eq!(feed.data.etime, Some(1_010));
        assert!(feed.data.hidden);
        assert_eq!(feed.data.app, "Push");

        let feed = composer()
            .compose(None, &payload, "0xa", "eip712v2:0xsig")
            .unwrap();
        assert_eq!(feed.data.etime, Some(99999));
    }

    #[test]
    fn test_untyped_additional_meta_is_stringified() {
        let payload = json!({
            "notification": {},
            "data": {"type": 1, "additionalMeta": {"foo": "bar"}}
        });
        let feed = composer().compose(None, &payload, "0xc", "x").unwrap();
        assert_eq!(
            feed.data.additional_meta,
            Some(Value::String(r#"{"foo":"bar"}"#.into()))
        );

        let typed = json!({
            "notification": {},
            "data": {"type": 1, "additionalMeta": {"type": "1+1", "data": "{}"}}
        });
        let feed = composer().compose(None, &typed, "0xc", "x").unwrap();
        assert!(feed.data.additional_meta.unwrap().is_object());
    }

    #[test]
    fn test_subset_requires_recipient_map() {
        let payload = json!({
            "notification": {},
            "data": {"type": 4},
            "recipients": {"0xA": null, "0xb": "s"}
        });
        let feed = composer().compose(Some(&meta()), &payload, "", "x").unwrap();
        assert_eq!(feed.recipients.targeted(), vec!["0xa", "0xb"]);

        let missing = json!({"notification": {}, "data": {"type": 4}});
        assert_eq!(
            composer().compose(Some(&meta()), &missing, "", "x"),
            Err(FeedError::MissingRecipients)
        );
    }

    #[test]
    fn test_invalid_payload_type() {
        let payload = json!({"notification": {}, "data": {"type": 2}});
        assert!(matches!(
            composer().compose(None, &payload, "0xc", "x"),
            Err(FeedError::InvalidPayloadType(_))
        ));
    }
}

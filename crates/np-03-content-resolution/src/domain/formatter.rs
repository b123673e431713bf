//! # Payload Formatter
//!
//! Every backend is normalized to the canonical shape:
//!
//! ```json
//! {
//!   "notification": { "title": "...", "body": "..." },
//!   "data": { "type": "1", "secret": "", "asub": "...", "amsg": "...", "acta": "", "aimg": "" },
//!   "recipients": "0x…" | { "0x…": null } | null
//! }
//! ```

use super::entities::ChatPointerKind;
use super::errors::ContentError;
use serde_json::{json, Map, Value};
use shared_types::json::value_as_string;
use shared_types::{CaipAddress, ChatMessage};

/// Build the canonical payload from an embedded `<type>+<title>+<body>`.
pub fn embedded_payload(pointer: &str) -> Result<Value, ContentError> {
    let mut parts = pointer.splitn(3, '+');
    let (Some(kind), Some(title), Some(body)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ContentError::InvalidPayload(format!(
            "embedded pointer {pointer}"
        )));
    };
    Ok(canonical(kind, title, body, "", ""))
}

/// Convert CAIP recipients to plain addresses, in place.
///
/// A single address string is rewritten; for a map every key is.
pub fn normalize_recipients(payload: &mut Value) {
    let Some(recipients) = payload.get_mut("recipients") else {
        return;
    };
    match recipients {
        Value::String(address) => {
            *address = CaipAddress::plain(address).to_string();
        }
        Value::Object(map) => {
            let normalized: Map<String, Value> = std::mem::take(map)
                .into_iter()
                .map(|(key, value)| (CaipAddress::plain(&key).to_string(), value))
                .collect();
            *map = normalized;
        }
        _ => {}
    }
}

/// Format a subgraph `{notificationNumber, recipient, notification}` record.
///
/// `notification` is a JSON string, either already canonical or the flat
/// `{type,title,body,subject,message,image,cta,secret}` form.
pub fn format_subgraph_notification(record: &Value) -> Result<Value, ContentError> {
    let inner = match record.get("notification") {
        Some(Value::String(raw)) => serde_json::from_str::<Value>(raw)
            .map_err(|e| ContentError::Subgraph(format!("notification is not JSON: {e}")))?,
        Some(value @ Value::Object(_)) => value.clone(),
        _ => {
            return Err(ContentError::Subgraph(
                "record has no notification field".into(),
            ))
        }
    };

    let mut payload = if inner.get("notification").is_some() && inner.get("data").is_some() {
        inner
    } else {
        let field = |name: &str| inner.get(name).map(value_as_string).unwrap_or_default();
        let mut payload = canonical(
            &field("type"),
            &field("title"),
            &field("body"),
            &field("cta"),
            &field("image"),
        );
        payload["data"]["asub"] = json!(field("subject"));
        payload["data"]["amsg"] = json!(field("message"));
        payload["data"]["secret"] = json!(field("secret"));
        payload
    };

    if payload.get("recipients").map_or(true, Value::is_null) {
        if let Some(recipient) = record.get("recipient").and_then(Value::as_str) {
            payload["recipients"] = json!(recipient);
        }
    }
    normalize_recipients(&mut payload);
    Ok(payload)
}

/// Format a stored chat, video or space message as an ephemeral notification.
pub fn format_chat_message(kind: ChatPointerKind, message: &ChatMessage) -> Value {
    let from = CaipAddress::plain(&message.from_did).to_string();
    let title = match kind {
        ChatPointerKind::Chat => format!("{from} sent you a message"),
        ChatPointerKind::Video => format!("{from} is calling you"),
        ChatPointerKind::Space => format!("{from} invited you to a space"),
    };
    let body = if message.message_type.eq_ignore_ascii_case("text") {
        message.message_content.clone()
    } else {
        format!("Sent a {}", message.message_type.to_lowercase())
    };

    // Direct messages target one DID; group messages address the chat.
    let (kind_code, recipients) = match CaipAddress::parse(&message.to_did) {
        Ok(to) => ("3", json!(to.address_lower())),
        Err(_) => ("1", Value::Null),
    };

    let mut payload = canonical(kind_code, &title, &body, "", "");
    payload["recipients"] = recipients;
    payload
}

fn canonical(kind: &str, title: &str, body: &str, cta: &str, image: &str) -> Value {
    json!({
        "notification": { "title": title, "body": body },
        "data": {
            "type": kind,
            "secret": "",
            "asub": title,
            "amsg": body,
            "acta": cta,
            "aimg": image,
        },
        "recipients": Value::Null,
    })
}

//! # Video Call Rules
//!
//! Extra checks for chat proofs that carry PUSH_VIDEO call signalling.
//! `additionalMeta.type` is `"<metaType>+<version>"`; metaType `1` is video.

use super::errors::VerificationError;
use serde_json::Value;
use shared_types::Chat;

/// `additionalMeta` use cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdditionalMetaType {
    Custom,
    PushVideo,
    PushSpace,
}

impl AdditionalMetaType {
    /// Parse the metaType half of `"<metaType>+<version>"`.
    pub fn parse(tag: &str) -> Option<Self> {
        let meta_type = tag.split('+').next()?;
        match meta_type.trim() {
            "0" => Some(AdditionalMetaType::Custom),
            "1" => Some(AdditionalMetaType::PushVideo),
            "2" => Some(AdditionalMetaType::PushSpace),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoCallStatus {
    Initialized = 1,
    Received = 2,
    Connected = 3,
    Disconnected = 4,
    RetryInitialized = 5,
    RetryReceived = 6,
}

impl VideoCallStatus {
    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            1 => Some(VideoCallStatus::Initialized),
            2 => Some(VideoCallStatus::Received),
            3 => Some(VideoCallStatus::Connected),
            4 => Some(VideoCallStatus::Disconnected),
            5 => Some(VideoCallStatus::RetryInitialized),
            6 => Some(VideoCallStatus::RetryReceived),
            _ => None,
        }
    }
}

/// Whether a payload is a video call signal.
pub fn is_video_payload(additional_meta: Option<&Value>, identity_text: &str) -> bool {
    let meta_type = additional_meta
        .and_then(|meta| meta.get("type"))
        .and_then(Value::as_str)
        .and_then(AdditionalMetaType::parse);
    meta_type == Some(AdditionalMetaType::PushVideo) && identity_text.starts_with("2+")
}

/// Enforce call-status rules.
///
/// Data that does not parse, or carries no numeric `status`, is allowed.
pub fn check_video_call(
    additional_meta: &Value,
    chat: &Chat,
    sender_did: &str,
) -> Result<(), VerificationError> {
    let Some(status_code) = call_status(additional_meta) else {
        return Ok(());
    };
    let status = VideoCallStatus::from_code(status_code).ok_or_else(|| {
        VerificationError::VideoCallRejected(format!("unknown status {status_code}"))
    })?;

    if status == VideoCallStatus::Initialized && chat.is_group() && !chat.is_admin(sender_did) {
        return Err(VerificationError::VideoCallRejected(
            "only an admin may start a group call".into(),
        ));
    }
    Ok(())
}

fn call_status(additional_meta: &Value) -> Option<u64> {
    let data: Value = match additional_meta.get("data")? {
        Value::String(raw) => serde_json::from_str(raw).ok()?,
        other => other.clone(),
    };
    match data.get("status")? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

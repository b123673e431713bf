//! # SendNotification Log Decoding
//!
//! ```text
//! event SendNotification(address indexed channel, address indexed recipient, bytes identity)
//! ```
//!
//! `topics[1]`/`topics[2]` hold the left-padded addresses; `data` is the ABI
//! encoding of the single dynamic `bytes` argument (offset, length, body).

use super::ecdsa::keccak256;
use super::entities::LogEntry;
use super::errors::VerificationError;
use primitive_types::U256;

pub const SEND_NOTIFICATION_SIGNATURE: &str = "SendNotification(address,address,bytes)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendNotificationEvent {
    /// Lowercase `0x` address.
    pub channel: String,
    pub recipient: String,
    pub identity: Vec<u8>,
}

impl SendNotificationEvent {
    pub fn identity_text(&self) -> Option<String> {
        String::from_utf8(self.identity.clone()).ok()
    }
}

pub fn send_notification_topic() -> String {
    format!(
        "0x{}",
        hex::encode(keccak256(SEND_NOTIFICATION_SIGNATURE.as_bytes()))
    )
}

pub fn decode_send_notification(log: &LogEntry) -> Result<SendNotificationEvent, VerificationError> {
    let topic0 = log
        .topics
        .first()
        .ok_or_else(|| VerificationError::EventDecode("no topics".into()))?;
    if !topic0.eq_ignore_ascii_case(&send_notification_topic()) {
        return Err(VerificationError::EventDecode(format!(
            "unexpected event topic {topic0}"
        )));
    }
    let channel = topic_address(log.topics.get(1))?;
    let recipient = topic_address(log.topics.get(2))?;
    let data = decode_hex(&log.data)?;

    Ok(SendNotificationEvent {
        channel,
        recipient,
        identity: decode_dynamic_bytes(&data, 0)?,
    })
}

fn topic_address(topic: Option<&String>) -> Result<String, VerificationError> {
    let topic = topic.ok_or_else(|| VerificationError::EventDecode("missing topic".into()))?;
    let word = decode_hex(topic)?;
    if word.len() != 32 {
        return Err(VerificationError::EventDecode(format!(
            "topic is {} bytes",
            word.len()
        )));
    }
    Ok(format!("0x{}", hex::encode(&word[12..])))
}

/// Decode the dynamic `bytes` argument whose head word sits at `head`.
fn decode_dynamic_bytes(data: &[u8], head: usize) -> Result<Vec<u8>, VerificationError> {
    let offset = read_word(data, head)?;
    let length = read_word(data, offset)?;
    let start = offset
        .checked_add(32)
        .ok_or_else(|| VerificationError::EventDecode("offset overflow".into()))?;
    let end = start
        .checked_add(length)
        .ok_or_else(|| VerificationError::EventDecode("length overflow".into()))?;
    data.get(start..end)
        .map(<[u8]>::to_vec)
        .ok_or_else(|| VerificationError::EventDecode("bytes out of bounds".into()))
}

fn read_word(data: &[u8], at: usize) -> Result<usize, VerificationError> {
    let end = at
        .checked_add(32)
        .ok_or_else(|| VerificationError::EventDecode("word overflow".into()))?;
    let word = data
        .get(at..end)
        .ok_or_else(|| VerificationError::EventDecode(format!("no word at {at}")))?;
    let value = U256::from_big_endian(word);
    if value > U256::from(u32::MAX) {
        return Err(VerificationError::EventDecode(format!(
            "word at {at} too large"
        )));
    }
    Ok(value.as_usize())
}

fn decode_hex(value: &str) -> Result<Vec<u8>, VerificationError> {
    hex::decode(value.strip_prefix("0x").unwrap_or(value))
        .map_err(|e| VerificationError::EventDecode(e.to_string()))
}

#[cfg(test)]
pub mod test_helpers {
    use super::*;

    fn address_topic(address: &str) -> String {
        let body = address.trim_start_matches("0x").to_lowercase();
        format!("0x{}{}", "0".repeat(24), body)
    }

    /// ABI-encode a `SendNotification` log, as the communicator emits it.
    pub fn encode_send_notification(
        contract: &str,
        channel: &str,
        recipient: &str,
        identity: &[u8],
    ) -> LogEntry {
        let mut data = Vec::new();
        let mut offset = [0u8; 32];
        offset[31] = 0x20;
        data.extend_from_slice(&offset);
        let mut length = [0u8; 32];
        length[24..].copy_from_slice(&(identity.len() as u64).to_be_bytes());
        data.extend_from_slice(&length);
        data.extend_from_slice(identity);
        let padding = (32 - identity.len() % 32) % 32;
        data.extend(std::iter::repeat(0u8).take(padding));

        LogEntry {
            address: contract.to_string(),
            data: format!("0x{}", hex::encode(data)),
            topics: vec![
                send_notification_topic(),
                address_topic(channel),
                address_topic(recipient),
            ],
        }
    }
}

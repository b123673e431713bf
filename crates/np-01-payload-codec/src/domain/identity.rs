//! # Payload Identity
//!
//! Grammar: `"<storageType>+<storagePointer…>"`. Only the first `+` is
//! significant; the pointer may carry further `+`-delimited sub-fields that
//! the content resolver interprets per storage type.
//!
//! Identities emitted by the on-chain communicator arrive as `0x`-prefixed
//! hex bytes and are decoded to UTF-8 first.

use super::errors::CodecError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Where the notification content lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorageType {
    /// Content is embedded in the pointer (`<type>+<title>+<body>`).
    Embedded,
    /// Pointer is an IPFS CID.
    Ipfs,
    /// Pointer is the JSON payload itself.
    Direct,
    /// Pointer references a subgraph notification (or is raw JSON).
    Subgraph,
    /// Pointer references a chat/video/space message.
    Chat,
}

impl StorageType {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "0" => Some(StorageType::Embedded),
            "1" => Some(StorageType::Ipfs),
            "2" => Some(StorageType::Direct),
            "3" => Some(StorageType::Subgraph),
            "4" => Some(StorageType::Chat),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            StorageType::Embedded => 0,
            StorageType::Ipfs => 1,
            StorageType::Direct => 2,
            StorageType::Subgraph => 3,
            StorageType::Chat => 4,
        }
    }
}

/// Decoded `(storageType, storagePointer)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PayloadIdentity {
    pub storage_type: StorageType,
    pub storage_pointer: String,
}

impl PayloadIdentity {
    pub fn new(storage_type: StorageType, storage_pointer: impl Into<String>) -> Self {
        Self {
            storage_type,
            storage_pointer: storage_pointer.into(),
        }
    }

    /// Decode a byte-like identity.
    ///
    /// Accepts raw UTF-8 text or UTF-8 text of the form `0x<hex>` whose
    /// bytes are themselves the UTF-8 identity.
    pub fn decode(input: &[u8]) -> Result<Self, CodecError> {
        let text = std::str::from_utf8(input)
            .map_err(|e| CodecError::MalformedIdentity(format!("not utf-8: {e}")))?;
        Self::decode_str(text)
    }

    /// Decode a textual identity (see [`PayloadIdentity::decode`]).
    pub fn decode_str(input: &str) -> Result<Self, CodecError> {
        let text = Self::to_text(input)?;
        let (prefix, pointer) = text
            .split_once('+')
            .ok_or_else(|| CodecError::MalformedIdentity("missing '+' delimiter".into()))?;
        let storage_type = StorageType::from_code(prefix).ok_or_else(|| {
            CodecError::MalformedIdentity(format!("unknown storage type '{prefix}'"))
        })?;
        Ok(Self::new(storage_type, pointer))
    }

    /// Normalize hex-encoded identities to their UTF-8 text.
    ///
    /// Text that is not `0x`-prefixed is returned unchanged.
    pub fn to_text(input: &str) -> Result<String, CodecError> {
        match input.strip_prefix("0x") {
            Some(hex_body) => {
                let bytes = hex::decode(hex_body)
                    .map_err(|e| CodecError::MalformedIdentity(format!("invalid hex: {e}")))?;
                String::from_utf8(bytes)
                    .map_err(|e| CodecError::MalformedIdentity(format!("not utf-8: {e}")))
            }
            None => Ok(input.to_string()),
        }
    }

    pub fn encode(&self) -> String {
        format!("{}+{}", self.storage_type.code(), self.storage_pointer)
    }

    /// The pointer parsed as a JSON object, for storage types that may carry
    /// their payload inline.
    pub fn inline_json(&self) -> Option<Value> {
        match self.storage_type {
            StorageType::Embedded | StorageType::Direct | StorageType::Subgraph => {
                match serde_json::from_str::<Value>(&self.storage_pointer) {
                    Ok(value) if value.is_object() => Some(value),
                    _ => None,
                }
            }
            StorageType::Ipfs | StorageType::Chat => None,
        }
    }

    /// `n`-th `+`-segment of the full encoded identity (0 is the storage type).
    pub fn segment(&self, n: usize) -> Option<&str> {
        match n {
            0 => None,
            _ => self.storage_pointer.split('+').nth(n - 1),
        }
    }
}

impl fmt::Display for PayloadIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for PayloadIdentity {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode_str(s)
    }
}

//! # EIP-712 Typed Data
//!
//! Digest construction for the two notification signing formats:
//!
//! ```text
//! digest = keccak256(0x19 ‖ 0x01 ‖ domainSeparator ‖ hashStruct(message))
//! ```
//!
//! - v2: `Data(string data)` where `data` is the payload identity
//! - v1: `Data(string acta,string aimg,string amsg,string asub,string type,string secret)`

use super::ecdsa::{keccak256, Hash};
use super::errors::VerificationError;
use serde_json::Value;
use shared_types::json::value_as_string;

pub const DOMAIN_TYPE: &str = "EIP712Domain(string name,uint256 chainId,address verifyingContract)";
pub const DATA_V2_TYPE: &str = "Data(string data)";
pub const DATA_V1_TYPE: &str =
    "Data(string acta,string aimg,string amsg,string asub,string type,string secret)";

/// Field order of the v1 `Data` struct.
pub const DATA_V1_FIELDS: [&str; 6] = ["acta", "aimg", "amsg", "asub", "type", "secret"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eip712Domain {
    pub name: String,
    pub chain_id: u64,
    /// `0x`-prefixed communicator contract address.
    pub verifying_contract: String,
}

impl Eip712Domain {
    pub fn separator(&self) -> Result<Hash, VerificationError> {
        let mut encoded = Vec::with_capacity(32 * 4);
        encoded.extend_from_slice(&keccak256(DOMAIN_TYPE.as_bytes()));
        encoded.extend_from_slice(&keccak256(self.name.as_bytes()));
        encoded.extend_from_slice(&encode_uint(self.chain_id));
        encoded.extend_from_slice(&encode_address(&self.verifying_contract)?);
        Ok(keccak256(&encoded))
    }
}

/// The message half of a notification's typed data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedMessage {
    V1 { fields: [String; 6] },
    V2 { data: String },
}

impl TypedMessage {
    /// Build the v1 message from the `data` object of a direct payload.
    /// Missing fields encode as empty strings.
    pub fn v1_from_payload(payload: &Value) -> Self {
        let data = payload.get("data");
        let fields = DATA_V1_FIELDS.map(|name| {
            data.and_then(|d| d.get(name))
                .map(value_as_string)
                .unwrap_or_default()
        });
        TypedMessage::V1 { fields }
    }

    pub fn struct_hash(&self) -> Hash {
        let mut encoded = Vec::new();
        match self {
            TypedMessage::V1 { fields } => {
                encoded.extend_from_slice(&keccak256(DATA_V1_TYPE.as_bytes()));
                for field in fields {
                    encoded.extend_from_slice(&keccak256(field.as_bytes()));
                }
            }
            TypedMessage::V2 { data } => {
                encoded.extend_from_slice(&keccak256(DATA_V2_TYPE.as_bytes()));
                encoded.extend_from_slice(&keccak256(data.as_bytes()));
            }
        }
        keccak256(&encoded)
    }
}

/// Final digest that gets signed.
pub fn typed_data_digest(
    domain: &Eip712Domain,
    message: &TypedMessage,
) -> Result<Hash, VerificationError> {
    let mut encoded = Vec::with_capacity(2 + 64);
    encoded.extend_from_slice(&[0x19, 0x01]);
    encoded.extend_from_slice(&domain.separator()?);
    encoded.extend_from_slice(&message.struct_hash());
    Ok(keccak256(&encoded))
}

fn encode_uint(value: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

fn encode_address(address: &str) -> Result<[u8; 32], VerificationError> {
    let body = address.strip_prefix("0x").unwrap_or(address);
    let bytes = hex::decode(body)
        .map_err(|e| VerificationError::MalformedSender(format!("{address}: {e}")))?;
    if bytes.len() != 20 {
        return Err(VerificationError::MalformedSender(format!(
            "{address}: expected 20 bytes"
        )));
    }
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(&bytes);
    Ok(word)
}

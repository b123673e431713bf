//! # Verification Proof
//!
//! Grammar: `"<scheme>:<field1>:<field2>…"`, with per-scheme arity:
//!
//! | Scheme | Form |
//! |--------|------|
//! | `eip155` | `eip155:<chainId>:<txHash>` (exactly two fields) |
//! | `eip712v1` / `eip712v2` | `eip712vN:<signature>[::uid::<token>]` |
//! | `thegraph` | `thegraph:<subgraphId>+<notificationNumber>` |
//! | `w2wv1` | `w2wv1:<referenceHash>:<did…>` |
//! | `pgpv2` | `pgpv2:<signature>:<tag>:<chatId>` or `…:<tag>:spaces:<hash>` |
//!
//! The `::uid::` suffix splits into empty fields after the signature and
//! therefore never takes part in verification.

use super::errors::CodecError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What a `pgpv2` signature was computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PgpTag {
    /// The `additionalMeta.data` string of the payload.
    Internal,
    /// SHA-256 hex of `{"data": <identity>}`.
    Meta,
}

impl PgpTag {
    fn parse(tag: &str) -> Option<Self> {
        match tag {
            "internal" => Some(PgpTag::Internal),
            "meta" => Some(PgpTag::Meta),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PgpTag::Internal => "internal",
            PgpTag::Meta => "meta",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerificationProof {
    Eip155 {
        chain_id: String,
        tx_hash: String,
    },
    Eip712V1 {
        signature: String,
    },
    Eip712V2 {
        signature: String,
    },
    TheGraph {
        subgraph_id: String,
        notification_number: String,
    },
    PgpV2 {
        signature: String,
        tag: PgpTag,
        chat_id: String,
    },
    W2wV1 {
        reference_hash: String,
        did: String,
    },
}

impl VerificationProof {
    pub fn decode(proof: &str) -> Result<Self, CodecError> {
        let parts: Vec<&str> = proof.split(':').collect();
        let malformed = |reason: &str| CodecError::MalformedProof(format!("{reason}: {proof}"));

        match parts[0] {
            "eip155" => match parts.as_slice() {
                [_, chain_id, tx_hash] if !chain_id.is_empty() && !tx_hash.is_empty() => {
                    Ok(VerificationProof::Eip155 {
                        chain_id: chain_id.to_string(),
                        tx_hash: tx_hash.to_string(),
                    })
                }
                _ => Err(malformed("eip155 expects <chainId>:<txHash>")),
            },
            "eip712v1" | "eip712v2" => {
                let signature = parts
                    .get(1)
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| malformed("missing signature"))?
                    .to_string();
                if parts[0] == "eip712v1" {
                    Ok(VerificationProof::Eip712V1 { signature })
                } else {
                    Ok(VerificationProof::Eip712V2 { signature })
                }
            }
            "thegraph" => {
                let payload = parts.get(1).ok_or_else(|| malformed("missing payload"))?;
                match payload.split_once('+') {
                    Some((id, number)) if !id.is_empty() && !number.is_empty() => {
                        Ok(VerificationProof::TheGraph {
                            subgraph_id: id.to_string(),
                            notification_number: number.to_string(),
                        })
                    }
                    _ => Err(malformed("thegraph expects <subgraphId>+<notificationNumber>")),
                }
            }
            "w2wv1" => {
                let reference_hash = parts
                    .get(1)
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| malformed("missing reference hash"))?;
                let did = parts.get(2..).map(|rest| rest.join(":")).unwrap_or_default();
                if did.is_empty() {
                    return Err(malformed("missing did"));
                }
                Ok(VerificationProof::W2wV1 {
                    reference_hash: reference_hash.to_string(),
                    did,
                })
            }
            "pgpv2" => {
                if parts.len() < 4 {
                    return Err(malformed("pgpv2 expects <signature>:<tag>:<chatId>"));
                }
                let tag = PgpTag::parse(parts[2]).ok_or_else(|| malformed("unknown pgp tag"))?;
                let chat_id = if parts[3] == "spaces" {
                    let hash = parts
                        .get(4)
                        .filter(|s| !s.is_empty())
                        .ok_or_else(|| malformed("spaces chat id without hash"))?;
                    format!("spaces:{hash}")
                } else {
                    parts[3].to_string()
                };
                if parts[1].is_empty() || chat_id.is_empty() {
                    return Err(malformed("empty pgpv2 field"));
                }
                Ok(VerificationProof::PgpV2 {
                    signature: parts[1].to_string(),
                    tag,
                    chat_id,
                })
            }
            _ => Err(malformed("unknown scheme")),
        }
    }

    /// Scheme token; `eip155` carries its chain id (`eip155:<chainId>`).
    pub fn scheme(&self) -> String {
        match self {
            VerificationProof::Eip155 { chain_id, .. } => format!("eip155:{chain_id}"),
            VerificationProof::Eip712V1 { .. } => "eip712v1".into(),
            VerificationProof::Eip712V2 { .. } => "eip712v2".into(),
            VerificationProof::TheGraph { .. } => "thegraph".into(),
            VerificationProof::PgpV2 { .. } => "pgpv2".into(),
            VerificationProof::W2wV1 { .. } => "w2wv1".into(),
        }
    }

    /// Chat-origin proofs produce ephemeral, hidden notifications.
    pub fn is_chat_proof(&self) -> bool {
        matches!(
            self,
            VerificationProof::PgpV2 { .. } | VerificationProof::W2wV1 { .. }
        )
    }

    pub fn encode(&self) -> String {
        match self {
            VerificationProof::Eip155 { chain_id, tx_hash } => {
                format!("eip155:{chain_id}:{tx_hash}")
            }
            VerificationProof::Eip712V1 { signature } => format!("eip712v1:{signature}"),
            VerificationProof::Eip712V2 { signature } => format!("eip712v2:{signature}"),
            VerificationProof::TheGraph {
                subgraph_id,
                notification_number,
            } => format!("thegraph:{subgraph_id}+{notification_number}"),
            VerificationProof::PgpV2 {
                signature,
                tag,
                chat_id,
            } => format!("pgpv2:{signature}:{}:{chat_id}", tag.as_str()),
            VerificationProof::W2wV1 {
                reference_hash,
                did,
            } => format!("w2wv1:{reference_hash}:{did}"),
        }
    }
}

impl fmt::Display for VerificationProof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for VerificationProof {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

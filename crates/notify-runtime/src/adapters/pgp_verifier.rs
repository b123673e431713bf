//! PGP signature checks.
//!
//! `LocalPgpVerifier` verifies in process and is the default.
//! `HttpPgpVerifier` delegates to a remote service instead:
//! `POST <url>` with `{message, signature, publicKey}` answering
//! `{"valid": bool}`.

use async_trait::async_trait;
use np_02_verification::{PgpError, PgpVerifier};
use pgp::{Deserializable, SignedPublicKey, StandaloneSignature};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyRequest<'a> {
    message: &'a str,
    signature: &'a str,
    public_key: &'a str,
}

#[derive(Deserialize)]
struct VerifyResponse {
    valid: bool,
}

pub struct HttpPgpVerifier {
    client: reqwest::Client,
    url: String,
}

impl HttpPgpVerifier {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl PgpVerifier for HttpPgpVerifier {
    async fn verify(
        &self,
        message: &str,
        signature: &str,
        public_key: &str,
    ) -> Result<bool, PgpError> {
        let response: VerifyResponse = self
            .client
            .post(&self.url)
            .json(&VerifyRequest {
                message,
                signature,
                public_key,
            })
            .send()
            .await
            .map_err(|e| PgpError::Backend(e.to_string()))?
            .error_for_status()
            .map_err(|e| PgpError::Backend(e.to_string()))?
            .json()
            .await
            .map_err(|e| PgpError::Backend(e.to_string()))?;
        Ok(response.valid)
    }
}

/// In-process check of a detached armored signature. The signature may
/// come from the primary key or any of its subkeys.
#[derive(Debug, Default)]
pub struct LocalPgpVerifier;

impl LocalPgpVerifier {
    pub fn check(message: &str, signature: &str, public_key: &str) -> Result<bool, PgpError> {
        let (key, _) = SignedPublicKey::from_string(public_key)
            .map_err(|e| PgpError::InvalidKey(e.to_string()))?;
        let signature = match StandaloneSignature::from_string(signature) {
            Ok((signature, _)) => signature,
            Err(e) => {
                debug!("[np-02] Unreadable PGP signature: {}", e);
                return Ok(false);
            }
        };

        let content = message.as_bytes();
        if signature.verify(&key, content).is_ok() {
            return Ok(true);
        }
        Ok(key
            .public_subkeys
            .iter()
            .any(|subkey| signature.verify(subkey, content).is_ok()))
    }
}

#[async_trait]
impl PgpVerifier for LocalPgpVerifier {
    async fn verify(
        &self,
        message: &str,
        signature: &str,
        public_key: &str,
    ) -> Result<bool, PgpError> {
        Self::check(message, signature, public_key)
    }
}

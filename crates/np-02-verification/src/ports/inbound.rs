//! # Inbound Ports (Driving Ports / API)

use crate::domain::entities::{VerificationOutcome, VerificationRequest};
use async_trait::async_trait;

/// Primary verification API.
///
/// Implementations must be thread-safe (`Send + Sync`). Verification only
/// reads from collaborators; it never writes.
#[async_trait]
pub trait VerificationApi: Send + Sync {
    /// Authenticate the origin of a payload.
    ///
    /// Never fails: a proof that cannot be decoded yields an unverified
    /// outcome whose error reports it as not attempted.
    async fn verify(&self, request: &VerificationRequest) -> VerificationOutcome;
}

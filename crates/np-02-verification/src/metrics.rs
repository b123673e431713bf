//! # Verification Metrics
//!
//! Enable with the `metrics` feature.
//!
//! - `np_verifications_total{scheme,result}` - Counter of verification outcomes

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter_vec, IntCounterVec};

#[cfg(feature = "metrics")]
lazy_static! {
    pub static ref VERIFICATIONS: IntCounterVec = register_int_counter_vec!(
        "np_verifications_total",
        "Payload verifications by proof scheme and result",
        &["scheme", "result"]
    )
    .expect("Failed to create VERIFICATIONS metric");
}

#[cfg(feature = "metrics")]
pub fn record_verification(scheme: &str, verified: bool) {
    let result = if verified { "verified" } else { "rejected" };
    VERIFICATIONS.with_label_values(&[scheme, result]).inc();
}

#[cfg(not(feature = "metrics"))]
pub fn record_verification(_scheme: &str, _verified: bool) {}

//! # Queue Metrics
//!
//! Enable with the `metrics` feature.
//!
//! - `np_ingested_total{result}` - Ingestion outcomes
//! - `np_sweep_items_total{outcome}` - Rows processed or failed by sweeps
//! - `np_abandoned_total` - Rows that reached the attempt cap

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

#[cfg(feature = "metrics")]
lazy_static! {
    pub static ref INGESTED: IntCounterVec = register_int_counter_vec!(
        "np_ingested_total",
        "External payloads by ingestion result",
        &["result"]
    )
    .expect("Failed to create INGESTED metric");

    pub static ref SWEEP_ITEMS: IntCounterVec = register_int_counter_vec!(
        "np_sweep_items_total",
        "Pipeline runs by outcome",
        &["outcome"]
    )
    .expect("Failed to create SWEEP_ITEMS metric");

    pub static ref ABANDONED: IntCounter = register_int_counter!(
        "np_abandoned_total",
        "Payload rows that exhausted their attempts"
    )
    .expect("Failed to create ABANDONED metric");
}

#[cfg(feature = "metrics")]
pub fn record_ingest(result: &str) {
    INGESTED.with_label_values(&[result]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_pipeline_run(processed: bool) {
    let outcome = if processed { "processed" } else { "failed" };
    SWEEP_ITEMS.with_label_values(&[outcome]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_abandoned() {
    ABANDONED.inc();
}

#[cfg(not(feature = "metrics"))]
pub fn record_ingest(_result: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_pipeline_run(_processed: bool) {}

#[cfg(not(feature = "metrics"))]
pub fn record_abandoned() {}

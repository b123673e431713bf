//! Prometheus metrics for the runtime.
//!
//! Naming convention: `np_<area>_<metric>_<unit>`. Subsystem crates register
//! their own counters in the default registry behind their `metrics`
//! feature; [`encode_metrics`] exports both registries.

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Encoder, Histogram, HistogramOpts, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Runtime metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    /// Unprocessed rows still below the attempt cap
    pub static ref QUEUE_PENDING: IntGauge = IntGauge::new(
        "np_queue_pending",
        "Payload rows waiting for a sweep"
    ).expect("metric creation failed");

    /// Rows that reached the attempt cap
    pub static ref QUEUE_ABANDONED: IntGauge = IntGauge::new(
        "np_queue_abandoned",
        "Payload rows that exhausted their attempts"
    ).expect("metric creation failed");

    /// Sweeps by outcome (ran, skipped, failed)
    pub static ref SWEEPS: IntCounterVec = IntCounterVec::new(
        Opts::new("np_sweeps_total", "Retry sweeps by outcome"),
        &["outcome"]
    ).expect("metric creation failed");

    /// Wall time of one sweep
    pub static ref SWEEP_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "np_sweep_duration_seconds",
            "Time spent in one retry sweep"
        ).buckets(exponential_buckets(0.005, 2.0, 12).expect("valid buckets"))
    ).expect("metric creation failed");
}

/// Register the runtime metrics with [`REGISTRY`].
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(QUEUE_PENDING.clone()),
        Box::new(QUEUE_ABANDONED.clone()),
        Box::new(SWEEPS.clone()),
        Box::new(SWEEP_DURATION.clone()),
    ];

    for metric in metrics {
        REGISTRY
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }
    Ok(())
}

/// Encode the runtime registry and the default registry as Prometheus text.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let mut families = REGISTRY.gather();
    families.extend(prometheus::gather());
    let mut buffer = Vec::new();
    encoder
        .encode(&families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Observes the elapsed time on drop.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}

/// Start timing for a histogram. Observation happens on drop.
#[macro_export]
macro_rules! time_histogram {
    ($histogram:expr) => {
        $crate::metrics::HistogramTimer::new(&$histogram)
    };
}

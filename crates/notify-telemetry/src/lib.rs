//! # Notify Telemetry
//!
//! Logging and metrics for the notification engine.
//!
//! - **Logs**: `tracing` with a pretty or JSON `fmt` layer and an env filter
//! - **Metrics**: Prometheus registry scraped from the runtime's `/metrics`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use notify_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `NP_LOG_LEVEL` / `RUST_LOG` | `info` | Log filter |
//! | `NP_JSON_LOGS` | `false` (`true` in containers) | JSON output |
//! | `NP_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `NP_METRICS_PORT` | `9100` | Metrics endpoint port |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    encode_metrics, register_metrics, HistogramTimer, QUEUE_ABANDONED, QUEUE_PENDING, SWEEPS,
    SWEEP_DURATION,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),
}

/// Initialize logging and register the runtime metrics.
///
/// Hold the returned guard for the lifetime of the process.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    register_metrics()?;
    init_logging(&config)?;
    Ok(TelemetryGuard {
        service_name: config.service_name,
    })
}

/// Logs on drop so shutdown is visible in the log stream.
pub struct TelemetryGuard {
    service_name: String,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "Shutting down telemetry");
    }
}

//! # Notify Runtime
//!
//! Entry point for the notification engine.
//!
//! ## Startup Sequence
//!
//! 1. Initialize telemetry (logging + metrics registry)
//! 2. Load and validate configuration from `NP_*` variables
//! 3. Wire subsystems np-01..np-06 to their adapters
//! 4. Start the retry sweep and the metrics endpoint
//! 5. Wait for Ctrl+C, then shut both down

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use notify_runtime::{server, EngineConfig, EngineContainer, SweepScheduler};
use notify_telemetry::{init_telemetry, TelemetryConfig};
use np_06_processing_queue::QueueApi;

/// Owns the engine and its background tasks.
struct EngineRuntime {
    container: EngineContainer,
    metrics_addr: SocketAddr,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl EngineRuntime {
    fn new(container: EngineContainer, metrics_port: u16) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            container,
            metrics_addr: SocketAddr::from(([0, 0, 0, 0], metrics_port)),
            shutdown_tx,
            shutdown_rx,
            tasks: Vec::new(),
        }
    }

    fn start(&mut self) {
        info!("===========================================");
        info!("  Notify Engine v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");

        let queue: Arc<dyn QueueApi> = self.container.queue.clone();

        let scheduler = SweepScheduler::new(queue.clone(), self.container.sweep_interval());
        self.tasks
            .push(tokio::spawn(scheduler.run(self.shutdown_rx.clone())));

        let addr = self.metrics_addr;
        let shutdown = self.shutdown_rx.clone();
        self.tasks.push(tokio::spawn(async move {
            // The engine keeps running without metrics.
            if let Err(e) = server::serve(addr, queue, shutdown).await {
                error!("[runtime] Metrics endpoint stopped: {}", e);
            }
        }));

        info!(
            sweep_interval_secs = self.container.config.queue.sweep_interval_secs,
            metrics = %self.metrics_addr,
            "Engine running"
        );
    }

    /// Signal every task and wait for them, bounded by a timeout.
    async fn shutdown(self) {
        info!("Initiating graceful shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }

        let drain = join_tasks(self.tasks);
        if tokio::time::timeout(Duration::from_secs(10), drain)
            .await
            .is_err()
        {
            error!("Background tasks did not stop within 10s");
        }

        info!("Shutdown complete");
    }
}

async fn join_tasks(tasks: Vec<JoinHandle<()>>) {
    for task in tasks {
        if let Err(e) = task.await {
            error!("Background task failed: {}", e);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry = TelemetryConfig::from_env();
    let metrics_port = telemetry.metrics_port;
    let _telemetry = init_telemetry(telemetry).context("Failed to initialize telemetry")?;

    let config = EngineConfig::from_env().context("Failed to load configuration")?;
    let container = EngineContainer::new(config).context("Failed to wire engine")?;

    let mut runtime = EngineRuntime::new(container, metrics_port);
    runtime.start();

    info!("Press Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;

    runtime.shutdown().await;
    Ok(())
}

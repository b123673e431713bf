//! # Sweep Scheduler
//!
//! Runs `batch_process_payloads` on a fixed interval until shutdown. Ticks
//! missed while a sweep is running are skipped, not queued.

use notify_telemetry::{HistogramTimer, QUEUE_ABANDONED, QUEUE_PENDING, SWEEPS, SWEEP_DURATION};
use np_06_processing_queue::{QueueApi, SweepReport};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

pub struct SweepScheduler {
    queue: Arc<dyn QueueApi>,
    interval: Duration,
}

impl SweepScheduler {
    pub fn new(queue: Arc<dyn QueueApi>, interval: Duration) -> Self {
        Self { queue, interval }
    }

    /// One sweep plus a refresh of the queue gauges.
    pub async fn sweep_once(&self) -> Option<SweepReport> {
        let report = {
            let _timer = HistogramTimer::new(&SWEEP_DURATION);
            self.queue.batch_process_payloads().await
        };

        let report = match report {
            Ok(report) => {
                SWEEPS.with_label_values(&["ran"]).inc();
                if report.selected > 0 {
                    info!(
                        selected = report.selected,
                        processed = report.processed,
                        failed = report.failed,
                        abandoned = report.abandoned,
                        "[runtime] Sweep finished"
                    );
                }
                Some(report)
            }
            Err(e) => {
                SWEEPS.with_label_values(&["failed"]).inc();
                error!("[runtime] Sweep failed: {}", e);
                None
            }
        };

        self.refresh_gauges().await;
        report
    }

    async fn refresh_gauges(&self) {
        if let Ok(pending) = self.queue.pending_count().await {
            QUEUE_PENDING.set(i64::try_from(pending).unwrap_or(i64::MAX));
        }
        if let Ok(abandoned) = self.queue.abandoned().await {
            QUEUE_ABANDONED.set(i64::try_from(abandoned.len()).unwrap_or(i64::MAX));
        }
    }

    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        debug!(interval_secs = self.interval.as_secs(), "[runtime] Sweep scheduler started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.sweep_once().await;
                }
                _ = shutdown.changed() => {
                    info!("[runtime] Sweep scheduler stopping");
                    break;
                }
            }
        }
    }
}

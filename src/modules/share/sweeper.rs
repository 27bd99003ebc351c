use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::modules::share::service::ShareService;

const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Periodically purges expired shares until stopped.
pub struct Sweeper {
    service: ShareService,
    interval: Duration,
}

pub struct SweeperHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl Sweeper {
    /// A zero interval is raised to one second; `tokio::time::interval` rejects zero.
    pub fn new(service: ShareService, interval: Duration) -> Self {
        let interval = if interval.is_zero() {
            tracing::warn!("Sweep interval of zero requested, using 1s");
            MIN_INTERVAL
        } else {
            interval
        };
        Self { service, interval }
    }

    pub fn start(self) -> SweeperHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(shutdown_rx));
        SweeperHandle { shutdown_tx, task }
    }

    async fn run(self, mut shutdown_rx: watch::Receiver<bool>) {
        let mut sweep_interval = tokio::time::interval(self.interval);
        sweep_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        tracing::info!(interval_secs = self.interval.as_secs(), "Sweeper started");

        loop {
            tokio::select! {
                _ = sweep_interval.tick() => {
                    let report = self.service.sweep_expired(chrono::Utc::now()).await;
                    if report.removed > 0 || report.failed > 0 {
                        tracing::info!(
                            removed = report.removed,
                            failed = report.failed,
                            "Expired shares swept"
                        );
                    }
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("Sweeper stopped");
    }
}

impl SweeperHandle {
    /// Signal the loop to stop and wait for it to finish.
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Sweeper task ended abnormally");
        }
    }
}

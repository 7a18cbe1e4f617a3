use chrono::{DateTime, Utc};
use clipshare_storage::{PartitionStore, SweepStats};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;

/// Periodic retention sweep over all partitions.
///
/// Runs on its own timer, independent of request handling, and only ever
/// deletes-or-ignores: no coordination with uploads beyond tolerating
/// "already gone".
#[derive(Clone)]
pub struct RetentionSweeper {
    store: Arc<PartitionStore>,
    /// Age after which an asset is eligible for deletion.
    retention_window: Duration,
    sweep_interval: Duration,
}

/// Delay from `now` until the next wall-clock multiple of `interval`, so an
/// hourly sweeper always fires at the top of the hour regardless of when the
/// process started. Zero when `now` sits exactly on a boundary.
fn delay_until_first_sweep(interval: Duration, now: DateTime<Utc>) -> Duration {
    let secs = interval.as_secs();
    if secs == 0 {
        return Duration::ZERO;
    }
    let into = now.timestamp().rem_euclid(secs as i64) as u64;
    if into == 0 {
        Duration::ZERO
    } else {
        Duration::from_secs(secs - into)
    }
}

impl RetentionSweeper {
    pub fn new(
        store: Arc<PartitionStore>,
        retention_window: Duration,
        sweep_interval: Duration,
    ) -> Self {
        Self {
            store,
            retention_window,
            sweep_interval,
        }
    }

    /// Start the background sweep task. The first sweep fires at the next
    /// wall-clock multiple of the interval (top of the hour for the default
    /// hourly cadence), then on every interval after.
    /// Returns a JoinHandle for graceful shutdown.
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let delay = delay_until_first_sweep(self.sweep_interval, Utc::now());
            if !delay.is_zero() {
                tracing::info!(
                    delay_secs = delay.as_secs(),
                    "Retention sweeper waiting for the next interval boundary"
                );
                tokio::time::sleep(delay).await;
            }
            let mut sweep_interval = interval(self.sweep_interval);

            loop {
                sweep_interval.tick().await;

                tracing::info!("Starting scheduled retention sweep");
                let stats = self.sweep_once().await;
                tracing::info!(
                    partitions = stats.partitions,
                    scanned = stats.scanned,
                    deleted = stats.deleted,
                    failed = stats.failed,
                    "Retention sweep completed"
                );
            }
        })
    }

    /// Run one sweep: delete every asset older than the retention window.
    /// Infallible by design; per-entry errors are logged and counted inside
    /// the store.
    #[tracing::instrument(skip(self), fields(sweep.operation = "expire_all"))]
    pub async fn sweep_once(&self) -> SweepStats {
        let window = chrono::Duration::from_std(self.retention_window)
            .unwrap_or_else(|_| chrono::Duration::hours(24));
        let cutoff = Utc::now() - window;
        self.store.sweep_expired(cutoff).await
    }
}

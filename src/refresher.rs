//! Periodic forced refresh of the sheet cache.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::DEFAULT_REFRESH_INTERVAL;
use crate::service::SheetDataService;

/// Owns the background refresh task. Dropping the handle cancels the task.
#[derive(Debug)]
pub struct RefreshHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl RefreshHandle {
    /// Stops the timer and waits for the task to exit.
    ///
    /// A refresh already in flight runs to completion first.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Err(e) = (&mut self.task).await {
            if !e.is_cancelled() {
                error!("Periodic refresh task ended abnormally: {}", e);
            }
        }
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl SheetDataService {
    /// Spawns a task that calls `fetch_data(true)` every `period`.
    ///
    /// The first refresh happens one full period after spawning. Failures are
    /// logged and the timer keeps running. A zero period falls back to
    /// [`DEFAULT_REFRESH_INTERVAL`].
    pub fn spawn_refresh(self: Arc<Self>, period: Duration) -> RefreshHandle {
        let period = if period.is_zero() {
            warn!("Zero refresh period requested, using the default");
            DEFAULT_REFRESH_INTERVAL
        } else {
            period
        };
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_refresh_loop(self, period, cancel.clone()));

        info!(
            "Periodic refresh scheduled every {} minutes",
            period.as_secs_f64() / 60.0
        );
        RefreshHandle { cancel, task }
    }
}

async fn run_refresh_loop(
    service: Arc<SheetDataService>,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                debug!("Periodic data refresh triggered");
                match service.fetch_data(true).await {
                    Ok(outcome) if outcome.is_stale_fallback() => {
                        warn!(
                            "Periodic refresh kept stale data: {}",
                            outcome.error.as_deref().unwrap_or_default()
                        );
                    }
                    Ok(outcome) => {
                        info!(records = outcome.data.len(), "Periodic refresh completed");
                    }
                    Err(e) => {
                        error!("Periodic refresh failed: {}", e);
                    }
                }
            }
            _ = cancel.cancelled() => {
                info!("Periodic refresh shutting down");
                break;
            }
        }
    }
}

//! Hold reaper - background sweep of expired reservation holds
//!
//! Runs as a periodic task. Expiry is enforced synchronously at every
//! point of use, so the reaper only keeps seat maps and occupancy
//! tidy between requests; its absence never causes an incorrect
//! accept.

use crate::booking::manager::BookingManager;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Hold reaper
///
/// Registered as a background task at engine startup.
pub struct HoldReaper {
    manager: Arc<BookingManager>,
    interval: Duration,
    shutdown: CancellationToken,
}

impl HoldReaper {
    pub fn new(manager: Arc<BookingManager>, shutdown: CancellationToken) -> Self {
        let interval = Duration::from_secs(manager.config().reaper_interval_secs);
        Self {
            manager,
            interval,
            shutdown,
        }
    }

    /// Main loop: sweep on startup, then on every tick until shutdown
    pub async fn run(self) {
        tracing::info!(interval_secs = self.interval.as_secs(), "Hold reaper started");

        self.sweep();

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = self.shutdown.cancelled() => {
                    tracing::info!("Hold reaper received shutdown signal");
                    break;
                }
            }
            self.sweep();
        }

        tracing::info!("Hold reaper stopped");
    }

    fn sweep(&self) {
        let reclaimed = self.manager.sweep_expired(shared::util::now_millis());
        if reclaimed > 0 {
            tracing::debug!(reclaimed, "Hold reaper sweep reclaimed holds");
        }
    }
}

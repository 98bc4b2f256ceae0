//! Periodic artifact sweep.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use voxlingo_core::ArtifactStore;

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Sweep `store` every `interval` until `cancel` fires.
///
/// The first sweep happens one interval after start; the startup sweep is
/// the caller's job.
pub async fn run_reaper(
    store: Arc<dyn ArtifactStore>,
    interval: Duration,
    max_age: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = time::interval(interval.max(MIN_INTERVAL));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // interval() completes its first tick immediately
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match store.sweep(max_age).await {
                    Ok(removed) => debug!(removed, "periodic sweep"),
                    Err(e) => warn!(error = %e, "periodic sweep failed"),
                }
            }
            () = cancel.cancelled() => {
                debug!("reaper stopped");
                return;
            }
        }
    }
}

/// Spawn [`run_reaper`] on the current runtime.
pub fn spawn_reaper(
    store: Arc<dyn ArtifactStore>,
    interval: Duration,
    max_age: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(run_reaper(store, interval, max_age, cancel))
}

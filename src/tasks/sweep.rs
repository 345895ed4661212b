//! Expiry Sweep Task
//!
//! Background task that periodically removes expired entries from one cache.
//! Each cache instance owns its own sweeper.

use std::hash::Hash;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::cache::SharedCache;

/// Handle to a running sweep task.
///
/// Dropping the handle closes the shutdown channel, which also ends the task
/// on its next wake-up.
#[derive(Debug)]
pub struct SweepHandle {
    name: String,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl SweepHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Signals the task and waits for it to exit, letting an in-flight sweep
    /// finish first.
    pub async fn stop(self) {
        let SweepHandle {
            name,
            shutdown,
            task,
        } = self;

        // The task may already be gone, in which case there is no receiver
        let _ = shutdown.send(());
        match task.await {
            Ok(()) => debug!(cache = %name, "sweep task stopped"),
            Err(err) if err.is_cancelled() => debug!(cache = %name, "sweep task was aborted"),
            Err(err) => warn!(cache = %name, error = %err, "sweep task failed"),
        }
    }

    /// Cancels the task without waiting.
    pub fn abort(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawns a task that calls `purge_expired` on `cache` every `interval`.
///
/// The first sweep runs one full interval after spawning.
///
/// # Example
/// ```ignore
/// let cache = SharedCache::<String, String>::new(CacheConfig::default());
/// let sweeper = spawn_sweep_task("sessions", cache.clone(), Duration::from_secs(60));
/// // Later, during shutdown:
/// sweeper.stop().await;
/// ```
pub fn spawn_sweep_task<K, V>(
    name: impl Into<String>,
    cache: SharedCache<K, V>,
    interval: Duration,
) -> SweepHandle
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    let name = name.into();
    let (shutdown, mut shutdown_rx) = oneshot::channel::<()>();
    let task_name = name.clone();
    // A zero period would make tokio's interval panic
    let period = interval.max(Duration::from_millis(1));

    let task = tokio::spawn(async move {
        info!(
            cache = %task_name,
            interval_ms = period.as_millis() as u64,
            "Starting expiry sweep task"
        );

        let start = tokio::time::Instant::now() + period;
        let mut ticker = tokio::time::interval_at(start, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = &mut shutdown_rx => {
                    info!(cache = %task_name, "Expiry sweep task shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    let removed = cache.purge_expired().await;
                    if removed > 0 {
                        info!(cache = %task_name, removed, "Expiry sweep removed entries");
                    } else {
                        debug!(cache = %task_name, "Expiry sweep found nothing to remove");
                    }
                }
            }
        }
    });

    SweepHandle {
        name,
        shutdown,
        task,
    }
}

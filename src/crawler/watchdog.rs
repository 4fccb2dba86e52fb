//! Inactivity watchdog
//!
//! One of the three cancellation sources feeding the crawl, alongside the
//! global deadline and the interrupt signal: if no record has been emitted
//! for the configured idle window, the crawl context is cancelled so a
//! stalled crawl still terminates and closes its output stream.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Idle window after which a silent crawl is cancelled
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30);

/// How often the monitor task re-checks for inactivity
const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Tracks the wall-clock time of the latest emitted record
#[derive(Clone)]
pub struct InactivityWatchdog {
    last_activity: Arc<Mutex<Instant>>,
}

impl InactivityWatchdog {
    pub fn new() -> Self {
        InactivityWatchdog {
            last_activity: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Records activity; the consumer calls this on every received record
    pub async fn touch(&self) {
        *self.last_activity.lock().await = Instant::now();
    }

    /// Spawns the monitor task
    ///
    /// The task cancels `cancel` once no [`touch`](Self::touch) has occurred
    /// for `idle_timeout`, and exits as soon as the token is cancelled from
    /// any source.
    pub fn spawn(&self, cancel: CancellationToken, idle_timeout: Duration) {
        let last_activity = Arc::clone(&self.last_activity);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    _ = tokio::time::sleep(POLL_INTERVAL) => {}
                }

                let idle = last_activity.lock().await.elapsed();
                if idle > idle_timeout {
                    tracing::info!(
                        idle_secs = idle.as_secs(),
                        "no records emitted recently, cancelling crawl"
                    );
                    cancel.cancel();
                    return;
                }
            }
        });
    }
}

impl Default for InactivityWatchdog {
    fn default() -> Self {
        Self::new()
    }
}

//! Scheduled sync ticks.
//!
//! Webhooks and manual calls are the primary triggers, but they are not
//! sufficient alone: a missed webhook would leave the board stale, and the
//! rotating page only advances when something pushes. The poller enqueues a
//! non-forced trigger at a fixed interval as a fallback.
//!
//! Jitter is deterministic, derived from a stable key (the board title), so
//! restarts do not shift the schedule randomly while multiple deployments
//! with distinct keys still spread out.

use std::hash::{Hash, Hasher};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::coordinator::SyncCoordinator;
use crate::source::{BoardPusher, ItemSource};

/// Default poll interval (10 minutes).
const DEFAULT_POLL_INTERVAL_SECS: u64 = 600;

/// Default jitter percentage (0-100).
const DEFAULT_JITTER_PERCENT: u8 = 20;

/// Configuration for the scheduled tick.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Interval between scheduled sync ticks.
    ///
    /// Default: 10 minutes. Configure via `BOARD_RELAY_POLL_INTERVAL_MINS`.
    pub poll_interval: Duration,

    /// Jitter percentage added to the interval (0-100).
    ///
    /// Default: 20 (meaning 0-20% jitter).
    pub jitter_percent: u8,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PollConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        PollConfig {
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            jitter_percent: DEFAULT_JITTER_PERCENT,
        }
    }

    /// Creates a config from environment variables.
    ///
    /// Reads `BOARD_RELAY_POLL_INTERVAL_MINS`; other values use defaults.
    pub fn from_env() -> Self {
        let poll_mins = std::env::var("BOARD_RELAY_POLL_INTERVAL_MINS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_POLL_INTERVAL_SECS / 60);

        PollConfig {
            poll_interval: Duration::from_secs(poll_mins * 60),
            ..Self::new()
        }
    }

    /// Returns the poll interval with deterministic jitter for a key.
    ///
    /// `interval * (1 + (hash(key) % jitter_percent) / 100)` — the same key
    /// always gets the same jitter.
    pub fn poll_interval_with_jitter(&self, key: &str) -> Duration {
        if self.jitter_percent == 0 {
            return self.poll_interval;
        }
        let jitter = (key_hash(key) % u64::from(self.jitter_percent)) as f64 / 100.0;
        Duration::from_secs_f64(self.poll_interval.as_secs_f64() * (1.0 + jitter))
    }

    /// Returns the initial delay before the first tick for a key.
    ///
    /// `hash(key) % (poll_interval / 2)` staggers the first tick so a fleet
    /// restarting together does not fire simultaneously.
    pub fn initial_poll_delay(&self, key: &str) -> Duration {
        let max_delay = (self.poll_interval.as_secs() / 2).max(1);
        Duration::from_secs(key_hash(key) % max_delay)
    }
}

fn key_hash(key: &str) -> u64 {
    let mut hasher = std::hash::DefaultHasher::new();
    key.hash(&mut hasher);
    hasher.finish()
}

/// Spawns the poller task.
///
/// Each tick submits a manual (non-forced) trigger and drops the completion
/// receiver; the outcome is visible through logs and `/status`. The task
/// exits when the token is cancelled.
pub fn spawn_poll_task<S, P>(
    coordinator: SyncCoordinator<S, P>,
    config: PollConfig,
    key: String,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()>
where
    S: ItemSource + Send + Sync + 'static,
    P: BoardPusher + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let initial = config.initial_poll_delay(&key);
        let interval = config.poll_interval_with_jitter(&key);
        info!(?initial, ?interval, "poller started");

        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(initial) => {}
        }

        loop {
            debug!("scheduled tick");
            let _ = coordinator.submit_manual_trigger().await;

            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("poller stopped");
                    return;
                }
                _ = tokio::time::sleep(interval) => {}
            }
        }
    })
}

//! The sync coordinator: one serialized execution stream between arbitrary
//! triggers and the board.
//!
//! Triggers (manual calls, scheduled ticks, webhooks) enqueue tasks; a single
//! guarded drain loop executes them one at a time, checking the rate limiter,
//! fetching items, selecting and rendering the page, pushing it, and
//! recording dedup state. At most one task is in flight at any instant.
//!
//! # State and locking
//!
//! All shared state (task queue, `draining` guard, rate window, dedup cache)
//! lives behind one mutex and is only touched in short, non-suspending
//! critical sections. The drain loop is the sole consumer of the queue;
//! `enqueue` may run concurrently from any number of inbound triggers. The
//! `draining` flag is flipped under the same lock as the final emptiness
//! check, so an enqueue racing with a finishing drain either lands before the
//! check (and the loop continues) or observes `draining == false` (and starts
//! a new loop) — a wakeup is never lost.

mod drain;
mod execute;

use std::sync::Arc;

use tokio::sync::{Mutex, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::dedupe::{self, EventDedupCache};
use crate::limiter::{self, RateLimiter};
use crate::page::FormatOptions;
use crate::queue::{SyncTask, TaskQueue};
use crate::source::{BoardPusher, ItemSource};
use crate::types::{EventId, QueueStatus};

/// Tuning knobs for the coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Items per page.
    pub page_size: usize,
    /// Base title rendered above every page.
    pub board_title: String,
    /// Character caps applied while rendering.
    pub format: FormatOptions,
    /// Ceiling on board calls within the trailing minute.
    pub max_calls_per_minute: usize,
    /// Capacity of the event dedup cache.
    pub dedupe_capacity: usize,
    /// Pause before retrying a rate-limited task.
    pub rate_limit_backoff: std::time::Duration,
    /// Pause between consecutive tasks, to avoid tight-looping against the
    /// board API.
    pub inter_task_pause: std::time::Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        CoordinatorConfig {
            page_size: 3,
            board_title: "Board".to_string(),
            format: FormatOptions::default(),
            max_calls_per_minute: limiter::MAX_CALLS_PER_MINUTE,
            dedupe_capacity: dedupe::MAX_CACHE_SIZE,
            rate_limit_backoff: std::time::Duration::from_secs(1),
            inter_task_pause: std::time::Duration::from_millis(500),
        }
    }
}

/// The outcome of submitting a trigger.
#[derive(Debug)]
pub struct Submission {
    /// False when the trigger was recognized as a duplicate and skipped.
    pub accepted: bool,
    /// Resolves with the task's outcome. Duplicates resolve `true`
    /// immediately: a redelivery of work already done is a successful no-op,
    /// not a failure, so the caller does not retry.
    pub completion: oneshot::Receiver<bool>,
}

/// Mutable coordinator state, guarded by a single mutex.
struct CoordState {
    queue: TaskQueue,
    draining: bool,
    limiter: RateLimiter,
    dedupe: EventDedupCache,
    /// Event ID of the task currently executing, if it carries one.
    ///
    /// Closes the dedup window between dequeue and the post-execution
    /// `mark_processed`: a redelivery arriving in that gap is still
    /// recognized as a duplicate.
    in_flight: Option<EventId>,
}

struct Inner<S, P> {
    config: CoordinatorConfig,
    source: S,
    pusher: P,
    state: Mutex<CoordState>,
    cancel: CancellationToken,
}

/// Coordinates trigger events into a single serialized stream of board
/// pushes.
///
/// Constructed once per process with injected collaborators; clones share
/// the same state.
pub struct SyncCoordinator<S, P> {
    inner: Arc<Inner<S, P>>,
}

impl<S, P> Clone for SyncCoordinator<S, P> {
    fn clone(&self) -> Self {
        SyncCoordinator {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, P> SyncCoordinator<S, P>
where
    S: ItemSource + Send + Sync + 'static,
    P: BoardPusher + Send + Sync + 'static,
{
    /// Creates a coordinator with the given collaborators.
    pub fn new(config: CoordinatorConfig, source: S, pusher: P) -> Self {
        let state = CoordState {
            queue: TaskQueue::new(),
            draining: false,
            limiter: RateLimiter::with_max_calls(config.max_calls_per_minute),
            dedupe: EventDedupCache::with_capacity(config.dedupe_capacity),
            in_flight: None,
        };
        SyncCoordinator {
            inner: Arc::new(Inner {
                config,
                source,
                pusher,
                state: Mutex::new(state),
                cancel: CancellationToken::new(),
            }),
        }
    }

    /// Returns the token that stops the drain loop between tasks.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.inner.cancel.clone()
    }

    /// Submits a manual (non-forced) trigger.
    pub async fn submit_manual_trigger(&self) -> Submission {
        let (task, completion) = SyncTask::manual();
        let accepted = self.enqueue(task).await;
        Submission {
            accepted,
            completion,
        }
    }

    /// Submits a webhook trigger.
    ///
    /// Webhook triggers default to forced at the HTTP layer; `forced` only
    /// affects queue priority, never deduplication — an already-seen
    /// `event_id` is skipped either way.
    pub async fn submit_webhook_trigger(
        &self,
        event_id: Option<EventId>,
        forced: bool,
    ) -> Submission {
        let (task, completion) = SyncTask::webhook(event_id, forced);
        let accepted = self.enqueue(task).await;
        Submission {
            accepted,
            completion,
        }
    }

    /// Returns an observability snapshot of the queue and rate window.
    pub async fn status(&self) -> QueueStatus {
        let mut state = self.inner.state.lock().await;
        QueueStatus {
            queue_length: state.queue.len(),
            is_draining: state.draining,
            recent_call_count: state.limiter.recent_call_count(),
        }
    }

    /// Enqueues a task, starting the drain loop if it is not running.
    ///
    /// Returns false (and resolves the task's completion with `true`) when
    /// the task's event ID has already been processed or is already waiting
    /// in the backlog.
    async fn enqueue(&self, task: SyncTask) -> bool {
        {
            let mut state = self.inner.state.lock().await;

            if let Some(id) = &task.event_id
                && (state.dedupe.is_processed(id)
                    || state.queue.contains_event(id)
                    || state.in_flight.as_ref() == Some(id))
            {
                let id = id.clone();
                drop(state);
                info!(event_id = %id, "duplicate event skipped");
                task.resolve(true);
                return false;
            }

            debug!(kind = %task.kind, forced = task.forced, "task enqueued");
            state.queue.push(task);

            if !state.draining {
                state.draining = true;
                tokio::spawn(drain::run(Arc::clone(&self.inner)));
            }
        }
        true
    }
}

#[cfg(test)]
mod tests;

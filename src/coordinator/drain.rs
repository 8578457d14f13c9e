//! The guarded drain loop.
//!
//! Exactly one instance runs at a time, started by `enqueue` when the
//! `draining` flag is clear. Each iteration dequeues the next task
//! (forced lane first), gates it on the rate limiter, executes it, and
//! resolves its completion channel. The loop exits when the queue is empty
//! or the coordinator is cancelled; the next enqueue restarts it.

use std::sync::Arc;

use tokio::time::sleep;
use tracing::{debug, info};

use crate::queue::SyncTask;
use crate::source::{BoardPusher, ItemSource};

use super::{Inner, execute};

/// One drain step, decided under the state lock.
enum Step {
    /// Execute the dequeued task.
    Execute(SyncTask),
    /// Over the rate limit: the task went back to the head, pause and retry.
    Backoff,
    /// Queue empty (or cancelled); the loop is done.
    Stop,
}

pub(super) async fn run<S, P>(inner: Arc<Inner<S, P>>)
where
    S: ItemSource + Send + Sync + 'static,
    P: BoardPusher + Send + Sync + 'static,
{
    debug!("drain loop started");
    loop {
        let step = next_step(&inner).await;

        match step {
            Step::Stop => {
                debug!("drain loop stopped");
                return;
            }
            Step::Backoff => {
                debug!("rate limit reached; backing off");
                sleep(inner.config.rate_limit_backoff).await;
            }
            Step::Execute(task) => {
                // The task runs to completion once dequeued; there is no
                // mid-flight cancellation.
                let success = execute::execute(&inner, task.event_id.as_ref()).await;
                info!(kind = %task.kind, forced = task.forced, success, "sync task finished");
                task.resolve(success);

                // Pause between tasks to avoid tight-looping against the
                // board API.
                sleep(inner.config.inter_task_pause).await;
            }
        }
    }
}

/// Decides the next step inside one short critical section.
///
/// Queue mutation, the rate-limit gate, and the `draining` flag are all
/// handled under the lock; no suspension point intervenes, so the decision
/// is atomic with respect to concurrent enqueues.
async fn next_step<S, P>(inner: &Inner<S, P>) -> Step {
    let mut state = inner.state.lock().await;

    if inner.cancel.is_cancelled() {
        state.draining = false;
        debug!("drain loop cancelled");
        return Step::Stop;
    }

    match state.queue.pop_next() {
        None => {
            state.draining = false;
            Step::Stop
        }
        Some(task) => {
            if state.limiter.is_over_limit() {
                // Not a failure: put the task back at the head (its lane
                // keeps its priority) and retry after the backoff.
                state.queue.requeue_front(task);
                Step::Backoff
            } else {
                // The budget is consumed only when we commit to executing.
                state.limiter.record_call();
                state.in_flight = task.event_id.clone();
                Step::Execute(task)
            }
        }
    }
}

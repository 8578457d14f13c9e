//! Sync task queue with a priority lane for forced triggers.
//!
//! Two explicit sub-queues (forced, normal) are drained forced-first. Within
//! each sub-queue order is FIFO, so a forced task may overtake any number of
//! queued normal tasks but never reorders relative to other forced tasks.
//!
//! The queue itself is a plain data structure; the `draining` guard and all
//! locking live in the coordinator, which is the sole consumer.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use tokio::sync::oneshot;

use crate::types::{EventId, TriggerKind};

/// A single sync request, created when a trigger arrives and discarded once
/// its execution finishes.
///
/// Ownership: held by the queue until dequeued, then by the drain loop for
/// the duration of execution.
#[derive(Debug)]
pub struct SyncTask {
    /// What kind of trigger produced this task.
    pub kind: TriggerKind,
    /// Forced tasks are served before non-forced ones regardless of arrival.
    pub forced: bool,
    /// Identifier used for deduplication, when the trigger carries one.
    pub event_id: Option<EventId>,
    /// When the task was enqueued.
    pub enqueued_at: DateTime<Utc>,
    /// Resolved with the task's outcome once execution finishes.
    completion: Option<oneshot::Sender<bool>>,
}

impl SyncTask {
    /// Creates a manual (non-forced) task and its completion receiver.
    pub fn manual() -> (Self, oneshot::Receiver<bool>) {
        Self::new(TriggerKind::Manual, false, None)
    }

    /// Creates a webhook task and its completion receiver.
    pub fn webhook(event_id: Option<EventId>, forced: bool) -> (Self, oneshot::Receiver<bool>) {
        Self::new(TriggerKind::Webhook, forced, event_id)
    }

    fn new(
        kind: TriggerKind,
        forced: bool,
        event_id: Option<EventId>,
    ) -> (Self, oneshot::Receiver<bool>) {
        let (tx, rx) = oneshot::channel();
        let task = SyncTask {
            kind,
            forced,
            event_id,
            enqueued_at: Utc::now(),
            completion: Some(tx),
        };
        (task, rx)
    }

    /// Resolves the task's completion channel with the given outcome.
    ///
    /// A dropped receiver (nobody awaiting) is fine and ignored.
    pub fn resolve(mut self, success: bool) {
        if let Some(tx) = self.completion.take() {
            let _ = tx.send(success);
        }
    }
}

/// Ordered backlog of pending sync tasks, forced lane first.
#[derive(Debug, Default)]
pub struct TaskQueue {
    forced: VecDeque<SyncTask>,
    normal: VecDeque<SyncTask>,
}

impl TaskQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        TaskQueue::default()
    }

    /// Appends a task to the back of its lane.
    pub fn push(&mut self, task: SyncTask) {
        if task.forced {
            self.forced.push_back(task);
        } else {
            self.normal.push_back(task);
        }
    }

    /// Removes and returns the next task: the earliest forced task if one
    /// exists, otherwise the head of the normal lane.
    pub fn pop_next(&mut self) -> Option<SyncTask> {
        self.forced.pop_front().or_else(|| self.normal.pop_front())
    }

    /// Puts a task back at the head of its lane, preserving its priority.
    ///
    /// Used when the rate limiter defers execution; the task must be the
    /// one most recently popped.
    pub fn requeue_front(&mut self, task: SyncTask) {
        if task.forced {
            self.forced.push_front(task);
        } else {
            self.normal.push_front(task);
        }
    }

    /// Returns true if any pending task carries the given event ID.
    ///
    /// Guards against double-enqueueing a redelivery that arrives while the
    /// first copy is still waiting in the backlog.
    pub fn contains_event(&self, id: &EventId) -> bool {
        self.forced
            .iter()
            .chain(self.normal.iter())
            .any(|t| t.event_id.as_ref() == Some(id))
    }

    /// Number of pending tasks across both lanes.
    pub fn len(&self) -> usize {
        self.forced.len() + self.normal.len()
    }

    /// Returns true if both lanes are empty.
    pub fn is_empty(&self) -> bool {
        self.forced.is_empty() && self.normal.is_empty()
    }
}

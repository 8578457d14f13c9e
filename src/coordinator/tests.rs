use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::page::FormatOptions;
use crate::source::{BoardPusher, FetchError, ItemSource, PagePayload, PushError, PushReceipt};
use crate::types::EventId;

use super::{CoordinatorConfig, SyncCoordinator};

/// Item source returning a fixed list (or a fixed failure), counting calls.
#[derive(Clone)]
struct MockSource {
    items: Vec<String>,
    fail: bool,
    calls: Arc<AtomicUsize>,
}

impl MockSource {
    fn with_items(items: &[&str]) -> Self {
        MockSource {
            items: items.iter().map(|s| s.to_string()).collect(),
            fail: false,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn failing() -> Self {
        MockSource {
            items: Vec::new(),
            fail: true,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ItemSource for MockSource {
    async fn fetch_items(&self) -> Result<Vec<String>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(FetchError::Transport("upstream down".into()))
        } else {
            Ok(self.items.clone())
        }
    }
}

/// Board pusher answering with a fixed receipt, recording payloads.
#[derive(Clone)]
struct MockPusher {
    status: u16,
    body_code: Option<i64>,
    pushes: Arc<StdMutex<Vec<PagePayload>>>,
}

impl MockPusher {
    fn ok() -> Self {
        Self::answering(200, None)
    }

    fn answering(status: u16, body_code: Option<i64>) -> Self {
        MockPusher {
            status,
            body_code,
            pushes: Arc::new(StdMutex::new(Vec::new())),
        }
    }

    fn pushes(&self) -> Vec<PagePayload> {
        self.pushes.lock().unwrap().clone()
    }
}

impl BoardPusher for MockPusher {
    async fn push_page(&self, payload: &PagePayload) -> Result<PushReceipt, PushError> {
        self.pushes.lock().unwrap().push(payload.clone());
        Ok(PushReceipt {
            status: self.status,
            body_code: self.body_code,
        })
    }
}

/// Coordinator config with pauses short enough for tests.
fn test_config() -> CoordinatorConfig {
    CoordinatorConfig {
        page_size: 3,
        board_title: "Board".to_string(),
        format: FormatOptions::default(),
        rate_limit_backoff: Duration::from_millis(10),
        inter_task_pause: Duration::from_millis(1),
        ..CoordinatorConfig::default()
    }
}

fn event(id: &str) -> Option<EventId> {
    EventId::new(id)
}

// ─── End-to-end ───

#[tokio::test]
async fn manual_trigger_pushes_all_items_numbered() {
    let source = MockSource::with_items(&["buy milk", "write report", "call dentist"]);
    let pusher = MockPusher::ok();
    let coordinator = SyncCoordinator::new(test_config(), source, pusher.clone());

    let submission = coordinator.submit_manual_trigger().await;
    assert!(submission.accepted);
    assert!(submission.completion.await.unwrap());

    let pushes = pusher.pushes();
    assert_eq!(pushes.len(), 1);
    assert_eq!(pushes[0].title, "Board");
    assert_eq!(
        pushes[0].message,
        "1. buy milk\n2. write report\n3. call dentist"
    );
}

#[tokio::test]
async fn duplicate_webhook_is_a_successful_noop() {
    let source = MockSource::with_items(&["a"]);
    let pusher = MockPusher::ok();
    let coordinator = SyncCoordinator::new(test_config(), source.clone(), pusher.clone());

    let first = coordinator.submit_webhook_trigger(event("ev-1"), true).await;
    assert!(first.accepted);
    assert!(first.completion.await.unwrap());

    // Redelivery of the same logical event: rejected, but reported as
    // success so the sender does not retry.
    let second = coordinator.submit_webhook_trigger(event("ev-1"), true).await;
    assert!(!second.accepted);
    assert!(second.completion.await.unwrap());

    assert_eq!(pusher.pushes().len(), 1);
    assert_eq!(source.call_count(), 1);
}

#[tokio::test]
async fn back_to_back_duplicates_execute_once() {
    let source = MockSource::with_items(&["a"]);
    let pusher = MockPusher::ok();
    let coordinator = SyncCoordinator::new(test_config(), source.clone(), pusher.clone());

    // The second copy arrives while the first is still queued or in flight.
    let first = coordinator.submit_webhook_trigger(event("ev-2"), true).await;
    let second = coordinator.submit_webhook_trigger(event("ev-2"), true).await;

    assert!(first.accepted);
    assert!(!second.accepted);
    assert!(second.completion.await.unwrap());
    assert!(first.completion.await.unwrap());

    assert_eq!(pusher.pushes().len(), 1);
    assert_eq!(source.call_count(), 1);
}

#[tokio::test]
async fn distinct_events_each_execute() {
    let source = MockSource::with_items(&["a"]);
    let pusher = MockPusher::ok();
    let coordinator = SyncCoordinator::new(test_config(), source.clone(), pusher.clone());

    let first = coordinator.submit_webhook_trigger(event("ev-a"), true).await;
    let second = coordinator.submit_webhook_trigger(event("ev-b"), true).await;

    assert!(first.completion.await.unwrap());
    assert!(second.completion.await.unwrap());
    assert_eq!(pusher.pushes().len(), 2);
}

#[tokio::test]
async fn triggers_without_event_id_never_dedup() {
    let source = MockSource::with_items(&["a"]);
    let pusher = MockPusher::ok();
    let coordinator = SyncCoordinator::new(test_config(), source, pusher.clone());

    let first = coordinator.submit_manual_trigger().await;
    let second = coordinator.submit_manual_trigger().await;

    assert!(first.accepted);
    assert!(second.accepted);
    assert!(first.completion.await.unwrap());
    assert!(second.completion.await.unwrap());
    assert_eq!(pusher.pushes().len(), 2);
}

// ─── Failure handling ───

#[tokio::test]
async fn fetch_failure_reports_failure_without_pushing() {
    let source = MockSource::failing();
    let pusher = MockPusher::ok();
    let coordinator = SyncCoordinator::new(test_config(), source, pusher.clone());

    let submission = coordinator.submit_manual_trigger().await;
    assert!(!submission.completion.await.unwrap());
    assert!(pusher.pushes().is_empty());
}

#[tokio::test]
async fn push_rejection_reports_failure() {
    let source = MockSource::with_items(&["a"]);
    let pusher = MockPusher::answering(500, Some(40001));
    let coordinator = SyncCoordinator::new(test_config(), source, pusher.clone());

    let submission = coordinator.submit_manual_trigger().await;
    assert!(!submission.completion.await.unwrap());
    assert_eq!(pusher.pushes().len(), 1);
}

#[tokio::test]
async fn body_code_success_counts_despite_http_status() {
    let source = MockSource::with_items(&["a"]);
    let pusher = MockPusher::answering(500, Some(200));
    let coordinator = SyncCoordinator::new(test_config(), source, pusher);

    let submission = coordinator.submit_manual_trigger().await;
    assert!(submission.completion.await.unwrap());
}

#[tokio::test]
async fn failed_event_is_still_deduped() {
    // A permanently failing payload must not produce a redelivery storm:
    // the event is marked processed even though the sync failed.
    let source = MockSource::failing();
    let pusher = MockPusher::ok();
    let coordinator = SyncCoordinator::new(test_config(), source.clone(), pusher);

    let first = coordinator.submit_webhook_trigger(event("ev-f"), true).await;
    assert!(!first.completion.await.unwrap());

    let second = coordinator.submit_webhook_trigger(event("ev-f"), true).await;
    assert!(!second.accepted);
    assert!(second.completion.await.unwrap());
    assert_eq!(source.call_count(), 1);
}

#[tokio::test]
async fn failure_does_not_stop_the_drain() {
    let source = MockSource::failing();
    let pusher = MockPusher::ok();
    let coordinator = SyncCoordinator::new(test_config(), source.clone(), pusher);

    let first = coordinator.submit_manual_trigger().await;
    let second = coordinator.submit_manual_trigger().await;

    assert!(!first.completion.await.unwrap());
    assert!(!second.completion.await.unwrap());
    assert_eq!(source.call_count(), 2);
}

// ─── Rate limiting and cancellation ───

#[tokio::test]
async fn rate_limited_task_is_requeued_not_failed() {
    let config = CoordinatorConfig {
        max_calls_per_minute: 0,
        ..test_config()
    };
    let source = MockSource::with_items(&["a"]);
    let pusher = MockPusher::ok();
    let coordinator = SyncCoordinator::new(config, source, pusher.clone());

    let _submission = coordinator.submit_manual_trigger().await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    let status = coordinator.status().await;
    assert_eq!(status.queue_length, 1);
    assert!(status.is_draining);
    assert!(pusher.pushes().is_empty());
}

#[tokio::test]
async fn cancellation_stops_the_drain_between_tasks() {
    let source = MockSource::with_items(&["a"]);
    let pusher = MockPusher::ok();
    let coordinator = SyncCoordinator::new(test_config(), source, pusher.clone());

    coordinator.cancellation_token().cancel();
    let _submission = coordinator.submit_manual_trigger().await;
    tokio::time::sleep(Duration::from_millis(20)).await;

    let status = coordinator.status().await;
    assert!(!status.is_draining);
    assert_eq!(status.queue_length, 1);
    assert!(pusher.pushes().is_empty());
}

// ─── Observability ───

#[tokio::test]
async fn status_counts_recent_board_calls() {
    let source = MockSource::with_items(&["a"]);
    let pusher = MockPusher::ok();
    let coordinator = SyncCoordinator::new(test_config(), source, pusher);

    let first = coordinator.submit_manual_trigger().await;
    first.completion.await.unwrap();
    let second = coordinator.submit_manual_trigger().await;
    second.completion.await.unwrap();

    let status = coordinator.status().await;
    assert_eq!(status.recent_call_count, 2);
    assert_eq!(status.queue_length, 0);
}

#[tokio::test]
async fn idle_coordinator_reports_empty_status() {
    let source = MockSource::with_items(&[]);
    let pusher = MockPusher::ok();
    let coordinator = SyncCoordinator::new(test_config(), source, pusher);

    let status = coordinator.status().await;
    assert_eq!(status.queue_length, 0);
    assert!(!status.is_draining);
    assert_eq!(status.recent_call_count, 0);
}

#[tokio::test]
async fn empty_item_list_pushes_an_empty_page() {
    let source = MockSource::with_items(&[]);
    let pusher = MockPusher::ok();
    let coordinator = SyncCoordinator::new(test_config(), source, pusher.clone());

    let submission = coordinator.submit_manual_trigger().await;
    assert!(submission.completion.await.unwrap());

    let pushes = pusher.pushes();
    assert_eq!(pushes.len(), 1);
    assert_eq!(pushes[0].message, "");
}

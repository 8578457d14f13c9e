//! HTTP trigger layer for the board relay.
//!
//! The server is a thin shell over the coordinator:
//! - `POST /webhook` — signed webhook deliveries (forced triggers)
//! - `POST /sync` — manual trigger, optionally awaited with `?wait=true`
//! - `GET /status` — queue and rate-window snapshot
//! - `GET /health` — liveness probe
//!
//! All coordination semantics (dedup, priority, rate limiting, pacing) live
//! in [`crate::coordinator`]; handlers only translate HTTP to trigger
//! submissions and outcomes to status codes.

use std::sync::Arc;

use tower_http::trace::TraceLayer;

use crate::coordinator::SyncCoordinator;
use crate::source::{BoardPusher, ItemSource};

pub mod health;
pub mod signature;
pub mod status;
pub mod sync;
pub mod webhook;

pub use health::health_handler;
pub use signature::{
    compute_signature, format_signature_header, parse_signature_header, verify_signature,
};
pub use status::status_handler;
pub use sync::sync_handler;
pub use webhook::{WebhookError, webhook_handler};

/// Shared application state, passed to handlers via Axum's `State`.
pub struct AppState<S, P> {
    coordinator: SyncCoordinator<S, P>,
    webhook_secret: Arc<Vec<u8>>,
}

impl<S, P> Clone for AppState<S, P> {
    fn clone(&self) -> Self {
        AppState {
            coordinator: self.coordinator.clone(),
            webhook_secret: Arc::clone(&self.webhook_secret),
        }
    }
}

impl<S, P> AppState<S, P>
where
    S: ItemSource + Send + Sync + 'static,
    P: BoardPusher + Send + Sync + 'static,
{
    /// Creates the application state.
    pub fn new(coordinator: SyncCoordinator<S, P>, webhook_secret: impl Into<Vec<u8>>) -> Self {
        AppState {
            coordinator,
            webhook_secret: Arc::new(webhook_secret.into()),
        }
    }

    /// Returns the coordinator handle.
    pub fn coordinator(&self) -> &SyncCoordinator<S, P> {
        &self.coordinator
    }

    /// Returns the webhook shared secret.
    pub fn webhook_secret(&self) -> &[u8] {
        &self.webhook_secret
    }
}

/// Builds the axum router with all endpoints.
pub fn build_router<S, P>(state: AppState<S, P>) -> axum::Router
where
    S: ItemSource + Send + Sync + 'static,
    P: BoardPusher + Send + Sync + 'static,
{
    use axum::routing::{get, post};

    axum::Router::new()
        .route("/webhook", post(webhook_handler::<S, P>))
        .route("/sync", post(sync_handler::<S, P>))
        .route("/status", get(status_handler::<S, P>))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod integration_tests {
    use std::sync::{Arc, Mutex as StdMutex};
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::coordinator::{CoordinatorConfig, SyncCoordinator};
    use crate::page::FormatOptions;
    use crate::source::{
        BoardPusher, FetchError, ItemSource, PagePayload, PushError, PushReceipt,
    };

    use super::*;

    const SECRET: &[u8] = b"test-secret";

    #[derive(Clone)]
    struct FixedSource(Vec<String>);

    impl ItemSource for FixedSource {
        async fn fetch_items(&self) -> Result<Vec<String>, FetchError> {
            Ok(self.0.clone())
        }
    }

    #[derive(Clone)]
    struct RecordingPusher {
        pushes: Arc<StdMutex<Vec<PagePayload>>>,
    }

    impl RecordingPusher {
        fn new() -> Self {
            RecordingPusher {
                pushes: Arc::new(StdMutex::new(Vec::new())),
            }
        }

        fn push_count(&self) -> usize {
            self.pushes.lock().unwrap().len()
        }
    }

    impl BoardPusher for RecordingPusher {
        async fn push_page(&self, payload: &PagePayload) -> Result<PushReceipt, PushError> {
            self.pushes.lock().unwrap().push(payload.clone());
            Ok(PushReceipt {
                status: 200,
                body_code: None,
            })
        }
    }

    fn test_app(items: &[&str]) -> (axum::Router, RecordingPusher) {
        let config = CoordinatorConfig {
            page_size: 3,
            board_title: "Board".to_string(),
            format: FormatOptions::default(),
            rate_limit_backoff: Duration::from_millis(10),
            inter_task_pause: Duration::from_millis(1),
            ..CoordinatorConfig::default()
        };
        let source = FixedSource(items.iter().map(|s| s.to_string()).collect());
        let pusher = RecordingPusher::new();
        let coordinator = SyncCoordinator::new(config, source, pusher.clone());
        let state = AppState::new(coordinator, SECRET);
        (build_router(state), pusher)
    }

    fn signed_webhook(delivery_id: &str, body: &[u8]) -> Request<Body> {
        let header = format_signature_header(&compute_signature(body, SECRET));
        Request::builder()
            .method("POST")
            .uri("/webhook")
            .header("content-type", "application/json")
            .header("x-relay-delivery", delivery_id)
            .header("x-relay-signature-256", header)
            .body(Body::from(body.to_vec()))
            .unwrap()
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    /// Polls until the pusher has seen `count` pushes (bounded wait).
    async fn wait_for_pushes(pusher: &RecordingPusher, count: usize) {
        for _ in 0..200 {
            if pusher.push_count() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("timed out waiting for {count} pushes");
    }

    // ─── Health and status ───

    #[tokio::test]
    async fn health_returns_200() {
        let (app, _pusher) = test_app(&[]);
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn status_reports_idle_queue() {
        let (app, _pusher) = test_app(&[]);
        let response = app
            .oneshot(Request::builder().uri("/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: serde_json::Value =
            serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["queue_length"], 0);
        assert_eq!(body["is_draining"], false);
        assert_eq!(body["recent_call_count"], 0);
    }

    // ─── Webhook endpoint ───

    #[tokio::test]
    async fn webhook_without_signature_is_rejected() {
        let (app, _pusher) = test_app(&["a"]);
        let request = Request::builder()
            .method("POST")
            .uri("/webhook")
            .body(Body::from("{}"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn webhook_with_wrong_signature_is_rejected() {
        let (app, _pusher) = test_app(&["a"]);
        let request = Request::builder()
            .method("POST")
            .uri("/webhook")
            .header("x-relay-signature-256", "sha256=deadbeef")
            .body(Body::from("{}"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn webhook_with_garbage_body_is_rejected() {
        let (app, _pusher) = test_app(&["a"]);
        let body = b"not json";
        let response = app.oneshot(signed_webhook("d1", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn valid_webhook_is_accepted_and_pushes() {
        let (app, pusher) = test_app(&["buy milk", "write report", "call dentist"]);
        let response = app.oneshot(signed_webhook("d1", b"{}")).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        wait_for_pushes(&pusher, 1).await;
        let pushes = pusher.pushes.lock().unwrap().clone();
        assert_eq!(
            pushes[0].message,
            "1. buy milk\n2. write report\n3. call dentist"
        );
    }

    #[tokio::test]
    async fn duplicate_delivery_answers_accepted_duplicate() {
        let (app, pusher) = test_app(&["a"]);

        let response = app
            .clone()
            .oneshot(signed_webhook("dup-1", b"{}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        wait_for_pushes(&pusher, 1).await;

        let response = app.oneshot(signed_webhook("dup-1", b"{}")).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(body_string(response).await, "Accepted (duplicate)");

        // No second push happened for the redelivery.
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(pusher.push_count(), 1);
    }

    #[tokio::test]
    async fn webhook_event_id_can_come_from_body() {
        let (app, pusher) = test_app(&["a"]);
        let body = br#"{"event_id": "body-ev"}"#;

        let request = {
            let header = format_signature_header(&compute_signature(body, SECRET));
            Request::builder()
                .method("POST")
                .uri("/webhook")
                .header("x-relay-signature-256", header)
                .body(Body::from(body.to_vec()))
                .unwrap()
        };
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        wait_for_pushes(&pusher, 1).await;

        // Same event_id via the body again: duplicate.
        let request = {
            let header = format_signature_header(&compute_signature(body, SECRET));
            Request::builder()
                .method("POST")
                .uri("/webhook")
                .header("x-relay-signature-256", header)
                .body(Body::from(body.to_vec()))
                .unwrap()
        };
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(body_string(response).await, "Accepted (duplicate)");
    }

    // ─── Manual sync endpoint ───

    #[tokio::test]
    async fn sync_answers_accepted_immediately() {
        let (app, _pusher) = test_app(&["a"]);
        let request = Request::builder()
            .method("POST")
            .uri("/sync")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn sync_wait_reports_the_outcome() {
        let (app, pusher) = test_app(&["a"]);
        let request = Request::builder()
            .method("POST")
            .uri("/sync?wait=true")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(pusher.push_count(), 1);
    }
}

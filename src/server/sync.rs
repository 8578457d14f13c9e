//! Manual sync trigger endpoint.
//!
//! `POST /sync` enqueues a non-forced task and answers 202 immediately.
//! With `?wait=true` the handler awaits the task's completion and maps the
//! outcome to 200 or 502, for callers that want a synchronous answer.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use tracing::debug;

use crate::source::{BoardPusher, ItemSource};

use super::AppState;

/// Query parameters of the manual trigger.
#[derive(Debug, Default, Deserialize)]
pub struct SyncParams {
    /// Await the sync outcome instead of answering 202 right away.
    #[serde(default)]
    pub wait: bool,
}

/// Manual trigger handler.
pub async fn sync_handler<S, P>(
    State(state): State<AppState<S, P>>,
    Query(params): Query<SyncParams>,
) -> (StatusCode, &'static str)
where
    S: ItemSource + Send + Sync + 'static,
    P: BoardPusher + Send + Sync + 'static,
{
    debug!(wait = params.wait, "manual trigger received");
    let submission = state.coordinator().submit_manual_trigger().await;

    if !params.wait {
        return (StatusCode::ACCEPTED, "Accepted");
    }

    // A closed channel means the task was dropped without executing
    // (shutdown mid-queue); report that as failure like any other.
    match submission.completion.await {
        Ok(true) => (StatusCode::OK, "sync completed"),
        Ok(false) | Err(_) => (StatusCode::BAD_GATEWAY, "sync failed"),
    }
}

//! Queue introspection endpoint.
//!
//! `GET /status` reports queue length, drain activity, and the recent board
//! call count. Observability only; no side effects.

use axum::Json;
use axum::extract::State;

use crate::source::{BoardPusher, ItemSource};
use crate::types::QueueStatus;

use super::AppState;

/// Status handler.
pub async fn status_handler<S, P>(State(state): State<AppState<S, P>>) -> Json<QueueStatus>
where
    S: ItemSource + Send + Sync + 'static,
    P: BoardPusher + Send + Sync + 'static,
{
    Json(state.coordinator().status().await)
}

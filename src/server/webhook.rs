//! Webhook trigger endpoint.
//!
//! Accepts signed webhook deliveries, extracts the event identifier, and
//! enqueues a forced sync task. The handler answers as soon as the task is
//! accepted; the push itself happens asynchronously in the drain loop.
//! Duplicates answer 202 as well — a redelivery of handled work is a
//! successful no-op, and anything else would make the provider retry.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::source::{BoardPusher, ItemSource};
use crate::types::EventId;

use super::AppState;
use super::signature::verify_signature;

/// Header carrying the delivery identifier.
const HEADER_DELIVERY: &str = "x-relay-delivery";
/// Header carrying the HMAC-SHA256 payload signature.
const HEADER_SIGNATURE: &str = "x-relay-signature-256";

/// Errors that reject a webhook delivery.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Missing required header.
    #[error("missing required header: {0}")]
    MissingHeader(&'static str),

    /// Signature did not match the payload.
    #[error("invalid signature")]
    InvalidSignature,

    /// Body was present but not valid JSON.
    #[error("invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = match &self {
            WebhookError::MissingHeader(_) => StatusCode::BAD_REQUEST,
            WebhookError::InvalidSignature => StatusCode::UNAUTHORIZED,
            WebhookError::InvalidJson(_) => StatusCode::BAD_REQUEST,
        };
        (status, self.to_string()).into_response()
    }
}

/// Optional JSON body of a webhook delivery.
#[derive(Debug, Default, Deserialize)]
struct WebhookBody {
    /// Event identifier, used when the delivery header is absent.
    event_id: Option<String>,
    /// Overrides the forced default (webhooks preempt queued normal tasks).
    forced: Option<bool>,
}

/// Webhook handler.
///
/// # Request
///
/// - `X-Relay-Signature-256`: required, `sha256=<hex>` over the raw body
/// - `X-Relay-Delivery`: optional delivery ID (preferred dedup identifier)
/// - Body: optional JSON `{"event_id": "...", "forced": bool}`
///
/// # Response
///
/// - 202 Accepted — enqueued (body "Accepted (duplicate)" when deduped)
/// - 400 Bad Request — missing signature header or malformed JSON
/// - 401 Unauthorized — signature mismatch
pub async fn webhook_handler<S, P>(
    State(state): State<AppState<S, P>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, &'static str), WebhookError>
where
    S: ItemSource + Send + Sync + 'static,
    P: BoardPusher + Send + Sync + 'static,
{
    let signature_header = get_header(&headers, HEADER_SIGNATURE)?;

    // Verify before any parsing or queue work.
    if !verify_signature(&body, &signature_header, state.webhook_secret()) {
        warn!("invalid webhook signature");
        return Err(WebhookError::InvalidSignature);
    }

    let parsed: WebhookBody = if body.is_empty() {
        WebhookBody::default()
    } else {
        serde_json::from_slice(&body)?
    };

    // The delivery header wins; the body's event_id is the fallback.
    let event_id = headers
        .get(HEADER_DELIVERY)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or(parsed.event_id)
        .and_then(EventId::new);

    let forced = parsed.forced.unwrap_or(true);

    debug!(event_id = ?event_id, forced, "webhook trigger received");

    let submission = state
        .coordinator()
        .submit_webhook_trigger(event_id, forced)
        .await;

    if submission.accepted {
        Ok((StatusCode::ACCEPTED, "Accepted"))
    } else {
        Ok((StatusCode::ACCEPTED, "Accepted (duplicate)"))
    }
}

fn get_header(headers: &HeaderMap, name: &'static str) -> Result<String, WebhookError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .ok_or(WebhookError::MissingHeader(name))
}

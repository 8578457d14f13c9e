//! One orchestrated sync execution: fetch, paginate, render, push.
//!
//! All collaborator failures are converted to a boolean outcome here; no
//! error crosses back into the drain loop or the triggers.

use chrono::Utc;
use tracing::{debug, warn};

use crate::page::{render_message, render_title, rotation_interval_for, select_page};
use crate::source::{BoardPusher, ItemSource, PagePayload};
use crate::types::EventId;

use super::Inner;

/// Executes one sync and returns its outcome.
///
/// The event ID (when present) is marked processed regardless of the
/// outcome, so a permanently failing payload cannot turn webhook
/// redeliveries into a retry storm.
pub(super) async fn execute<S, P>(inner: &Inner<S, P>, event_id: Option<&EventId>) -> bool
where
    S: ItemSource,
    P: BoardPusher,
{
    let outcome = run_sync(inner).await;

    {
        let mut state = inner.state.lock().await;
        if let Some(id) = event_id {
            state.dedupe.mark_processed(id.clone());
        }
        state.in_flight = None;
    }

    outcome
}

async fn run_sync<S, P>(inner: &Inner<S, P>) -> bool
where
    S: ItemSource,
    P: BoardPusher,
{
    let items = match inner.source.fetch_items().await {
        Ok(items) => items,
        Err(err) => {
            warn!(error = %err, "item fetch failed; skipping push");
            return false;
        }
    };

    let config = &inner.config;
    let rotation = rotation_interval_for(items.len(), config.page_size);
    let page = select_page(&items, config.page_size, rotation, Utc::now());

    let payload = PagePayload {
        title: render_title(&config.board_title, &page),
        message: render_message(&page, &config.format),
    };

    debug!(
        page = page.page_number,
        total_pages = page.total_pages,
        total_items = page.total_items,
        "pushing page to board"
    );

    match inner.pusher.push_page(&payload).await {
        Ok(receipt) => {
            if receipt.is_success() {
                true
            } else {
                warn!(
                    status = receipt.status,
                    body_code = ?receipt.body_code,
                    "board rejected push"
                );
                false
            }
        }
        Err(err) => {
            warn!(error = %err, "board push failed");
            false
        }
    }
}

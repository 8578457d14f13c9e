//! Time-modulo page selection.
//!
//! The visible page is derived from the time of day: seconds since midnight,
//! divided by the rotation interval, modulo the page count. Two calls within
//! the same rotation slot pick the same page; a restarted process converges
//! to the same page as one that never restarted.

use std::time::Duration;

use chrono::{DateTime, Timelike, Utc};

/// One bounded-size slice of the full item list, chosen for display now.
///
/// Derived on every push and never stored beyond the call that produces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// The items on this page, in upstream order.
    pub items: Vec<String>,
    /// 1-based page number; 0 when there are no pages at all.
    pub page_number: usize,
    /// Total number of pages for the current item list.
    pub total_pages: usize,
    /// Total number of items across all pages.
    pub total_items: usize,
    /// Index (0-based, into the full list) of the first item on this page.
    ///
    /// Item numbering continues from here so numbers are globally unique
    /// across pages rather than resetting per page.
    pub start_index: usize,
    /// When this page was computed.
    pub generated_at: DateTime<Utc>,
}

impl Page {
    /// Returns an empty page for an empty item list.
    fn empty(generated_at: DateTime<Utc>) -> Self {
        Page {
            items: Vec::new(),
            page_number: 0,
            total_pages: 0,
            total_items: 0,
            start_index: 0,
            generated_at,
        }
    }
}

/// Minimum rotation interval.
const MIN_ROTATION_SECS: u64 = 5;

/// Rotation budget spread across one full cycle of pages (15 minutes).
const ROTATION_BUDGET_SECS: u64 = 15 * 60;

/// Derives the rotation interval from the volume of content.
///
/// The interval is `15 minutes / total_pages / 3`, floored, with a minimum
/// of five seconds, so rotation speeds up as the item list grows and a full
/// cycle never stretches far beyond the budget.
pub fn rotation_interval_for(total_items: usize, page_size: usize) -> Duration {
    let total_pages = total_pages_for(total_items, page_size);
    if total_pages == 0 {
        return Duration::from_secs(MIN_ROTATION_SECS);
    }
    let secs = ROTATION_BUDGET_SECS / total_pages as u64 / 3;
    Duration::from_secs(secs.max(MIN_ROTATION_SECS))
}

/// Computes `ceil(total_items / page_size)`, with 0 for degenerate input.
fn total_pages_for(total_items: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total_items.div_ceil(page_size)
}

/// Selects the page to show at `now`.
///
/// Pure: identical arguments produce identical pages, and any `now` within
/// the same rotation slot produces the same page. An empty item list (or a
/// zero page size) yields an empty page; there is no division by zero.
pub fn select_page(
    items: &[String],
    page_size: usize,
    rotation_interval: Duration,
    now: DateTime<Utc>,
) -> Page {
    let total_pages = total_pages_for(items.len(), page_size);
    if total_pages == 0 {
        return Page::empty(now);
    }

    let seconds_since_midnight = u64::from(now.num_seconds_from_midnight());
    let interval_secs = rotation_interval.as_secs().max(1);
    let page_index = (seconds_since_midnight / interval_secs) as usize % total_pages;

    let start = page_index * page_size;
    let end = (start + page_size).min(items.len());

    Page {
        items: items[start..end].to_vec(),
        page_number: page_index + 1,
        total_pages,
        total_items: items.len(),
        start_index: start,
        generated_at: now,
    }
}

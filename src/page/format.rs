//! Rendering a page into the board's constrained payload.
//!
//! The board accepts a short title and a message with a hard payload limit.
//! Each item line is truncated to a per-item character cap, and the joined
//! message is truncated as a whole to the message cap, both with an ellipsis
//! marker. Item numbers continue from the page's start index so a number
//! identifies the same item no matter which page is visible.

use super::select::Page;

/// Marker appended when text is cut off.
const ELLIPSIS: &str = "…";

/// Character caps applied while rendering a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    /// Maximum characters of a single item's display text.
    pub item_char_cap: usize,
    /// Maximum characters of the whole joined message.
    pub message_char_cap: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        FormatOptions {
            item_char_cap: 50,
            message_char_cap: 500,
        }
    }
}

/// Renders the board title, appending a page indicator when there is more
/// than one page.
pub fn render_title(base: &str, page: &Page) -> String {
    if page.total_pages > 1 {
        format!("{base} ({}/{})", page.page_number, page.total_pages)
    } else {
        base.to_string()
    }
}

/// Renders a page as numbered lines, applying both truncation caps.
///
/// Numbering is global: the first line of page 2 (page size 3) is `4.`.
/// An empty page renders as an empty message.
pub fn render_message(page: &Page, opts: &FormatOptions) -> String {
    let lines: Vec<String> = page
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let number = page.start_index + i + 1;
            format!("{number}. {}", truncate_chars(item, opts.item_char_cap))
        })
        .collect();

    truncate_chars(&lines.join("\n"), opts.message_char_cap)
}

/// Truncates to at most `cap` characters, appending an ellipsis if cut.
///
/// Counts characters, not bytes, so multi-byte text is never split mid
/// code point. A cap of zero disables truncation.
fn truncate_chars(s: &str, cap: usize) -> String {
    if cap == 0 || s.chars().count() <= cap {
        return s.to_string();
    }
    let kept: String = s.chars().take(cap).collect();
    format!("{kept}{ELLIPSIS}")
}

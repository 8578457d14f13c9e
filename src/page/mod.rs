//! Page selection and rendering for the display board.
//!
//! The board can only show one bounded-size page at a time, so the full item
//! list is split into pages and the visible page rotates over time. Which
//! page is visible is a pure function of the wall clock and the item count:
//! no rotation counter is persisted, and any process computing the page for
//! the same moment arrives at the same answer.
//!
//! - [`select`]: pure page selection (time-modulo rotation)
//! - [`format`]: rendering a page into the board's constrained payload

pub mod format;
pub mod select;

pub use format::{FormatOptions, render_message, render_title};
pub use select::{Page, rotation_interval_for, select_page};

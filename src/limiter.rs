//! Sliding-window rate limiter for the board push API.
//!
//! The board's API tolerates a bounded number of calls per minute. The
//! limiter keeps the timestamps of recent calls in a trailing 60-second
//! window and answers whether the next call would exceed the ceiling.
//!
//! Stale entries are purged lazily, on every read and every write, so the
//! window never needs a background sweeper. Functions come in pairs: the
//! plain form uses `Utc::now()`, the `_at` form takes an explicit timestamp
//! for tests.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};

/// Default ceiling on board calls within the trailing window.
pub const MAX_CALLS_PER_MINUTE: usize = 60;

/// Length of the trailing window in milliseconds.
const WINDOW_MS: i64 = 60_000;

/// A sliding-window counter of recent board calls.
///
/// Invariant: timestamps in the window are monotonically non-decreasing.
/// Callers using the `_at` forms must supply non-decreasing timestamps;
/// the production wrappers do, since they read the system clock.
#[derive(Debug)]
pub struct RateLimiter {
    max_calls: usize,
    window: VecDeque<DateTime<Utc>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiter {
    /// Creates a limiter with the default ceiling.
    pub fn new() -> Self {
        Self::with_max_calls(MAX_CALLS_PER_MINUTE)
    }

    /// Creates a limiter with a custom ceiling.
    pub fn with_max_calls(max_calls: usize) -> Self {
        RateLimiter {
            max_calls,
            window: VecDeque::new(),
        }
    }

    /// Records a call at the current time.
    pub fn record_call(&mut self) {
        self.record_call_at(Utc::now());
    }

    /// Records a call at the given time, purging stale entries first.
    pub fn record_call_at(&mut self, now: DateTime<Utc>) {
        self.purge(now);
        self.window.push_back(now);
    }

    /// Returns true if the window already holds the maximum number of calls.
    ///
    /// Has no side effect beyond purging stale entries.
    pub fn is_over_limit(&mut self) -> bool {
        self.is_over_limit_at(Utc::now())
    }

    /// Time-explicit form of [`RateLimiter::is_over_limit`].
    pub fn is_over_limit_at(&mut self, now: DateTime<Utc>) -> bool {
        self.purge(now);
        self.window.len() >= self.max_calls
    }

    /// Returns the number of calls in the trailing window.
    pub fn recent_call_count(&mut self) -> usize {
        self.recent_call_count_at(Utc::now())
    }

    /// Time-explicit form of [`RateLimiter::recent_call_count`].
    pub fn recent_call_count_at(&mut self, now: DateTime<Utc>) -> usize {
        self.purge(now);
        self.window.len()
    }

    /// Drops window entries older than the trailing window.
    fn purge(&mut self, now: DateTime<Utc>) {
        let cutoff = now - Duration::milliseconds(WINDOW_MS);
        while let Some(front) = self.window.front() {
            if *front <= cutoff {
                self.window.pop_front();
            } else {
                break;
            }
        }
    }
}

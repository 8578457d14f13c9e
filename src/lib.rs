//! Board Relay - relays paginated item lists to a constrained display board.
//!
//! This library provides the coordination core between trigger events
//! (manual calls, scheduled ticks, webhooks) and the outbound board push:
//! serialized execution, deduplication, rate limiting, and deterministic
//! time-based page rotation.

pub mod config;
pub mod coordinator;
pub mod dedupe;
pub mod limiter;
pub mod page;
pub mod poll;
pub mod queue;
pub mod server;
pub mod source;
pub mod types;

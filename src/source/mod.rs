//! Collaborator seams for the upstream source and the display board.
//!
//! The coordinator core only ever talks to these two traits. Concrete HTTP
//! implementations live in [`http`]; tests substitute in-memory mocks.
//!
//! # Example (mock for testing)
//!
//! ```ignore
//! struct FixedSource(Vec<String>);
//!
//! impl ItemSource for FixedSource {
//!     async fn fetch_items(&self) -> Result<Vec<String>, FetchError> {
//!         Ok(self.0.clone())
//!     }
//! }
//! ```

use std::future::Future;

use thiserror::Error;

pub mod http;

pub use http::{HttpBoardPusher, HttpItemSource};

/// Failure fetching the item list from upstream.
///
/// Treated as task failure by the orchestrator; the core does not retry.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure (connection refused, DNS, TLS, non-2xx).
    #[error("upstream request failed: {0}")]
    Transport(String),

    /// The upstream responded but the body was not a recognizable item list.
    #[error("upstream returned a malformed response: {0}")]
    Malformed(String),

    /// The request exceeded the configured timeout.
    #[error("upstream request timed out")]
    Timeout,
}

/// Failure delivering a page to the board.
#[derive(Debug, Error)]
pub enum PushError {
    /// Transport-level failure reaching the board endpoint.
    #[error("board request failed: {0}")]
    Transport(String),

    /// The request exceeded the configured timeout.
    #[error("board request timed out")]
    Timeout,
}

/// The single-page payload posted to the board.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PagePayload {
    /// Short title line shown above the message.
    pub title: String,
    /// The rendered, size-capped page body.
    pub message: String,
}

/// What the board answered to a push.
///
/// The board API has a dual success convention: a plain HTTP 200, or a 200
/// code inside the response body. Either counts as success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PushReceipt {
    /// HTTP status of the response.
    pub status: u16,
    /// The `code` field of the JSON response body, when present.
    pub body_code: Option<i64>,
}

impl PushReceipt {
    /// Returns true under the board's dual success convention.
    pub fn is_success(&self) -> bool {
        self.status == 200 || self.body_code == Some(200)
    }
}

/// Fetches the display strings currently eligible for the board.
///
/// Upstream-side filtering is the implementation's responsibility; the core
/// treats the returned list as opaque display text.
pub trait ItemSource {
    /// Fetches the current item list.
    fn fetch_items(&self) -> impl Future<Output = Result<Vec<String>, FetchError>> + Send;
}

/// Pushes a single rendered page to the board.
pub trait BoardPusher {
    /// Posts the payload and reports what the board answered.
    ///
    /// A non-200 HTTP status is still an `Ok` receipt; only transport-level
    /// failures are errors.
    fn push_page(
        &self,
        payload: &PagePayload,
    ) -> impl Future<Output = Result<PushReceipt, PushError>> + Send;
}

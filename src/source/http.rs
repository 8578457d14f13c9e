//! HTTP implementations of the collaborator traits.
//!
//! The upstream source is a GET endpoint returning either a bare JSON array
//! of strings or an object with an `items` array. The board is a POST
//! endpoint taking `{title, message}` and answering with an optional JSON
//! `code` field alongside the HTTP status.
//!
//! Both clients are bounded by the configured timeout so no orchestrated
//! call blocks indefinitely.

use std::time::Duration;

use tracing::debug;

use super::{BoardPusher, FetchError, ItemSource, PagePayload, PushError, PushReceipt};

fn build_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().timeout(timeout).build()
}

/// Fetches the item list from an upstream JSON endpoint.
#[derive(Debug, Clone)]
pub struct HttpItemSource {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpItemSource {
    /// Creates a source for the given endpoint with the given timeout.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(HttpItemSource {
            client: build_client(timeout)?,
            endpoint: endpoint.into(),
        })
    }
}

impl ItemSource for HttpItemSource {
    async fn fetch_items(&self) -> Result<Vec<String>, FetchError> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(fetch_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Transport(format!("upstream answered {status}")));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|err| FetchError::Malformed(err.to_string()))?;

        let items = parse_items(&body)?;
        debug!(count = items.len(), "fetched items from upstream");
        Ok(items)
    }
}

/// Extracts the item list from an upstream response body.
///
/// Accepts a bare array of strings or an object with an `items` array.
fn parse_items(body: &serde_json::Value) -> Result<Vec<String>, FetchError> {
    let array = match body {
        serde_json::Value::Array(a) => a,
        serde_json::Value::Object(o) => match o.get("items") {
            Some(serde_json::Value::Array(a)) => a,
            _ => {
                return Err(FetchError::Malformed(
                    "object response has no `items` array".into(),
                ));
            }
        },
        other => {
            return Err(FetchError::Malformed(format!(
                "expected array or object, got {other}"
            )));
        }
    };

    array
        .iter()
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| FetchError::Malformed(format!("non-string item: {v}")))
        })
        .collect()
}

fn fetch_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Transport(err.to_string())
    }
}

/// Posts rendered pages to the board endpoint.
#[derive(Debug, Clone)]
pub struct HttpBoardPusher {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpBoardPusher {
    /// Creates a pusher for the given endpoint with the given timeout.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(HttpBoardPusher {
            client: build_client(timeout)?,
            endpoint: endpoint.into(),
        })
    }
}

impl BoardPusher for HttpBoardPusher {
    async fn push_page(&self, payload: &PagePayload) -> Result<PushReceipt, PushError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(payload)
            .send()
            .await
            .map_err(push_error)?;

        let status = response.status().as_u16();

        // The board sometimes reports success only in the body, so read the
        // optional `code` field even on non-200 statuses. An unreadable or
        // non-JSON body is not an error by itself.
        let body_code = match response.json::<serde_json::Value>().await {
            Ok(body) => body.get("code").and_then(serde_json::Value::as_i64),
            Err(_) => None,
        };

        debug!(status, ?body_code, "board answered push");
        Ok(PushReceipt { status, body_code })
    }
}

fn push_error(err: reqwest::Error) -> PushError {
    if err.is_timeout() {
        PushError::Timeout
    } else {
        PushError::Transport(err.to_string())
    }
}

//! Environment-driven configuration.
//!
//! Every knob has a `BOARD_RELAY_*` variable; endpoints and the webhook
//! secret are required, everything else has a default.
//!
//! | Variable | Default |
//! |---|---|
//! | `BOARD_RELAY_LISTEN_ADDR` | `0.0.0.0:3000` |
//! | `BOARD_RELAY_WEBHOOK_SECRET` | required |
//! | `BOARD_RELAY_UPSTREAM_URL` | required |
//! | `BOARD_RELAY_BOARD_URL` | required |
//! | `BOARD_RELAY_BOARD_TITLE` | `Board` |
//! | `BOARD_RELAY_PAGE_SIZE` | `3` |
//! | `BOARD_RELAY_ITEM_CHAR_CAP` | `50` |
//! | `BOARD_RELAY_MESSAGE_CHAR_CAP` | `500` |
//! | `BOARD_RELAY_MAX_CALLS_PER_MINUTE` | `60` |
//! | `BOARD_RELAY_DEDUPE_CAPACITY` | `1000` |
//! | `BOARD_RELAY_HTTP_TIMEOUT_SECS` | `10` |
//! | `BOARD_RELAY_POLL_INTERVAL_MINS` | `10` |

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use crate::coordinator::CoordinatorConfig;
use crate::page::FormatOptions;
use crate::poll::PollConfig;

/// Errors constructing a [`Config`] from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),

    /// A variable is set but unparsable.
    #[error("invalid value for {name}: {value}")]
    Invalid {
        /// The variable name.
        name: &'static str,
        /// The offending value.
        value: String,
    },
}

/// Full service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to.
    pub listen_addr: SocketAddr,
    /// Shared secret for webhook signature verification.
    pub webhook_secret: Vec<u8>,
    /// Upstream endpoint serving the item list.
    pub upstream_url: String,
    /// Board endpoint accepting page pushes.
    pub board_url: String,
    /// Timeout applied to both outbound HTTP calls.
    pub http_timeout: Duration,
    /// Coordinator tuning (page size, caps, rate ceiling, pauses).
    pub coordinator: CoordinatorConfig,
    /// Scheduled tick configuration.
    pub poll: PollConfig,
}

impl Config {
    /// Reads the configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let listen_addr = parsed_var("BOARD_RELAY_LISTEN_ADDR")?
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

        let coordinator = CoordinatorConfig {
            page_size: parsed_var("BOARD_RELAY_PAGE_SIZE")?.unwrap_or(3),
            board_title: string_var("BOARD_RELAY_BOARD_TITLE").unwrap_or_else(|| "Board".into()),
            format: FormatOptions {
                item_char_cap: parsed_var("BOARD_RELAY_ITEM_CHAR_CAP")?.unwrap_or(50),
                message_char_cap: parsed_var("BOARD_RELAY_MESSAGE_CHAR_CAP")?.unwrap_or(500),
            },
            max_calls_per_minute: parsed_var("BOARD_RELAY_MAX_CALLS_PER_MINUTE")?.unwrap_or(60),
            dedupe_capacity: parsed_var("BOARD_RELAY_DEDUPE_CAPACITY")?.unwrap_or(1000),
            ..CoordinatorConfig::default()
        };

        Ok(Config {
            listen_addr,
            webhook_secret: required_var("BOARD_RELAY_WEBHOOK_SECRET")?.into_bytes(),
            upstream_url: required_var("BOARD_RELAY_UPSTREAM_URL")?,
            board_url: required_var("BOARD_RELAY_BOARD_URL")?,
            http_timeout: Duration::from_secs(
                parsed_var("BOARD_RELAY_HTTP_TIMEOUT_SECS")?.unwrap_or(10),
            ),
            coordinator,
            poll: PollConfig::from_env(),
        })
    }
}

fn string_var(name: &'static str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn required_var(name: &'static str) -> Result<String, ConfigError> {
    string_var(name).ok_or(ConfigError::Missing(name))
}

fn parsed_var<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match string_var(name) {
        None => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

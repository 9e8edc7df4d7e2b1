//! # Relay Configuration
//!
//! Configuration for the relay, loaded from environment variables with
//! hardcoded fallbacks. All values are validated on startup to fail fast if
//! misconfigured.
//!
//! ## Environment Variables
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `TUITION_GATEWAY_URL` | `http://127.0.0.1:3001` | Base URL of the assistant gateway |
//! | `TUITION_REQUEST_TIMEOUT_SECS` | `30` | Gateway request timeout |
//! | `TUITION_HISTORY` | `ephemeral` | Conversation-history mode (`ephemeral` or `persistent`) |

use std::env;
use std::time::Duration;

use crate::error::{RelayError, Result};
use crate::session::MAX_REQUESTS_PER_SESSION;

/// Default gateway base URL when `TUITION_GATEWAY_URL` is not set.
pub const DEFAULT_GATEWAY_URL: &str = "http://127.0.0.1:3001";

/// Default gateway request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// What happens to the shared conversation log on startup.
///
/// The observed behavior of the system is to purge all history on every load,
/// which makes the shared log a per-session record despite living in a
/// persistent multi-reader store. Rather than bake that in implicitly, the
/// choice is an explicit, named configuration value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryMode {
    /// Purge the entire log on startup and seed the welcome entry (default).
    Ephemeral,
    /// Keep existing history; only seed the welcome entry into an empty log.
    Persistent,
}

/// Relay configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Base URL of the remote tuition assistant gateway.
    pub gateway_url: String,

    /// Timeout applied to each gateway request.
    pub request_timeout: Duration,

    /// Per-session cap on user-initiated gateway calls.
    pub max_requests: u32,

    /// Startup behavior for the shared conversation log.
    pub history: HistoryMode,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            gateway_url: DEFAULT_GATEWAY_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_requests: MAX_REQUESTS_PER_SESSION,
            history: HistoryMode::Ephemeral,
        }
    }
}

impl RelayConfig {
    /// Load configuration from environment variables, falling back to the
    /// hardcoded defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        let gateway_url = env::var("TUITION_GATEWAY_URL")
            .unwrap_or_else(|_| DEFAULT_GATEWAY_URL.to_string());

        let request_timeout_secs = match env::var("TUITION_REQUEST_TIMEOUT_SECS") {
            Ok(raw) => raw.parse::<u64>().map_err(|e| {
                RelayError::Config(format!(
                    "TUITION_REQUEST_TIMEOUT_SECS must be a valid number: {}",
                    e
                ))
            })?,
            Err(_) => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        let history = match env::var("TUITION_HISTORY") {
            Ok(raw) => match raw.to_ascii_lowercase().as_str() {
                "ephemeral" => HistoryMode::Ephemeral,
                "persistent" => HistoryMode::Persistent,
                other => {
                    return Err(RelayError::Config(format!(
                        "TUITION_HISTORY must be 'ephemeral' or 'persistent', got '{}'",
                        other
                    )))
                }
            },
            Err(_) => HistoryMode::Ephemeral,
        };

        let config = Self {
            gateway_url,
            request_timeout: Duration::from_secs(request_timeout_secs),
            max_requests: MAX_REQUESTS_PER_SESSION,
            history,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.gateway_url.trim().is_empty() {
            return Err(RelayError::Config(
                "gateway URL must not be empty".to_string(),
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(RelayError::Config(
                "request timeout must be greater than zero".to_string(),
            ));
        }
        if self.max_requests == 0 {
            return Err(RelayError::Config(
                "max requests per session must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

//! # Centralized Error Handling
//!
//! This module defines the library-wide error type [`RelayError`] used
//! consistently across the relay, store, gateway, and session modules. It
//! follows the `thiserror` pattern for ergonomic error handling.
//!
//! ## Error Categories
//!
//! 1. **Configuration** - [`Config`](RelayError::Config): invalid or missing
//!    startup configuration.
//! 2. **Remote call failures** - [`Gateway`](RelayError::Gateway): network
//!    errors, timeouts, and non-2xx responses from the tuition assistant
//!    gateway. These are caught at the `send` boundary and converted into a
//!    visible fallback entry; they never propagate to the view.
//! 3. **Store failures** - [`Store`](RelayError::Store) and
//!    [`NotFound`](RelayError::NotFound): create/delete/list failures against
//!    the shared conversation log. Per-entry deletion failures during a reset
//!    are isolated and logged rather than aborting the purge.
//! 4. **Session storage** - [`Session`](RelayError::Session): quota counter
//!    load/persist failures. Logged, never surfaced to the user.

use thiserror::Error;

/// Convenience type alias for `Result<T, RelayError>`.
pub type Result<T> = std::result::Result<T, RelayError>;

/// Library-wide error type covering all relay failure scenarios.
///
/// Each variant includes a descriptive context string. The `#[error]`
/// attribute from `thiserror` provides the `Display` implementation.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Configuration error during startup or environment loading.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Remote gateway error (network, timeout, non-2xx status).
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// Shared log store error (create/delete/list failure).
    #[error("Store error: {0}")]
    Store(String),

    /// Entry not found in the shared log store.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Session quota storage error (load/persist failure).
    #[error("Session storage error: {0}")]
    Session(String),
}

/// Convert `reqwest::Error` to `RelayError`.
impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        RelayError::Gateway(err.to_string())
    }
}

/// Convert `serde_json::Error` to `RelayError`.
impl From<serde_json::Error> for RelayError {
    fn from(err: serde_json::Error) -> Self {
        RelayError::Store(format!("JSON error: {}", err))
    }
}

/// Convert `std::io::Error` to `RelayError`.
impl From<std::io::Error> for RelayError {
    fn from(err: std::io::Error) -> Self {
        RelayError::Session(err.to_string())
    }
}

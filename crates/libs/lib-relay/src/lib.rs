//! # Relay Library
//!
//! Core of the tuition assistant chat: the message-relay synchronization
//! protocol that turns a locally typed message into a persisted, ordered,
//! rate-limited conversation visible to every connected view.
//!
//! ## Modules
//!
//! - [`relay`]: the [`Relay`](relay::Relay) orchestrator (`send`, `reset`,
//!   `init`, change-feed subscription)
//! - [`store`]: the shared conversation-log contract and the in-process
//!   implementation
//! - [`gateway`]: HTTP client for the remote tuition assistant service
//! - [`session`]: per-session request quota and its persistence seam
//! - [`config`]: environment-driven configuration with hardcoded fallbacks
//! - [`error`]: the library-wide error type
//!
//! ## Responsibilities that stay outside this crate
//!
//! The assistant logic itself and the durable multi-reader document engine
//! are external collaborators; this crate only speaks their contracts.

pub mod config;
pub mod error;
pub mod gateway;
pub mod relay;
pub mod session;
pub mod store;

pub use config::{HistoryMode, RelayConfig};
pub use error::{RelayError, Result};
pub use gateway::{AssistantGateway, HttpGateway};
pub use relay::{Relay, SendOutcome, FALLBACK_TEXT, WELCOME_TEXT};
pub use session::{
    FileQuotaStore, MemoryQuotaStore, QuotaStore, SessionSnapshot, MAX_REQUESTS_PER_SESSION,
};
pub use store::{ChangeFeed, LogStore, MemoryLogStore};

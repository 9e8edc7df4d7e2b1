//! # Data Transfer Objects (DTOs)
//!
//! Data structures exchanged with the shared conversation log and the remote
//! tuition assistant gateway.
//!
//! ## Module Organization
//!
//! - [`chat`] - Conversation entries, drafts, and the gateway request body
//!
//! ## Serialization Format
//!
//! All DTOs use `serde_json`:
//!
//! - **Field naming**: snake_case (default serde behavior)
//! - **Enums**: lowercase strings via `#[serde(rename_all = "lowercase")]`
//! - **All types**: implement both `Serialize` and `Deserialize`

pub mod chat;

pub use chat::*;

//! # Shared Data Transfer Objects Library
//!
//! This library defines the wire contract shared by the relay library and the
//! desktop client. All DTOs use JSON serialization via `serde`.
//!
//! ## Structure
//!
//! - **[`dto`]**: Data Transfer Objects
//!   - **[`dto::chat`]**: Conversation-log entries and the assistant gateway
//!     request body
//!
//! ## Wire Format
//!
//! - Field names use **snake_case** in Rust, which maps directly to the JSON
//!   field names of the shared log document shape
//!   (`{ text, sender, timestamp, time }` plus the store-assigned `id`)
//! - The `sender` enum serializes to the lowercase strings `"user"` / `"ai"`
//! - All structs implement both `Serialize` and `Deserialize`

pub mod dto;

// Re-export commonly used types for convenience
pub use dto::*;

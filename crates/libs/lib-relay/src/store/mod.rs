//! # Shared Log Store Contract
//!
//! The shared conversation log is an ordered, append-only, multi-reader
//! document collection with store-assigned ordering tokens and a push-based
//! change feed. The engine behind it is an external concern; this module
//! defines the contract the relay consumes, plus an in-process
//! implementation ([`MemoryLogStore`]) used by the desktop client and the
//! test suite.

pub mod memory;

pub use memory::MemoryLogStore;

use async_trait::async_trait;
use shared::dto::chat::{ChatEntry, EntryDraft};
use tokio::sync::broadcast;

use crate::error::Result;

/// Push feed of full ordered snapshots, delivered on every insert or delete.
///
/// Dropping the receiver unregisters the subscription.
pub type ChangeFeed = broadcast::Receiver<Vec<ChatEntry>>;

/// The shared conversation log consumed by the relay.
///
/// Implementations assign the entry id and the monotonic ordering token at
/// write time, so true arrival order is preserved even under clock skew or
/// concurrent writers. Entries are immutable once created.
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Append a drafted entry; the store assigns `id` and `timestamp`.
    async fn create(&self, draft: EntryDraft) -> Result<ChatEntry>;

    /// Delete a single entry by id.
    async fn delete(&self, id: &str) -> Result<()>;

    /// All entries, ascending by ordering token.
    async fn list(&self) -> Result<Vec<ChatEntry>>;

    /// Subscribe to ordered snapshots of the whole log.
    fn subscribe(&self) -> ChangeFeed;
}

//! # In-Process Log Store
//!
//! [`MemoryLogStore`] keeps the conversation log in memory and fans out a
//! full ordered snapshot to every subscriber after each insert or delete.
//! Ordering tokens come from a monotonic sequence owned by the store, so all
//! readers observe the same total order regardless of writer clocks.

use async_trait::async_trait;
use shared::dto::chat::{ChatEntry, EntryDraft};
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use super::{ChangeFeed, LogStore};
use crate::error::{RelayError, Result};

/// Capacity of the snapshot broadcast channel.
const FEED_CAPACITY: usize = 100;

#[derive(Debug, Default)]
struct LogInner {
    entries: Vec<ChatEntry>,
    next_token: u64,
}

/// In-process shared log with a broadcast change feed.
pub struct MemoryLogStore {
    inner: RwLock<LogInner>,
    feed: broadcast::Sender<Vec<ChatEntry>>,
}

impl MemoryLogStore {
    pub fn new() -> Self {
        let (feed, _) = broadcast::channel(FEED_CAPACITY);
        Self {
            inner: RwLock::new(LogInner::default()),
            feed,
        }
    }

    fn publish(&self, snapshot: Vec<ChatEntry>) {
        // No subscribers is fine; the send result only signals that.
        let _ = self.feed.send(snapshot);
    }
}

impl Default for MemoryLogStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LogStore for MemoryLogStore {
    async fn create(&self, draft: EntryDraft) -> Result<ChatEntry> {
        let snapshot;
        let entry;
        {
            let mut inner = self.inner.write().await;
            let token = inner.next_token;
            inner.next_token += 1;
            entry = ChatEntry {
                id: Uuid::new_v4().to_string(),
                text: draft.text,
                sender: draft.sender,
                timestamp: token,
                time: draft.time,
            };
            // Tokens are assigned in insertion order, so pushing keeps the
            // vector sorted ascending.
            inner.entries.push(entry.clone());
            snapshot = inner.entries.clone();
        }
        self.publish(snapshot);
        Ok(entry)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let snapshot;
        {
            let mut inner = self.inner.write().await;
            let before = inner.entries.len();
            inner.entries.retain(|entry| entry.id != id);
            if inner.entries.len() == before {
                return Err(RelayError::NotFound(format!("entry {}", id)));
            }
            snapshot = inner.entries.clone();
        }
        self.publish(snapshot);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ChatEntry>> {
        Ok(self.inner.read().await.entries.clone())
    }

    fn subscribe(&self) -> ChangeFeed {
        self.feed.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::dto::chat::Sender;

    #[tokio::test]
    async fn test_create_assigns_monotonic_tokens() {
        let store = MemoryLogStore::new();
        let first = store.create(EntryDraft::user("one")).await.unwrap();
        let second = store.create(EntryDraft::assistant("two")).await.unwrap();
        let third = store.create(EntryDraft::user("three")).await.unwrap();

        assert!(first.timestamp < second.timestamp);
        assert!(second.timestamp < third.timestamp);
        assert_ne!(first.id, second.id);

        let listed = store.list().await.unwrap();
        let tokens: Vec<u64> = listed.iter().map(|e| e.timestamp).collect();
        let mut sorted = tokens.clone();
        sorted.sort_unstable();
        assert_eq!(tokens, sorted);
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_not_found() {
        let store = MemoryLogStore::new();
        let err = store.delete("missing").await.unwrap_err();
        assert!(matches!(err, RelayError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_removes_entry_and_keeps_order() {
        let store = MemoryLogStore::new();
        let first = store.create(EntryDraft::user("one")).await.unwrap();
        let second = store.create(EntryDraft::assistant("two")).await.unwrap();

        store.delete(&first.id).await.unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[0].sender, Sender::Ai);
    }

    #[tokio::test]
    async fn test_feed_delivers_snapshot_per_change() {
        let store = MemoryLogStore::new();
        let mut feed = store.subscribe();

        store.create(EntryDraft::user("hello")).await.unwrap();
        let snapshot = feed.recv().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].text, "hello");

        let second = store.create(EntryDraft::assistant("hi")).await.unwrap();
        let snapshot = feed.recv().await.unwrap();
        assert_eq!(snapshot.len(), 2);

        store.delete(&second.id).await.unwrap();
        let snapshot = feed.recv().await.unwrap();
        assert_eq!(snapshot.len(), 1);
    }
}

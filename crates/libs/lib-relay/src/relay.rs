//! # Relay
//!
//! The sole authority for turning a user utterance into a persisted, ordered
//! exchange in the shared conversation log, enforcing the per-session request
//! quota.
//!
//! One `send` walks: quota check, append the user entry, write the counter
//! through, call the gateway, append the assistant reply (or the fixed
//! fallback entry on any gateway failure). The session lock is held for the
//! whole exchange, so concurrent `send` calls queue up instead of
//! interleaving their user/assistant pairs.

use std::sync::Arc;

use shared::dto::chat::{ChatEntry, EntryDraft};
use tokio::sync::Mutex;

use crate::config::{HistoryMode, RelayConfig};
use crate::error::Result;
use crate::gateway::AssistantGateway;
use crate::session::{QuotaStore, SessionSnapshot, SessionState};
use crate::store::{ChangeFeed, LogStore};

/// Onboarding entry seeded into the log at session start.
pub const WELCOME_TEXT: &str = "Hello! I am your University Tuition Assistant. How can I help you today?\n\n\
    You can ask me to:\n\
    • Check tuition balance (e.g., 'Check my tuition for student 2023001')\n\
    • Pay tuition (e.g., 'Pay 1000 for term 2025-SUMMER, student 2023001')\n\
    • View unpaid tuitions (e.g., 'Show unpaid tuitions for 2025-SUMMER')";

/// Assistant entry appended when the gateway call fails.
pub const FALLBACK_TEXT: &str =
    "I'm sorry, I am unable to process your request right now. Please try again later.";

/// Assistant entry appended when a send is attempted at quota.
pub fn rate_limit_notice(max_requests: u32) -> String {
    format!(
        "You have reached the maximum limit of {} requests per session. \
         Please start a new session to continue.",
        max_requests
    )
}

/// What a `send` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Input was empty after trimming; nothing happened.
    Ignored,
    /// Session is at quota; only the rate-limit notice was appended.
    Blocked,
    /// User entry and assistant reply were both persisted.
    Answered,
    /// User entry was persisted; the gateway failed and the fixed fallback
    /// entry was appended in place of a reply.
    Fallback,
}

/// Orchestrates the shared log, the assistant gateway, and the session quota.
pub struct Relay {
    store: Arc<dyn LogStore>,
    gateway: Arc<dyn AssistantGateway>,
    quota: Arc<dyn QuotaStore>,
    session: Mutex<SessionState>,
    config: RelayConfig,
}

impl Relay {
    /// Build a relay, restoring the request counter from the quota store.
    /// A counter that fails to load starts the session at zero; quota
    /// storage problems never prevent the chat from coming up.
    pub fn new(
        store: Arc<dyn LogStore>,
        gateway: Arc<dyn AssistantGateway>,
        quota: Arc<dyn QuotaStore>,
        config: RelayConfig,
    ) -> Self {
        let request_count = quota.load().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "Failed to restore request counter, starting at 0");
            0
        });
        let session = SessionState::restore(request_count, config.max_requests);
        if session.blocked {
            tracing::info!(request_count, "Session restored already at quota");
        }
        Self {
            store,
            gateway,
            quota,
            session: Mutex::new(session),
            config,
        }
    }

    /// Startup behavior for the conversation log, per the configured
    /// [`HistoryMode`]: purge and re-seed, or keep history and only seed an
    /// empty log.
    pub async fn init(&self) -> Result<()> {
        match self.config.history {
            HistoryMode::Ephemeral => self.reset().await,
            HistoryMode::Persistent => {
                if self.store.list().await?.is_empty() {
                    self.store.create(EntryDraft::assistant(WELCOME_TEXT)).await?;
                }
                Ok(())
            }
        }
    }

    /// Delete every entry in the shared log, then seed the welcome entry.
    ///
    /// Deletions are independent best-effort operations: one entry failing
    /// to delete is logged and does not abort the rest. Safe to call on an
    /// already-empty log.
    pub async fn reset(&self) -> Result<()> {
        let entries = self.store.list().await?;
        let total = entries.len();
        for entry in entries {
            if let Err(err) = self.store.delete(&entry.id).await {
                tracing::error!(entry_id = %entry.id, error = %err, "Failed to delete entry during reset");
            }
        }
        tracing::debug!(purged = total, "Conversation log reset");
        self.store.create(EntryDraft::assistant(WELCOME_TEXT)).await?;
        Ok(())
    }

    /// Turn a user utterance into a persisted exchange.
    ///
    /// The user entry becomes visible to all subscribers before the gateway
    /// call resolves; views render an in-progress indicator for that
    /// interval. Gateway failures are converted into a visible fallback
    /// entry and never propagate out of this call.
    pub async fn send(&self, text: &str) -> Result<SendOutcome> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(SendOutcome::Ignored);
        }

        // Held for the whole exchange; concurrent sends queue here.
        let mut session = self.session.lock().await;

        if session.at_quota(self.config.max_requests) {
            session.blocked = true;
            tracing::info!(
                request_count = session.request_count,
                "Send attempted at quota, appending rate-limit notice"
            );
            self.store
                .create(EntryDraft::assistant(rate_limit_notice(self.config.max_requests)))
                .await?;
            return Ok(SendOutcome::Blocked);
        }

        self.store.create(EntryDraft::user(text)).await?;

        session.request_count += 1;
        if let Err(err) = self.quota.persist(session.request_count) {
            tracing::warn!(error = %err, "Failed to persist request counter");
        }

        match self.gateway.ask(text).await {
            Ok(reply) => {
                self.store.create(EntryDraft::assistant(reply)).await?;
                Ok(SendOutcome::Answered)
            }
            Err(err) => {
                tracing::error!(error = %err, "Assistant gateway call failed");
                self.store
                    .create(EntryDraft::assistant_error(FALLBACK_TEXT))
                    .await?;
                Ok(SendOutcome::Fallback)
            }
        }
    }

    /// Ordered-snapshot change feed. Dropping the receiver unregisters.
    pub fn subscribe(&self) -> ChangeFeed {
        self.store.subscribe()
    }

    /// Current ordered snapshot of the log.
    pub async fn entries(&self) -> Result<Vec<ChatEntry>> {
        self.store.list().await
    }

    /// Observable session state for views (remaining-request header,
    /// rate-limited badge, input gating).
    pub async fn session(&self) -> SessionSnapshot {
        let session = self.session.lock().await;
        SessionSnapshot {
            request_count: session.request_count,
            blocked: session.blocked,
            remaining: self.config.max_requests.saturating_sub(session.request_count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RelayError;
    use crate::session::MemoryQuotaStore;
    use crate::store::MemoryLogStore;
    use async_trait::async_trait;
    use shared::dto::chat::{Sender, ERROR_TIME_MARKER};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    enum StubMode {
        Reply(&'static str),
        Fail,
    }

    /// Scripted gateway: fixed reply or failure, optional latency, call count.
    struct StubGateway {
        mode: StubMode,
        delay: Option<Duration>,
        calls: AtomicUsize,
    }

    impl StubGateway {
        fn replying(reply: &'static str) -> Self {
            Self {
                mode: StubMode::Reply(reply),
                delay: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                mode: StubMode::Fail,
                delay: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn slow(reply: &'static str, delay: Duration) -> Self {
            Self {
                mode: StubMode::Reply(reply),
                delay: Some(delay),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AssistantGateway for StubGateway {
        async fn ask(&self, _message: &str) -> crate::error::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match &self.mode {
                StubMode::Reply(reply) => Ok(reply.to_string()),
                StubMode::Fail => Err(RelayError::Gateway("gateway unreachable".to_string())),
            }
        }
    }

    fn test_config(max_requests: u32) -> RelayConfig {
        RelayConfig {
            max_requests,
            ..RelayConfig::default()
        }
    }

    struct Harness {
        relay: Relay,
        store: Arc<MemoryLogStore>,
        gateway: Arc<StubGateway>,
        quota: Arc<MemoryQuotaStore>,
    }

    fn harness(gateway: StubGateway, config: RelayConfig) -> Harness {
        let store = Arc::new(MemoryLogStore::new());
        let gateway = Arc::new(gateway);
        let quota = Arc::new(MemoryQuotaStore::new());
        let relay = Relay::new(
            store.clone(),
            gateway.clone(),
            quota.clone(),
            config,
        );
        Harness {
            relay,
            store,
            gateway,
            quota,
        }
    }

    fn senders(entries: &[ChatEntry]) -> Vec<Sender> {
        entries.iter().map(|e| e.sender).collect()
    }

    #[tokio::test]
    async fn test_pairing_under_success() {
        let h = harness(StubGateway::replying("Balance: 1000"), test_config(15));

        let outcome = h.relay.send("Check my tuition").await.unwrap();
        assert_eq!(outcome, SendOutcome::Answered);

        let entries = h.store.list().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].sender, Sender::User);
        assert_eq!(entries[0].text, "Check my tuition");
        assert_eq!(entries[1].sender, Sender::Ai);
        assert_eq!(entries[1].text, "Balance: 1000");
        assert!(entries[0].timestamp < entries[1].timestamp);
    }

    #[tokio::test]
    async fn test_pairing_under_failure() {
        let h = harness(StubGateway::failing(), test_config(15));

        let outcome = h.relay.send("X").await.unwrap();
        assert_eq!(outcome, SendOutcome::Fallback);

        let entries = h.store.list().await.unwrap();
        assert_eq!(senders(&entries), vec![Sender::User, Sender::Ai]);
        assert_eq!(entries[1].text, FALLBACK_TEXT);
        assert_eq!(entries[1].time, ERROR_TIME_MARKER);
    }

    #[tokio::test]
    async fn test_empty_input_is_a_no_op() {
        let h = harness(StubGateway::replying("unused"), test_config(15));

        assert_eq!(h.relay.send("").await.unwrap(), SendOutcome::Ignored);
        assert_eq!(h.relay.send("   ").await.unwrap(), SendOutcome::Ignored);

        assert!(h.store.list().await.unwrap().is_empty());
        assert_eq!(h.relay.session().await.request_count, 0);
        assert_eq!(h.gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_quota_monotonicity() {
        let h = harness(StubGateway::replying("ok"), test_config(3));

        for n in 1..=3u32 {
            assert_eq!(h.relay.send("question").await.unwrap(), SendOutcome::Answered);
            assert_eq!(h.relay.session().await.request_count, n);
        }
        assert!(!h.relay.session().await.blocked);

        // Fourth attempt trips the quota
        assert_eq!(h.relay.send("question").await.unwrap(), SendOutcome::Blocked);
        let session = h.relay.session().await;
        assert!(session.blocked);
        assert_eq!(session.request_count, 3);
        assert_eq!(session.remaining, 0);
    }

    #[tokio::test]
    async fn test_blocked_short_circuit() {
        let quota = Arc::new(MemoryQuotaStore::new());
        quota.persist(15).unwrap();
        let store = Arc::new(MemoryLogStore::new());
        let gateway = Arc::new(StubGateway::replying("unused"));
        let relay = Relay::new(store.clone(), gateway.clone(), quota, test_config(15));

        assert!(relay.session().await.blocked);

        for _ in 0..2 {
            assert_eq!(relay.send("anything").await.unwrap(), SendOutcome::Blocked);
        }

        let entries = store.list().await.unwrap();
        // One notice per blocked call, never a user entry, gateway untouched
        assert_eq!(senders(&entries), vec![Sender::Ai, Sender::Ai]);
        assert_eq!(entries[0].text, rate_limit_notice(15));
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_counter_written_through_on_every_send() {
        let h = harness(StubGateway::replying("ok"), test_config(15));

        h.relay.send("one").await.unwrap();
        h.relay.send("two").await.unwrap();
        assert_eq!(h.quota.load().unwrap(), 2);

        // A relay rebuilt over the same quota scope resumes mid-session
        let resumed = Relay::new(
            h.store.clone(),
            h.gateway.clone(),
            h.quota.clone(),
            test_config(15),
        );
        assert_eq!(resumed.session().await.request_count, 2);
    }

    #[tokio::test]
    async fn test_reset_idempotence() {
        let h = harness(StubGateway::replying("unused"), test_config(15));

        h.relay.reset().await.unwrap();
        h.relay.reset().await.unwrap();

        let entries = h.store.list().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].sender, Sender::Ai);
        assert_eq!(entries[0].text, WELCOME_TEXT);
    }

    #[tokio::test]
    async fn test_reset_purges_existing_history() {
        let h = harness(StubGateway::replying("ok"), test_config(15));

        h.relay.send("one").await.unwrap();
        h.relay.send("two").await.unwrap();
        assert_eq!(h.store.list().await.unwrap().len(), 4);

        h.relay.reset().await.unwrap();

        let entries = h.store.list().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].text, WELCOME_TEXT);
    }

    #[tokio::test]
    async fn test_init_persistent_keeps_history() {
        let config = RelayConfig {
            history: HistoryMode::Persistent,
            ..test_config(15)
        };
        let h = harness(StubGateway::replying("ok"), config);

        // Empty log gets seeded
        h.relay.init().await.unwrap();
        assert_eq!(h.store.list().await.unwrap().len(), 1);

        h.relay.send("question").await.unwrap();

        // A second init leaves the conversation alone
        h.relay.init().await.unwrap();
        let entries = h.store.list().await.unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].text, WELCOME_TEXT);
    }

    #[tokio::test]
    async fn test_init_ephemeral_purges() {
        let h = harness(StubGateway::replying("ok"), test_config(15));

        h.relay.send("question").await.unwrap();
        h.relay.init().await.unwrap();

        let entries = h.store.list().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].text, WELCOME_TEXT);
    }

    #[tokio::test]
    async fn test_concurrent_sends_are_serialized() {
        let store = Arc::new(MemoryLogStore::new());
        let gateway = Arc::new(StubGateway::slow("reply", Duration::from_millis(20)));
        let quota = Arc::new(MemoryQuotaStore::new());
        let relay = Arc::new(Relay::new(
            store.clone(),
            gateway.clone(),
            quota,
            test_config(15),
        ));

        let first = {
            let relay = relay.clone();
            tokio::spawn(async move { relay.send("first").await })
        };
        let second = {
            let relay = relay.clone();
            tokio::spawn(async move { relay.send("second").await })
        };
        first.await.unwrap().unwrap();
        second.await.unwrap().unwrap();

        let entries = store.list().await.unwrap();
        // Each exchange completes before the next begins, so the pairs
        // never interleave regardless of which send won the lock.
        assert_eq!(
            senders(&entries),
            vec![Sender::User, Sender::Ai, Sender::User, Sender::Ai]
        );
        assert_eq!(entries[1].text, "reply");
        assert_eq!(entries[3].text, "reply");
        assert_ne!(entries[0].text, entries[2].text);
        assert_eq!(relay.session().await.request_count, 2);
    }

    #[tokio::test]
    async fn test_feed_observes_exchange_in_order() {
        let h = harness(StubGateway::replying("answer"), test_config(15));
        let mut feed = h.relay.subscribe();

        h.relay.send("question").await.unwrap();

        // First snapshot: user entry alone; second: the full pair
        let snapshot = feed.recv().await.unwrap();
        assert_eq!(senders(&snapshot), vec![Sender::User]);
        let snapshot = feed.recv().await.unwrap();
        assert_eq!(senders(&snapshot), vec![Sender::User, Sender::Ai]);
        assert!(snapshot[0].timestamp < snapshot[1].timestamp);
    }
}

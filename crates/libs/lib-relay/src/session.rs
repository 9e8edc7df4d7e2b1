//! # Session Quota
//!
//! Per-session request accounting for the relay. The session state is an
//! explicit value owned by the relay and passed through its operations, so
//! the quota rule is unit-testable without any ambient storage.
//!
//! The counter is restored once at startup from a [`QuotaStore`] and written
//! through on every non-blocked send, so a mid-session reload of the hosting
//! surface does not reset the quota. A fresh session scope (a new store, or a
//! new file path for [`FileQuotaStore`]) starts the count over.

use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::{RelayError, Result};

/// Per-session cap on user-initiated gateway calls.
pub const MAX_REQUESTS_PER_SESSION: u32 = 15;

/// Process-local session accounting, not persisted as part of the shared log.
///
/// Once `blocked` becomes true it stays true for the life of the session;
/// only a fresh session scope starts over.
#[derive(Debug, Clone, Copy)]
pub struct SessionState {
    pub request_count: u32,
    pub blocked: bool,
}

impl SessionState {
    /// Restore session state from a previously persisted count.
    pub fn restore(request_count: u32, max_requests: u32) -> Self {
        Self {
            request_count,
            blocked: request_count >= max_requests,
        }
    }

    /// Whether the session has reached its quota.
    pub fn at_quota(&self, max_requests: u32) -> bool {
        self.blocked || self.request_count >= max_requests
    }
}

/// Read-only snapshot of the session exposed to views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub request_count: u32,
    pub blocked: bool,
    pub remaining: u32,
}

/// Persistence seam for the session request counter.
///
/// The counter is stored as a string-encoded integer. `load` is called once
/// when the relay is constructed; `persist` on every non-blocked send.
pub trait QuotaStore: Send + Sync {
    fn load(&self) -> Result<u32>;
    fn persist(&self, count: u32) -> Result<()>;
}

/// Process-local quota store. The count lives for the life of the process,
/// which makes every launch a fresh session.
#[derive(Debug, Default)]
pub struct MemoryQuotaStore {
    count: Mutex<u32>,
}

impl MemoryQuotaStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl QuotaStore for MemoryQuotaStore {
    fn load(&self) -> Result<u32> {
        Ok(*self.count.lock().expect("quota lock poisoned"))
    }

    fn persist(&self, count: u32) -> Result<()> {
        *self.count.lock().expect("quota lock poisoned") = count;
        Ok(())
    }
}

/// File-backed quota store for hosts whose session scope outlives the
/// process (the file path defines the session scope).
#[derive(Debug)]
pub struct FileQuotaStore {
    path: PathBuf,
}

impl FileQuotaStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl QuotaStore for FileQuotaStore {
    fn load(&self) -> Result<u32> {
        if !self.path.exists() {
            return Ok(0);
        }
        let raw = std::fs::read_to_string(&self.path)?;
        raw.trim()
            .parse::<u32>()
            .map_err(|e| RelayError::Session(format!("invalid quota counter: {}", e)))
    }

    fn persist(&self, count: u32) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, count.to_string())?;
        Ok(())
    }
}

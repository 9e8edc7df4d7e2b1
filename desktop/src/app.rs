//! # Application State
//!
//! The egui application: a snapshot of the conversation shared with the
//! background change-feed task, plus the submit path that delegates to the
//! relay. The view never writes to the shared log directly.

use std::sync::Arc;

use lib_relay::{Relay, MAX_REQUESTS_PER_SESSION};
use parking_lot::RwLock;
use shared::dto::chat::ChatEntry;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::ui;

/// What the view renders each frame. Updated by the feed task and the
/// submit task; read (and its input edited) by the render loop.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub entries: Vec<ChatEntry>,
    pub input: String,
    /// A send is in flight: the user entry is visible but its assistant
    /// entry has not arrived yet.
    pub pending: bool,
    pub blocked: bool,
    pub remaining: u32,
    /// Startup problem worth showing above the conversation.
    pub notice: Option<String>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            input: String::new(),
            pending: false,
            blocked: false,
            remaining: MAX_REQUESTS_PER_SESSION,
            notice: None,
        }
    }
}

pub struct ChatApp {
    pub relay: Arc<Relay>,
    pub state: Arc<RwLock<ViewState>>,
    egui_ctx: egui::Context,
    feed_task: JoinHandle<()>,
}

impl ChatApp {
    pub fn new(cc: &eframe::CreationContext<'_>, relay: Arc<Relay>) -> Self {
        let state = Arc::new(RwLock::new(ViewState::default()));
        let egui_ctx = cc.egui_ctx.clone();

        let feed_task = tokio::spawn(feed_loop(
            relay.clone(),
            state.clone(),
            cc.egui_ctx.clone(),
        ));

        Self {
            relay,
            state,
            egui_ctx,
            feed_task,
        }
    }

    /// Hand the current input to the relay. The input is cleared and the
    /// in-progress indicator shown immediately; the entries themselves
    /// arrive through the change feed.
    pub fn submit(&self) {
        let text = {
            let mut state = self.state.write();
            if state.pending || state.blocked {
                return;
            }
            let text = state.input.trim().to_string();
            if text.is_empty() {
                return;
            }
            state.input.clear();
            state.pending = true;
            text
        };

        let relay = self.relay.clone();
        let state = self.state.clone();
        let ctx = self.egui_ctx.clone();
        tokio::spawn(async move {
            if let Err(err) = relay.send(&text).await {
                tracing::error!(error = %err, "Send failed");
            }
            let session = relay.session().await;
            {
                let mut state = state.write();
                state.pending = false;
                state.blocked = session.blocked;
                state.remaining = session.remaining;
            }
            ctx.request_repaint();
        });
    }
}

impl eframe::App for ChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui::chat::render(ui, self);
        });
    }
}

impl Drop for ChatApp {
    fn drop(&mut self) {
        // Tears down the feed receiver with the task; no dangling listeners.
        self.feed_task.abort();
    }
}

/// Background task: seed the session, run the startup history policy, then
/// mirror every ordered snapshot from the change feed into the view state.
async fn feed_loop(relay: Arc<Relay>, state: Arc<RwLock<ViewState>>, ctx: egui::Context) {
    // Subscribe before init so the purge and welcome entry are observed.
    let mut feed = relay.subscribe();

    if let Err(err) = relay.init().await {
        tracing::error!(error = %err, "Failed to initialize conversation log");
        state.write().notice = Some("Could not prepare the conversation log.".to_string());
    }

    let session = relay.session().await;
    {
        let mut state = state.write();
        state.blocked = session.blocked;
        state.remaining = session.remaining;
    }

    match relay.entries().await {
        Ok(entries) => state.write().entries = entries,
        Err(err) => tracing::error!(error = %err, "Failed to load initial entries"),
    }
    ctx.request_repaint();

    loop {
        match feed.recv().await {
            Ok(snapshot) => {
                state.write().entries = snapshot;
                ctx.request_repaint();
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Change feed lagged, reloading snapshot");
                if let Ok(entries) = relay.entries().await {
                    state.write().entries = entries;
                    ctx.request_repaint();
                }
            }
            Err(broadcast::error::RecvError::Closed) => {
                tracing::debug!("Change feed closed, stopping view updates");
                break;
            }
        }
    }
}

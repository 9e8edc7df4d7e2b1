//! # Tuition Assistant Desktop Client
//!
//! Thin entry point: loads configuration, wires the relay to its store and
//! gateway, and hands everything to the egui chat view.

mod app;
mod ui;

use std::sync::Arc;

use lib_relay::{
    FileQuotaStore, HttpGateway, MemoryLogStore, MemoryQuotaStore, QuotaStore, Relay, RelayConfig,
};

use app::ChatApp;

fn main() -> eframe::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // The relay and the change feed live on tokio; egui drives the frames.
    let runtime = tokio::runtime::Runtime::new().expect("failed to start tokio runtime");
    let _enter = runtime.enter();

    let config = RelayConfig::from_env().expect("invalid relay configuration");
    tracing::info!(gateway = %config.gateway_url, history = ?config.history, "Starting tuition assistant");

    let store = Arc::new(MemoryLogStore::new());
    let gateway = Arc::new(HttpGateway::new(&config).expect("failed to build gateway client"));

    // TUITION_SESSION_FILE extends the session scope beyond this process;
    // without it every launch is a fresh session.
    let quota: Arc<dyn QuotaStore> = match std::env::var("TUITION_SESSION_FILE") {
        Ok(path) => Arc::new(FileQuotaStore::new(path)),
        Err(_) => Arc::new(MemoryQuotaStore::new()),
    };

    let relay = Arc::new(Relay::new(store, gateway, quota, config));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([480.0, 680.0])
            .with_min_inner_size([360.0, 480.0])
            .with_title("Tuition Assistant"),
        ..Default::default()
    };

    eframe::run_native(
        "Tuition Assistant",
        options,
        Box::new(move |cc| Ok(Box::new(ChatApp::new(cc, relay)))),
    )
}

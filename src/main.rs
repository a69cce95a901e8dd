//! Codex - render markup documents into one live section tree and serve it.

mod actor;
mod cli;
mod config;
mod core;
mod document;
mod dom;
mod embed;
mod error;
mod logger;
mod render;
mod serve;
mod store;
mod treeify;
mod utils;

use actor::coordinator::{Coordinator, run_actors};
use actor::fs::FsWatcher;
use actor::messages::LiveMsg;
use actor::ws::{WsActor, start_ws_server};
use anyhow::{Context, Result};
use arc_swap::ArcSwap;
use clap::Parser;
use cli::Cli;
use config::{CodexConfig, ConfigError};
use render::{Pandoc, RenderPool};
use serve::ServeState;
use std::sync::Arc;
use std::time::Duration;
use store::CodexStore;
use tokio::sync::mpsc;

/// Queued messages for the live actor.
const LIVE_CHANNEL_CAPACITY: usize = 64;
/// Queued change batches from the watcher bridge.
const CHANGE_CHANNEL_CAPACITY: usize = 64;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();
    logger::set_verbose(cli.verbose);
    logger::set_color(cli.color_override());

    let config = CodexConfig::load(&cli)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(serve(config))
}

/// Build the page once, then serve it until Ctrl+C.
async fn serve(config: CodexConfig) -> Result<()> {
    let renderer = Pandoc::locate(&config.build.converter).map_err(|e| {
        ConfigError::Validation(format!(
            "converter `{}` not found: {e}",
            config.build.converter
        ))
    })?;
    let pool = RenderPool::new(Arc::new(renderer), config.build.jobs);
    debug!("build"; "{} with {} job(s)", pool.renderer_name(), pool.jobs());

    let mut store = CodexStore::assemble_skeleton(&config.inputs, pool)?;

    // Watcher first: changes made during the initial build are not lost
    let watcher = if config.serve.watch {
        Some(FsWatcher::new(&config.inputs)?)
    } else {
        None
    };

    let sections = store.build_all().await.context("initial build failed")?;
    log!("build"; "{} document(s), {} section(s)", config.inputs.len(), sections);

    let snapshot = Arc::new(ArcSwap::from_pointee(store.snapshot()));

    let (live_tx, live_rx) = mpsc::channel::<LiveMsg>(LIVE_CHANNEL_CAPACITY);
    let ws_port = start_ws_server(config.serve.interface, config.serve.ws_port, live_tx.clone())?;

    let (bound, shutdown_rx) = serve::bind_server(config.serve.interface, config.serve.port)?;
    log!("serve"; "http://{}", bound.addr());
    let server = bound.spawn(Arc::new(ServeState::new(Arc::clone(&snapshot), ws_port)))?;

    let coordinator = watcher.map(|watcher| {
        let (changes_tx, changes_rx) = mpsc::channel(CHANGE_CHANNEL_CAPACITY);
        // The bridge thread ends on its own once the coordinator drops the receiver
        let _bridge = watcher.spawn(changes_tx);
        log!("watch"; "watching {} file(s)", config.inputs.len());
        Coordinator::new(
            store,
            changes_rx,
            Duration::from_millis(config.build.debounce_ms),
            Arc::clone(&snapshot),
            live_tx.clone(),
        )
    });

    let result = run_actors(coordinator, WsActor::new(live_rx), live_tx, shutdown_rx).await;
    server.stop();
    result
}

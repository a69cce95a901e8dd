//! Rebuild Coordinator
//!
//! Owns the composite store for the lifetime of watch mode and turns
//! debounced file changes into incremental rebuilds:
//!
//! ```text
//! FsWatcher --paths--> Debouncer --ready--> rebuild task (owns store)
//!                                               |
//!                          ArcSwap snapshot <---+---> WsActor (Broadcast)
//! ```
//!
//! The store is moved into the one running rebuild task and moved back when
//! it finishes, so two rebuilds can never mutate it at the same time.

mod runtime;


use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow};
use arc_swap::ArcSwap;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};

use super::fs::{Debouncer, Phase};
use super::messages::LiveMsg;
use crate::error::{BuildError, WatchError};
use crate::logger::{status_error, status_success, status_unchanged};
use crate::store::CodexStore;

pub use runtime::run_actors;

/// Result of one rebuild task: the store handed back plus what happened.
type Pass = (CodexStore, PassOutcome);

#[derive(Default)]
struct PassOutcome {
    /// Rebuilt inputs with their section counts
    rebuilt: Vec<(PathBuf, usize)>,
    failed: Vec<(PathBuf, BuildError)>,
    unchanged: Vec<PathBuf>,
    /// Fresh page, present when anything was rebuilt
    snapshot: Option<String>,
}

/// Coordinator - debounces changes and serializes rebuilds.
pub struct Coordinator {
    store: Option<CodexStore>,
    changes: mpsc::Receiver<Vec<PathBuf>>,
    debouncer: Debouncer,
    snapshot: Arc<ArcSwap<String>>,
    live_tx: mpsc::Sender<LiveMsg>,
}

impl Coordinator {
    pub fn new(
        store: CodexStore,
        changes: mpsc::Receiver<Vec<PathBuf>>,
        debounce: Duration,
        snapshot: Arc<ArcSwap<String>>,
        live_tx: mpsc::Sender<LiveMsg>,
    ) -> Self {
        Self {
            store: Some(store),
            changes,
            debouncer: Debouncer::new(debounce),
            snapshot,
            live_tx,
        }
    }

    /// Run until the watcher goes away or a rebuild hits a fatal error.
    pub async fn run(mut self) -> Result<()> {
        let mut task: Option<JoinHandle<Pass>> = None;

        loop {
            let idle = task.is_none();
            let sleep = self.debouncer.sleep_duration();

            tokio::select! {
                joined = wait_rebuild(&mut task) => {
                    task = None;
                    let (store, outcome) = joined.map_err(|e| anyhow!("rebuild task failed: {e}"))?;
                    self.store = Some(store);
                    self.debouncer.finish_rebuild();
                    self.publish(outcome).await?;
                }
                changed = self.changes.recv() => {
                    let Some(paths) = changed else {
                        return Err(WatchError::Closed.into());
                    };
                    for path in paths {
                        crate::debug!("watch"; "changed: {}", path.display());
                        self.debouncer.add(path);
                    }
                }
                _ = tokio::time::sleep(sleep), if idle => {
                    if let Some(paths) = self.debouncer.take_if_ready() {
                        let store = self
                            .store
                            .take()
                            .ok_or_else(|| anyhow!("store missing while idle"))?;
                        crate::debug!("watch"; "rebuilding {} file(s)", paths.len());
                        task = Some(tokio::spawn(rebuild_pass(store, paths)));
                    }
                }
            }

            if self.debouncer.phase() == Phase::Pending && task.is_none() {
                crate::debug!("watch"; "pending: {} file(s)", self.debouncer.pending());
            }
        }
    }

    /// Report a finished pass and push the new page out.
    async fn publish(&mut self, outcome: PassOutcome) -> Result<()> {
        let PassOutcome {
            rebuilt,
            failed,
            unchanged,
            snapshot,
        } = outcome;

        if !failed.is_empty() {
            let summary = format!("failed: {}", join_names(failed.iter().map(|(p, _)| p)));
            let detail = failed
                .iter()
                .map(|(_, e)| e.to_string())
                .collect::<Vec<_>>()
                .join("\n");
            status_error(&summary, &detail);

            if let Some((_, fatal)) = failed.into_iter().find(|(_, e)| e.is_fatal()) {
                return Err(fatal.into());
            }
        } else if !rebuilt.is_empty() {
            let parts: Vec<String> = rebuilt
                .iter()
                .map(|(path, sections)| format!("{} ({sections} sections)", display_name(path)))
                .collect();
            status_success(&format!("rebuilt {}", parts.join(", ")));
        } else if !unchanged.is_empty() {
            status_unchanged(&format!("unchanged: {}", join_names(unchanged.iter())));
        }

        let Some(html) = snapshot else {
            return Ok(());
        };
        self.snapshot.store(Arc::new(html.clone()));
        if self.live_tx.send(LiveMsg::Broadcast(html)).await.is_err() {
            crate::debug!("watch"; "live actor stopped, snapshot not pushed");
        }
        Ok(())
    }
}

/// Await the running rebuild, or never resolve when there is none.
async fn wait_rebuild(task: &mut Option<JoinHandle<Pass>>) -> Result<Pass, JoinError> {
    match task {
        Some(handle) => handle.await,
        None => std::future::pending().await,
    }
}

/// Rebuild every changed input whose mtime moved past its last build.
async fn rebuild_pass(mut store: CodexStore, paths: Vec<PathBuf>) -> Pass {
    let mut outcome = PassOutcome::default();

    for path in paths {
        match store.needs_rebuild(&path) {
            Ok(true) => {}
            Ok(false) => {
                outcome.unchanged.push(path);
                continue;
            }
            Err(e) => {
                outcome.failed.push((path, e));
                continue;
            }
        }

        match store.patch(&path).await {
            Ok(sections) => outcome.rebuilt.push((path, sections)),
            Err(e) => outcome.failed.push((path, e)),
        }
    }

    if !outcome.rebuilt.is_empty() {
        outcome.snapshot = Some(store.snapshot());
    }
    (store, outcome)
}

fn display_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn join_names<'a>(paths: impl Iterator<Item = &'a PathBuf>) -> String {
    paths
        .map(|p| display_name(p))
        .collect::<Vec<_>>()
        .join(", ")
}

//! FileSystem watcher
//!
//! Watches the input documents and forwards changed inputs to the
//! coordinator. Implements the "Watcher-First" pattern for zero event loss:
//! the watcher is attached before the initial build and events buffer in
//! the notify channel until the bridge thread is started.
//!
//! Architecture:
//! ```text
//! notify --> bridge thread (classify + map to inputs) --> Coordinator (Debouncer)
//! ```

use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread::JoinHandle;
use std::time::Duration;

use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher};
use rustc_hash::FxHashMap;
use tokio::sync::mpsc;

use crate::config::input_key;
use crate::error::WatchError;

// Pure timing and deduplication.
mod debouncer;
// Watch root attach/re-attach lifecycle.
mod watch_roots;


pub use debouncer::{DEFAULT_DEBOUNCE_MS, Debouncer, Phase};
use watch_roots::WatchRoots;

/// How often the bridge re-checks roots while no events arrive.
const MAINTAIN_INTERVAL: Duration = Duration::from_millis(500);

/// File watcher over the input documents.
pub struct FsWatcher {
    /// Sync channel filled by notify
    notify_rx: Receiver<notify::Result<Event>>,
    /// Watcher handle (must be kept alive)
    watcher: RecommendedWatcher,
    watch_roots: WatchRoots,
    inputs: InputIndex,
}

impl FsWatcher {
    /// Attach the watcher immediately.
    ///
    /// Every input must exist; a missing one is a setup error.
    pub fn new(inputs: &[PathBuf]) -> Result<Self, WatchError> {
        let inputs = InputIndex::new(inputs)?;

        // Create sync channel for notify (it doesn't support async)
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })
        .map_err(|source| WatchError::Setup {
            path: inputs.first_root(),
            source,
        })?;

        let mut watch_roots = WatchRoots::new(inputs.roots());
        watch_roots.attach_all(&mut watcher)?;

        // Events are now buffering in notify_rx while the caller builds
        Ok(Self {
            notify_rx,
            watcher,
            watch_roots,
            inputs,
        })
    }

    /// Start the bridge thread.
    ///
    /// Each message is the list of inputs touched by one notify event. The
    /// thread exits once the receiver is dropped; dropping the sender is how
    /// the coordinator learns the watcher is gone.
    pub fn spawn(self, changes_tx: mpsc::Sender<Vec<PathBuf>>) -> JoinHandle<()> {
        std::thread::spawn(move || self.run(changes_tx))
    }

    fn run(mut self, changes_tx: mpsc::Sender<Vec<PathBuf>>) {
        loop {
            match self.notify_rx.recv_timeout(MAINTAIN_INTERVAL) {
                Ok(Ok(event)) => {
                    let changed = self.inputs.changed_inputs(&event);
                    if changed.is_empty() {
                        continue;
                    }
                    if changes_tx.blocking_send(changed).is_err() {
                        break; // Receiver dropped
                    }
                }
                Ok(Err(e)) => crate::log!("watch"; "notify error: {}", e),
                Err(RecvTimeoutError::Timeout) => {
                    if changes_tx.is_closed() {
                        break;
                    }
                    // Ensure watcher roots remain attached.
                    self.watch_roots.maintain(&mut self.watcher);
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        crate::debug!("watch"; "watcher bridge stopped");
    }
}

/// Paths of an event that may carry new content.
///
/// Metadata-only changes and removals never do. A rename counts only on the
/// destination side: that is how atomic-save editors replace a file.
pub(super) fn content_paths(event: &Event) -> &[PathBuf] {
    match event.kind {
        EventKind::Create(_)
        | EventKind::Modify(ModifyKind::Data(_))
        | EventKind::Modify(ModifyKind::Any)
        | EventKind::Modify(ModifyKind::Name(RenameMode::To)) => event.paths.as_slice(),
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => match event.paths.last() {
            Some(last) => std::slice::from_ref(last),
            None => &[],
        },
        _ => &[],
    }
}

/// Maps watcher event paths back to the input paths given on the command line.
pub(super) struct InputIndex {
    /// Canonical key -> input path as given
    by_key: FxHashMap<PathBuf, PathBuf>,
}

impl InputIndex {
    pub(super) fn new(inputs: &[PathBuf]) -> Result<Self, WatchError> {
        let mut by_key = FxHashMap::default();
        for input in inputs {
            let key = input_key(input).ok_or_else(|| WatchError::Setup {
                path: input.clone(),
                source: notify::Error::path_not_found().add_path(input.clone()),
            })?;
            if !key.exists() {
                return Err(WatchError::Setup {
                    path: input.clone(),
                    source: notify::Error::path_not_found().add_path(input.clone()),
                });
            }
            if let Some(first) = by_key.insert(key, input.clone()) {
                return Err(WatchError::Setup {
                    path: input.clone(),
                    source: notify::Error::generic(&format!(
                        "same file as `{}`",
                        first.display()
                    ))
                    .add_path(input.clone()),
                });
            }
        }
        Ok(Self { by_key })
    }

    /// Distinct directories to watch, sorted.
    pub(super) fn roots(&self) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = self
            .by_key
            .keys()
            .filter_map(|key| key.parent().map(Path::to_path_buf))
            .collect();
        roots.sort();
        roots.dedup();
        roots
    }

    fn first_root(&self) -> PathBuf {
        self.roots().into_iter().next().unwrap_or_default()
    }

    pub(super) fn resolve(&self, path: &Path) -> Option<&PathBuf> {
        match input_key(path) {
            Some(key) => self.by_key.get(&key),
            None => self.by_key.get(path),
        }
    }

    /// Inputs whose content an event may have changed, deduplicated.
    pub(super) fn changed_inputs(&self, event: &Event) -> Vec<PathBuf> {
        let mut changed: Vec<PathBuf> = Vec::new();
        for path in content_paths(event) {
            match self.resolve(path) {
                Some(input) if !changed.contains(input) => changed.push(input.clone()),
                Some(_) => {}
                None => crate::debug!("watch"; "ignored: {}", path.display()),
            }
        }
        changed
    }
}

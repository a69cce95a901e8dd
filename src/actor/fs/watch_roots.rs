use std::path::PathBuf;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use rustc_hash::FxHashSet;

use crate::error::WatchError;

/// Watch-root consistency manager.
///
/// Roots are the directories holding the inputs. Watching the directory
/// instead of the file keeps atomic saves (write temp, rename over) visible.
///
/// Responsibility:
/// - Attach every root at startup
/// - Re-attach roots that were removed and recreated
pub(super) struct WatchRoots {
    desired: Vec<PathBuf>,
    attached: FxHashSet<PathBuf>,
}

impl WatchRoots {
    pub(super) fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            desired: paths,
            attached: FxHashSet::default(),
        }
    }

    pub(super) fn attach_all(&mut self, watcher: &mut RecommendedWatcher) -> Result<(), WatchError> {
        for path in &self.desired {
            watcher
                .watch(path, RecursiveMode::NonRecursive)
                .map_err(|source| WatchError::Setup {
                    path: path.clone(),
                    source,
                })?;
            self.attached.insert(path.clone());
        }

        Ok(())
    }

    pub(super) fn maintain(&mut self, watcher: &mut RecommendedWatcher) {
        // Drop stale handles for roots that no longer exist.
        self.attached.retain(|path| path.exists());

        for path in &self.desired {
            if self.attached.contains(path) || !path.exists() {
                continue;
            }

            if watcher.watch(path, RecursiveMode::NonRecursive).is_ok() {
                self.attached.insert(path.clone());
                crate::debug!("watch"; "re-attached watch: {}", path.display());
            }
        }
    }

    #[cfg(test)]
    pub(super) fn attached_len(&self) -> usize {
        self.attached.len()
    }
}

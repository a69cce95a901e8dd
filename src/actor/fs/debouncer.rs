use std::path::PathBuf;
use std::time::{Duration, Instant};

use rustc_hash::FxHashSet;

pub const DEFAULT_DEBOUNCE_MS: u64 = 200;

/// Sleep used when nothing is pending; the select loop wakes on events anyway.
const IDLE_SLEEP: Duration = Duration::from_secs(86400);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Pending,
    Rebuilding,
}

/// Pure debouncer: timing and path deduplication only.
///
/// ```text
/// Idle --add--> Pending --window elapsed--> Rebuilding --finish--> Idle
///                                                     \--changes--> Pending (follow-up)
/// ```
///
/// Events that arrive while a rebuild runs are collected into the pending
/// set and released as one follow-up pass the moment the rebuild finishes.
pub struct Debouncer {
    window: Duration,
    pub(super) changes: FxHashSet<PathBuf>,
    pub(super) last_event: Option<Instant>,
    rebuilding: bool,
    follow_up: bool,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            changes: FxHashSet::default(),
            last_event: None,
            rebuilding: false,
            follow_up: false,
        }
    }

    pub fn phase(&self) -> Phase {
        if self.rebuilding {
            Phase::Rebuilding
        } else if self.changes.is_empty() {
            Phase::Idle
        } else {
            Phase::Pending
        }
    }

    pub fn pending(&self) -> usize {
        self.changes.len()
    }

    /// Record a changed input and restart the debounce window.
    pub fn add(&mut self, path: PathBuf) {
        self.changes.insert(path);
        self.last_event = Some(Instant::now());
    }

    pub fn is_ready(&self) -> bool {
        if self.rebuilding || self.changes.is_empty() {
            return false;
        }
        if self.follow_up {
            return true;
        }
        self.last_event
            .is_some_and(|last| last.elapsed() >= self.window)
    }

    /// Take the pending paths (sorted) and enter the rebuilding phase.
    pub fn take_if_ready(&mut self) -> Option<Vec<PathBuf>> {
        if !self.is_ready() {
            return None;
        }

        let mut paths: Vec<_> = self.changes.drain().collect();
        paths.sort();
        self.last_event = None;
        self.follow_up = false;
        self.rebuilding = true;
        Some(paths)
    }

    /// Leave the rebuilding phase. Paths collected meanwhile become
    /// immediately ready.
    pub fn finish_rebuild(&mut self) {
        self.rebuilding = false;
        self.follow_up = !self.changes.is_empty();
    }

    /// Precise sleep duration until the next possible ready time.
    pub fn sleep_duration(&self) -> Duration {
        if self.rebuilding || self.changes.is_empty() {
            return IDLE_SLEEP;
        }
        if self.follow_up {
            return Duration::from_millis(1);
        }

        let Some(last_event) = self.last_event else {
            return IDLE_SLEEP;
        };
        self.window
            .saturating_sub(last_event.elapsed())
            .max(Duration::from_millis(1))
    }
}

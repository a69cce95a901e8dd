//! Terminal output.
//!
//! - `log!` / `debug!` print one line behind a colored `[module]` tag;
//!   `debug!` only when `--verbose` is set.
//! - [`RebuildStatus`] is the watch-mode status block. Each report replaces
//!   the previous one in place, so the terminal always shows the outcome of
//!   the latest rebuild pass.
//!
//! ```ignore
//! log!("serve"; "http://{}", addr);
//! debug!("watch"; "changed: {}", path.display());
//! status_success("rebuilt notes.md (12 sections)");
//! ```

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::OwoColorize;
use parking_lot::{Mutex, const_mutex};
use std::{
    io::{Write, stdout},
    sync::atomic::{AtomicBool, Ordering},
};

use crate::utils::date::DateTimeUtc;

static VERBOSE: AtomicBool = AtomicBool::new(false);

static REBUILD_STATUS: Mutex<RebuildStatus> = const_mutex(RebuildStatus::new());

pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

/// Force colors on or off; `None` follows terminal detection.
pub fn set_color(enabled: Option<bool>) {
    match enabled {
        Some(on) => owo_colors::set_override(on),
        None => owo_colors::unset_override(),
    }
}

/// `log!("module"; "format {}", args)`
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Like `log!`, but silent unless `--verbose`.
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

pub fn log(module: &str, message: &str) {
    let line = format!("{} {message}", tag(module));

    let mut out = stdout().lock();
    execute!(out, Clear(ClearType::UntilNewLine)).ok();
    writeln!(out, "{line}").ok();
    out.flush().ok();
}

fn tag(module: &str) -> String {
    let tag = format!("[{module}]");
    match module.to_ascii_lowercase().as_str() {
        "serve" => tag.bright_blue().bold().to_string(),
        "watch" => tag.bright_green().bold().to_string(),
        "ws" => tag.bright_cyan().bold().to_string(),
        "error" => tag.bright_red().bold().to_string(),
        _ => tag.bright_yellow().bold().to_string(),
    }
}

// ============================================================================
// Rebuild status
// ============================================================================

/// Outcome of one rebuild pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Rebuilt,
    Unchanged,
    Failed,
}

impl Outcome {
    fn marker(self) -> Option<String> {
        match self {
            Self::Rebuilt => Some("✓".green().to_string()),
            Self::Failed => Some("✗".red().to_string()),
            Self::Unchanged => None,
        }
    }
}

/// Rewritable status block for watch mode.
pub struct RebuildStatus {
    /// Height of the block currently on screen
    shown: usize,
}

impl RebuildStatus {
    pub const fn new() -> Self {
        Self { shown: 0 }
    }

    fn report(&mut self, outcome: Outcome, message: &str) {
        let clock = format!("[{}]", DateTimeUtc::now().clock()).dimmed().to_string();
        let body = match outcome {
            Outcome::Unchanged => message.dimmed().to_string(),
            _ => message.to_owned(),
        };
        let block = match outcome.marker() {
            Some(marker) => format!("{clock} {marker} {body}"),
            None => format!("{clock} {body}"),
        };

        let mut out = stdout().lock();
        if let Ok(up) = u16::try_from(self.shown)
            && up > 0
        {
            execute!(out, cursor::MoveUp(up), Clear(ClearType::FromCursorDown)).ok();
        }
        writeln!(out, "{block}").ok();
        out.flush().ok();

        self.shown = height(message);
    }
}

impl Default for RebuildStatus {
    fn default() -> Self {
        Self::new()
    }
}

/// Terminal rows a message occupies.
fn height(message: &str) -> usize {
    message.lines().count().max(1)
}

/// Show a pass that rebuilt at least one document.
pub fn status_success(message: &str) {
    REBUILD_STATUS.lock().report(Outcome::Rebuilt, message);
}

/// Show a pass where no input had actually changed.
pub fn status_unchanged(message: &str) {
    REBUILD_STATUS.lock().report(Outcome::Unchanged, message);
}

/// Show a failed pass; `detail` (converter stderr) goes below the summary.
pub fn status_error(summary: &str, detail: &str) {
    let message = if detail.trim().is_empty() {
        summary.to_owned()
    } else {
        format!("{summary}\n{}", detail.trim_end())
    };
    REBUILD_STATUS.lock().report(Outcome::Failed, &message);
}

//! `[build]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [build]
//! converter = "pandoc"        # Looked up on PATH, invoked as `<converter> -t html <file>`
//! jobs = 2                    # Conversions running at once
//! debounce_ms = 200           # Quiet period before a rebuild starts
//! ```

use serde::Deserialize;

use crate::actor::fs::DEFAULT_DEBOUNCE_MS;

/// Conversion settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Converter executable name or path.
    pub converter: String,

    /// Maximum concurrent converter processes (at least 1).
    pub jobs: usize,

    /// Debounce window for file changes, in milliseconds.
    pub debounce_ms: u64,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            converter: "pandoc".to_string(),
            jobs: 2,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

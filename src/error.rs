//! Typed errors for the build and serve pipeline.
//!
//! Startup code wraps these in `anyhow` at the application edge; the watch
//! loop inspects them to decide between "log and keep serving" and "abort".

use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn one source file into rendered HTML.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("failed to run `{tool}` on `{path}`")]
    Spawn {
        tool: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("converter failed on `{path}`: {stderr}")]
    Failed { path: PathBuf, stderr: String },

    #[error("converter output for `{path}` is not valid UTF-8")]
    Encoding {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("cannot stat `{path}`")]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("render pool closed")]
    PoolClosed,

    #[error("render task for `{path}` panicked")]
    Join { path: PathBuf },
}

/// Tree builder invariant violations.
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("heading-like element <{tag}> has no rank")]
    UnknownRank { tag: String },
}

/// Any failure while producing a document fragment.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Convert(#[from] ConvertError),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error("no document registered for `{0}`")]
    UnknownDocument(PathBuf),

    #[error("input `{0}` given more than once")]
    DuplicateInput(PathBuf),

    #[error("page template has no <main> element")]
    Template,
}

impl BuildError {
    /// Invariant violations abort the process even during incremental rebuilds.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Tree(_) | Self::Template)
    }
}

/// File watching failures; both are fatal.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("cannot watch `{path}`")]
    Setup {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    #[error("file watcher channel closed")]
    Closed,
}

/// Failure to deliver a message to one live client.
#[derive(Debug, Error)]
#[error("live client {client}: {source}")]
pub struct TransportError {
    pub client: String,
    #[source]
    pub source: tungstenite::Error,
}

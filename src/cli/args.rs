//! Command-line interface definitions.

use clap::{ColorChoice, Parser};
use std::net::IpAddr;
use std::path::PathBuf;

/// Render markup documents into one live outline and serve it
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Documents to render, shown in the given order
    #[arg(value_name = "PATH", value_hint = clap::ValueHint::FilePath)]
    pub paths: Vec<PathBuf>,

    /// Control colored output (auto, always, never)
    #[arg(long, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: codex.toml, searched upward from cwd)
    #[arg(short = 'C', long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
    #[arg(short, long)]
    pub interface: Option<IpAddr>,

    /// HTTP port number
    #[arg(short, long)]
    pub port: Option<u16>,

    /// First WebSocket port to try for live updates
    #[arg(long)]
    pub ws_port: Option<u16>,

    /// Maximum concurrent converter processes
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Converter executable (must accept `-t html <file>`)
    #[arg(long, value_hint = clap::ValueHint::CommandName)]
    pub converter: Option<String>,

    /// Debounce window for file changes, in milliseconds
    #[arg(short, long, value_name = "MS")]
    pub debounce: Option<u64>,

    /// Rebuild and push updates when inputs change
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub watch: Option<bool>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

impl Cli {
    /// `--color` as an override for the logger; `None` means auto-detect.
    pub const fn color_override(&self) -> Option<bool> {
        match self.color {
            ColorChoice::Always => Some(true),
            ColorChoice::Never => Some(false),
            ColorChoice::Auto => None,
        }
    }
}

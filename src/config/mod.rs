//! Configuration management for `codex.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── build      # [build]
//! │   └── serve      # [serve]
//! ├── error          # ConfigError
//! ├── util           # Config file lookup
//! └── mod.rs         # CodexConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section    | Purpose                                        |
//! |------------|------------------------------------------------|
//! | `[build]`  | Converter, concurrency, debounce window        |
//! | `[serve]`  | Server (interface, ports, watch)               |
//!
//! Precedence: CLI flag > config file > built-in default. The file is
//! optional; without one every value comes from the defaults and flags.

mod error;
mod section;
mod util;

pub use error::ConfigError;
pub use section::{BuildConfig, ServeConfig};

use crate::cli::Cli;
use rustc_hash::FxHashSet;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
pub use util::input_key;
use util::find_config_file;

/// Default config file name, searched upward from the working directory.
pub const CONFIG_FILE: &str = "codex.toml";

/// Root configuration structure representing codex.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CodexConfig {
    /// Config file the values were read from (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Input documents in display order (from the command line)
    #[serde(skip)]
    pub inputs: Vec<PathBuf>,

    /// Server settings
    #[serde(default)]
    pub serve: ServeConfig,

    /// Conversion settings
    #[serde(default)]
    pub build: BuildConfig,
}

impl CodexConfig {
    /// Load configuration: config file (if any), then CLI overrides, then
    /// validation.
    ///
    /// An explicit `--config` must exist; the default file is optional.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let config_path = match &cli.config {
            Some(path) => Some(path.clone()),
            None => find_config_file(Path::new(CONFIG_FILE)),
        };

        let mut config = match &config_path {
            Some(path) => Self::from_path(path)?,
            None => Self::default(),
        };
        config.config_path = config_path;
        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Apply command-line options over file values.
    fn apply_cli(&mut self, cli: &Cli) {
        self.inputs = cli.paths.clone();

        Self::update_option(&mut self.serve.interface, cli.interface.as_ref());
        Self::update_option(&mut self.serve.port, cli.port.as_ref());
        Self::update_option(&mut self.serve.ws_port, cli.ws_port.as_ref());
        Self::update_option(&mut self.serve.watch, cli.watch.as_ref());
        Self::update_option(&mut self.build.jobs, cli.jobs.as_ref());
        Self::update_option(&mut self.build.converter, cli.converter.as_ref());
        Self::update_option(&mut self.build.debounce_ms, cli.debounce.as_ref());
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Check invariants that parsing alone cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.inputs.is_empty() {
            return Err(ConfigError::NoInputs);
        }

        // Inputs that do not resolve yet fall back to their spelling; the
        // skeleton reports them as missing.
        let mut seen = FxHashSet::default();
        for input in &self.inputs {
            let key = input_key(input).unwrap_or_else(|| input.clone());
            if !seen.insert(key) {
                return Err(ConfigError::Validation(format!(
                    "input `{}` given more than once",
                    input.display()
                )));
            }
        }

        if self.build.jobs == 0 {
            return Err(ConfigError::Validation(
                "[build] jobs must be at least 1".to_string(),
            ));
        }
        if self.build.converter.trim().is_empty() {
            return Err(ConfigError::Validation(
                "[build] converter must not be empty".to_string(),
            ));
        }
        if self.serve.port == self.serve.ws_port {
            return Err(ConfigError::Validation(format!(
                "[serve] port and ws_port are both {}",
                self.serve.port
            )));
        }

        Ok(())
    }
}

/// Parse a config snippet for section tests.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> CodexConfig {
    CodexConfig::from_str(content).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("codex").chain(args.iter().copied()))
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = CodexConfig::from_str("[serve]\nprot = 8000").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_unknown_section_rejected() {
        assert!(CodexConfig::from_str("[site]\ntitle = \"x\"").is_err());
    }

    #[test]
    fn test_cli_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "[serve]\nport = 3000\n[build]\njobs = 6\n").unwrap();

        let cli = cli(&["-C", path.to_str().unwrap(), "--port", "4000", "a.md"]);
        let config = CodexConfig::load(&cli).unwrap();

        assert_eq!(config.serve.port, 4000);
        assert_eq!(config.build.jobs, 6);
        assert_eq!(config.inputs, vec![PathBuf::from("a.md")]);
        assert_eq!(config.config_path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_explicit_missing_config_is_io_error() {
        let cli = cli(&["-C", "/nonexistent/codex/codex.toml", "a.md"]);
        assert!(matches!(CodexConfig::load(&cli), Err(ConfigError::Io(..))));
    }

    #[test]
    fn test_no_inputs() {
        let mut config = CodexConfig::default();
        assert!(matches!(config.validate(), Err(ConfigError::NoInputs)));

        config.inputs = vec![PathBuf::from("a.md")];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_jobs_rejected() {
        let mut config = CodexConfig::default();
        config.inputs = vec![PathBuf::from("a.md")];
        config.build.jobs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_duplicate_inputs_rejected() {
        let mut config = CodexConfig::default();
        config.inputs = vec![PathBuf::from("a.md"), PathBuf::from("a.md")];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_aliased_inputs_rejected() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("a.md"), "# A").unwrap();

        let mut config = CodexConfig::default();
        config.inputs = vec![dir.path().join("a.md"), dir.path().join("sub/../a.md")];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("sub/../a.md"));

        config.inputs[1] = dir.path().join("sub/a.md");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_port_clash_rejected() {
        let mut config = CodexConfig::default();
        config.inputs = vec![PathBuf::from("a.md")];
        config.serve.ws_port = config.serve.port;
        assert!(config.validate().is_err());

        config.serve.ws_port = config.serve.port + 1;
        assert!(config.validate().is_ok());
    }
}

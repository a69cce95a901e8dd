//! Pandoc-compatible subprocess renderer.

use super::Renderer;
use crate::error::ConvertError;
use crate::utils::exec::{Cmd, StderrFilter, failure_message};
use std::path::{Path, PathBuf};

/// Informational chatter pandoc prints on stderr for successful runs.
const PANDOC_FILTER: StderrFilter = StderrFilter::new(&["[INFO]"]);

/// Runs `<program> -t html <path>` and returns stdout.
#[derive(Debug, Clone)]
pub struct Pandoc {
    program: PathBuf,
    name: String,
}

impl Pandoc {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        let program = program.into();
        let name = program
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| program.display().to_string());
        Self { program, name }
    }

    /// Resolve `tool` on `PATH`.
    pub fn locate(tool: &str) -> Result<Self, which::Error> {
        which::which(tool).map(Self::new)
    }
}

impl Renderer for Pandoc {
    fn render(&self, path: &Path) -> Result<String, ConvertError> {
        let output = Cmd::new(&self.program)
            .args(["-t", "html"])
            .arg(path)
            .filter(&PANDOC_FILTER)
            .output()
            .map_err(|source| ConvertError::Spawn {
                tool: self.name.clone(),
                path: path.to_path_buf(),
                source,
            })?;

        if !output.status.success() {
            return Err(ConvertError::Failed {
                path: path.to_path_buf(),
                stderr: failure_message(&output),
            });
        }

        String::from_utf8(output.stdout).map_err(|source| ConvertError::Encoding {
            path: path.to_path_buf(),
            source,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

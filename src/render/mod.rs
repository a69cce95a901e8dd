//! Markup-to-HTML conversion.
//!
//! The build pipeline talks to a [`Renderer`] instead of spawning the
//! converter directly, so tests can swap in a fake that never forks.
//!
//! - [`Pandoc`] - production renderer (`<tool> -t html <path>`)
//! - [`RenderPool`] - bounds how many conversions run at once

mod pandoc;
mod pool;

#[cfg(test)]
pub mod fake;

pub use pandoc::Pandoc;
pub use pool::RenderPool;

use crate::error::ConvertError;
use std::path::Path;

/// Converts one source file to an HTML fragment.
///
/// Called from blocking worker threads; implementations may block.
pub trait Renderer: Send + Sync + 'static {
    fn render(&self, path: &Path) -> Result<String, ConvertError>;

    /// Short name for log lines.
    fn name(&self) -> &str;
}

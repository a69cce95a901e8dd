//! Configuration section definitions.

mod build;
mod serve;

pub use build::BuildConfig;
pub use serve::ServeConfig;

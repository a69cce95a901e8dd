//! Shared helpers for codex.

pub mod date;
pub mod exec;
pub mod hash;
pub mod html;
pub mod mime;

//! Actor System for Live Updates
//!
//! Message-passing concurrency for watch mode:
//!
//! ```text
//! FsWatcher --> Coordinator --> WsActor
//!  (notify)    (debounce +     (broadcast)
//!               rebuild)
//! ```
//!
//! # Module Structure
//!
//! - `messages` - Message types for the live actor
//! - `fs` - File system watcher with debouncing
//! - `coordinator` - Rebuild loop and actor runtime
//! - `ws` - WebSocket listener and broadcast
//!
//! The websocket actor runs whether or not watching is enabled; without a
//! coordinator it simply never receives a broadcast.

pub mod coordinator;
pub mod fs;
pub mod messages;
pub mod ws;

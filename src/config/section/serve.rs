//! `[serve]` section configuration.
//!
//! Contains server settings.
//!
//! # Example
//!
//! ```toml
//! [serve]
//! interface = "127.0.0.1"     # Network interface (127.0.0.1 = localhost only)
//! port = 5277                 # HTTP port number
//! ws_port = 35729             # WebSocket port for live updates
//! watch = true                # Rebuild on file changes
//! ```
//!
//! Use `interface = "0.0.0.0"` to make the server accessible from LAN.
//! Both ports move up to the next free one when taken.

use std::net::{IpAddr, Ipv4Addr};

use serde::Deserialize;

/// Default WebSocket port for live updates
const DEFAULT_WS_PORT: u16 = 35729;

/// Server settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServeConfig {
    /// Network interface to bind (HTTP and WebSocket).
    /// - `127.0.0.1` (default): localhost only
    /// - `0.0.0.0`: all interfaces (LAN accessible)
    pub interface: IpAddr,

    /// HTTP port number.
    pub port: u16,

    /// First WebSocket port to try.
    pub ws_port: u16,

    /// Enable file watcher for live updates.
    pub watch: bool,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 5277,
            ws_port: DEFAULT_WS_PORT,
            watch: true,
        }
    }
}

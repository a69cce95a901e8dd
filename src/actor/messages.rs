//! Actor Message Definitions
//!
//! ```text
//! FsWatcher --Vec<PathBuf>--> Coordinator --Broadcast--> WsActor <--Register-- listener
//! ```

use std::net::TcpStream;

/// Messages to the WebSocket actor
#[derive(Debug)]
pub enum LiveMsg {
    /// Raw connection from the listener thread; the actor does the handshake
    Register(TcpStream),
    /// Full composite HTML after a successful rebuild
    Broadcast(String),
    /// Close every client and stop
    Shutdown,
}

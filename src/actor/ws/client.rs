use std::net::TcpStream;
use std::time::Duration;

use tungstenite::WebSocket;
use tungstenite::protocol::Message;

/// Upper bound on one blocking handshake read or write to a client.
const IO_TIMEOUT: Duration = Duration::from_secs(5);

/// One push connection.
pub trait LiveClient {
    fn send(&mut self, msg: Message) -> Result<(), tungstenite::Error>;

    /// Label used in logs.
    fn describe(&self) -> String;

    fn close(&mut self) {}
}

impl LiveClient for WebSocket<TcpStream> {
    fn send(&mut self, msg: Message) -> Result<(), tungstenite::Error> {
        WebSocket::send(self, msg)
    }

    fn describe(&self) -> String {
        self.get_ref()
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| "unknown".to_string())
    }

    fn close(&mut self) {
        let _ = WebSocket::close(self, None);
        let _ = self.flush();
    }
}

/// Upgrade a raw connection. Failures are logged and the stream dropped.
pub(super) fn handshake(stream: TcpStream) -> Option<WebSocket<TcpStream>> {
    // A peer that connects and then stalls must not hold up the actor.
    let _ = stream.set_read_timeout(Some(IO_TIMEOUT));
    let _ = stream.set_write_timeout(Some(IO_TIMEOUT));
    match tungstenite::accept(stream) {
        Ok(ws) => Some(ws),
        Err(e) => {
            crate::log!("ws"; "handshake failed: {}", e);
            None
        }
    }
}

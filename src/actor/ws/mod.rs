//! WebSocket Actor - live client fan-out
//!
//! This actor is responsible for:
//! - Completing the handshake of connections accepted by the listener
//! - Broadcasting every rebuilt page to all connected clients
//! - Dropping clients whose connection failed
//!
//! # Architecture
//!
//! ```text
//! listener thread --[Register]--> WsActor --[full HTML]--> Clients
//! Coordinator ----[Broadcast]-->
//! ```
//!
//! The client list has a single owner (the actor task), so registration and
//! delivery never race.

mod client;
mod listener;


use std::net::TcpStream;

use tokio::sync::mpsc;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use super::messages::LiveMsg;
use crate::error::TransportError;

pub use client::LiveClient;
pub use listener::start_ws_server;

/// Registry of live clients.
pub struct Broadcaster<C> {
    clients: Vec<C>,
}

impl<C: LiveClient> Broadcaster<C> {
    pub fn new() -> Self {
        Self {
            clients: Vec::new(),
        }
    }

    pub fn register(&mut self, client: C) {
        crate::debug!("ws"; "client connected: {} (total: {})", client.describe(), self.clients.len() + 1);
        self.clients.push(client);
    }

    /// Send `html` to every client, removing the ones that fail.
    ///
    /// Returns the number of clients that received it.
    pub fn broadcast(&mut self, html: String) -> usize {
        if self.clients.is_empty() {
            crate::debug!("ws"; "no clients connected");
            return 0;
        }

        let msg = Message::text(html);
        self.clients.retain_mut(|client| match client.send(msg.clone()) {
            Ok(()) => true,
            Err(source) => {
                let err = TransportError {
                    client: client.describe(),
                    source,
                };
                crate::debug!("ws"; "dropping client: {}", err);
                false
            }
        });

        crate::debug!("ws"; "broadcast to {} clients", self.clients.len());
        self.clients.len()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn close_all(&mut self) {
        for mut client in self.clients.drain(..) {
            client.close();
        }
    }
}

impl<C: LiveClient> Default for Broadcaster<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// WebSocket Actor - owns the broadcaster
pub struct WsActor {
    rx: mpsc::Receiver<LiveMsg>,
    broadcaster: Broadcaster<WebSocket<TcpStream>>,
}

impl WsActor {
    pub fn new(rx: mpsc::Receiver<LiveMsg>) -> Self {
        Self {
            rx,
            broadcaster: Broadcaster::new(),
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            match msg {
                LiveMsg::Register(stream) => {
                    if let Some(ws) = client::handshake(stream) {
                        self.broadcaster.register(ws);
                    }
                }
                LiveMsg::Broadcast(html) => {
                    self.broadcaster.broadcast(html);
                }
                LiveMsg::Shutdown => {
                    crate::debug!("ws"; "shutting down");
                    break;
                }
            }
        }
        self.broadcaster.close_all();
    }
}

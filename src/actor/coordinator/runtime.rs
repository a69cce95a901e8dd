use std::time::Duration;

use anyhow::{Result, anyhow};
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use super::Coordinator;
use crate::actor::messages::LiveMsg;
use crate::actor::ws::WsActor;

const SHUTDOWN_POLL: Duration = Duration::from_millis(100);
const WS_DRAIN_TIMEOUT: Duration = Duration::from_millis(500);

/// Run the actors until Ctrl+C or until the coordinator stops.
///
/// Without a coordinator (watching disabled) only the live actor runs and
/// the page stays as first built. A coordinator error is returned after the
/// live clients were closed.
pub async fn run_actors(
    coordinator: Option<Coordinator>,
    ws: WsActor,
    live_tx: mpsc::Sender<LiveMsg>,
    shutdown_rx: Receiver<()>,
) -> Result<()> {
    let ws_handle = tokio::spawn(ws.run());
    let mut watch_handle = coordinator.map(|c| tokio::spawn(c.run()));

    let result = loop {
        if shutdown_rx.try_recv().is_ok() {
            crate::debug!("actor"; "shutdown signal received");
            break Ok(());
        }
        if let Some(handle) = watch_handle.as_mut()
            && handle.is_finished()
        {
            break match handle.await {
                Ok(result) => result,
                Err(e) => Err(anyhow!("watch task failed: {e}")),
            };
        }
        tokio::time::sleep(SHUTDOWN_POLL).await;
    };

    crate::debug!("actor"; "sending shutdown to ws");
    let _ = live_tx.send(LiveMsg::Shutdown).await;
    let _ = tokio::time::timeout(WS_DRAIN_TIMEOUT, ws_handle).await;

    result
}

//! HTTP server for the composite page and its static assets.
//!
//! | Route                  | Response                                  |
//! |------------------------|-------------------------------------------|
//! | `GET /`                | Current snapshot of the composite page    |
//! | `GET /static/codex.*`  | Embedded css / js (port filled in) / svg  |
//! | anything else          | 404                                       |
//!
//! Requests only read the `ArcSwap` snapshot, so they never wait on a
//! rebuild.

mod lifecycle;
mod response;

use crate::embed::{CODEX_CSS, CODEX_JS, CODEX_SVG, LiveVars};
use crate::utils::mime::types::{CSS, HTML, JAVASCRIPT, SVG};
use crate::{debug, log};
use anyhow::Result;
use arc_swap::ArcSwap;
use crossbeam::channel;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::thread::JoinHandle;
use tiny_http::{Method, Request, Server};

/// Worker threads answering requests.
const REQUEST_THREADS: usize = 4;

/// What the request loop shares with every handler.
pub struct ServeState {
    snapshot: Arc<ArcSwap<String>>,
    /// codex.js with the bound websocket port filled in
    codex_js: String,
}

impl ServeState {
    pub fn new(snapshot: Arc<ArcSwap<String>>, ws_port: u16) -> Self {
        Self {
            snapshot,
            codex_js: CODEX_JS.render(&LiveVars { ws_port }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Page,
    Css,
    Js,
    Svg,
    NotFound,
}

impl Route {
    fn resolve(method: &Method, url: &str) -> Self {
        if !matches!(method, Method::Get | Method::Head) {
            return Self::NotFound;
        }
        let path = url.split(['?', '#']).next().unwrap_or(url);
        match path {
            "/" => Self::Page,
            "/static/codex.css" => Self::Css,
            "/static/codex.js" => Self::Js,
            "/static/codex.svg" => Self::Svg,
            _ => Self::NotFound,
        }
    }
}

/// Bound server ready to accept requests
pub struct BoundServer {
    server: Arc<Server>,
    addr: SocketAddr,
}

/// Bind the HTTP server and register it for Ctrl+C.
///
/// Returns the receiver the actor runtime polls for shutdown.
pub fn bind_server(interface: IpAddr, port: u16) -> Result<(BoundServer, channel::Receiver<()>)> {
    let (server, addr) = lifecycle::bind_with_retry(interface, port)?;
    let server = Arc::new(server);

    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    lifecycle::register_server_for_shutdown(Arc::clone(&server), shutdown_tx);

    Ok((BoundServer { server, addr }, shutdown_rx))
}

impl BoundServer {
    /// Get the bound address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Start the request loop on its own thread.
    pub fn spawn(self, state: Arc<ServeState>) -> Result<RunningServer> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(REQUEST_THREADS)
            .thread_name(|i| format!("codex-http-{i}"))
            .build()?;

        let server = Arc::clone(&self.server);
        let handle = std::thread::spawn(move || run_request_loop(&server, &pool, &state));

        Ok(RunningServer {
            server: self.server,
            handle,
        })
    }
}

/// Request loop running in the background.
pub struct RunningServer {
    server: Arc<Server>,
    handle: JoinHandle<()>,
}

impl RunningServer {
    /// Unblock the request loop and wait for it to end.
    pub fn stop(self) {
        self.server.unblock();
        let _ = self.handle.join();
    }
}

fn run_request_loop(server: &Server, pool: &rayon::ThreadPool, state: &Arc<ServeState>) {
    for request in server.incoming_requests() {
        let state = Arc::clone(state);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &state) {
                log!("serve"; "request error: {e}");
            }
        });
    }
    debug!("serve"; "request loop stopped");
}

/// Handle a single HTTP request
fn handle_request(request: Request, state: &ServeState) -> Result<()> {
    // Early exit if shutdown requested
    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }

    let route = Route::resolve(request.method(), request.url());
    debug!("serve"; "{} {} -> {:?}", request.method(), request.url(), route);

    match route {
        Route::Page => {
            let page = state.snapshot.load();
            response::respond(request, HTML, page.as_bytes())
        }
        Route::Css => response::respond(request, CSS, CODEX_CSS.as_bytes()),
        Route::Js => response::respond(request, JAVASCRIPT, state.codex_js.as_bytes()),
        Route::Svg => response::respond(request, SVG, CODEX_SVG.as_bytes()),
        Route::NotFound => response::respond_not_found(request),
    }
}

//! Development server with live reload support.
//!
//! Serves the output root. HTML responses get the reload client script
//! injected before `</body>`; the script itself is served from memory.

mod content;
mod lifecycle;
mod path;
mod response;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};

use anyhow::{Context, Result};
use crossbeam::channel;
use tiny_http::{Request, Server};

use crate::actor::Coordinator;
use crate::config::KilnConfig;
use crate::embed::serve::HOTRELOAD_URL;
use crate::log;

/// Default WebSocket port for live reload
pub const DEFAULT_WS_PORT: u16 = 35729;

/// Number of request worker threads
const REQUEST_THREADS: usize = 4;

/// Actual WebSocket port (may differ from DEFAULT_WS_PORT if port was in use)
/// Updated by coordinator after WebSocket server binds successfully
static ACTUAL_WS_PORT: AtomicU16 = AtomicU16::new(DEFAULT_WS_PORT);

/// Update the actual WebSocket port (called by coordinator after binding)
pub fn set_actual_ws_port(port: u16) {
    ACTUAL_WS_PORT.store(port, Ordering::Relaxed);
}

fn actual_ws_port() -> u16 {
    ACTUAL_WS_PORT.load(Ordering::Relaxed)
}

/// Bound server ready to accept requests
pub struct BoundServer {
    server: Arc<Server>,
    serve_root: PathBuf,
    shutdown_rx: channel::Receiver<()>,
}

/// Bind the HTTP server and register it for Ctrl+C shutdown.
pub fn bind_server(config: &KilnConfig, serve_root: &Path) -> Result<BoundServer> {
    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);

    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    crate::core::register_server(Arc::clone(&server), shutdown_tx);

    log!("serve"; "http://{}", addr);

    Ok(BoundServer {
        server,
        serve_root: serve_root.to_path_buf(),
        shutdown_rx,
    })
}

impl BoundServer {
    /// Run the actor system in the background and the request loop here (blocking).
    pub fn run(self, coordinator: Coordinator) -> Result<()> {
        let actor_handle = lifecycle::spawn_actors(coordinator, self.shutdown_rx);
        run_request_loop(&self.server, &self.serve_root)?;
        lifecycle::wait_for_shutdown(actor_handle);
        Ok(())
    }
}

fn run_request_loop(server: &Server, serve_root: &Path) -> Result<()> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(REQUEST_THREADS)
        .build()
        .context("failed to create request thread pool")?;
    let serve_root = Arc::new(serve_root.to_path_buf());

    for request in server.incoming_requests() {
        let serve_root = Arc::clone(&serve_root);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &serve_root) {
                log!("serve"; "request error: {e}");
            }
        });
    }
    Ok(())
}

/// Handle a single HTTP request
fn handle_request(request: Request, serve_root: &Path) -> Result<()> {
    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }

    if path::strip_query(request.url()) == HOTRELOAD_URL {
        return response::respond_hotreload_js(request, actual_ws_port());
    }

    match path::resolve_path(request.url(), serve_root) {
        Some(file) => response::respond_file(request, &file),
        None => response::respond_not_found(request, serve_root),
    }
}

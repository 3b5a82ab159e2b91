//! Actor Coordinator - Wires up the Watch Actor System
//!
//! Started before the initial build: the watcher buffers changes made
//! while it runs, and the reload channel exists so the build can report
//! transform errors to browsers that connect later.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use super::dispatch::Dispatcher;
use super::fs::FsActor;
use super::messages::{DispatchMsg, WsMsg};
use super::ws::WsActor;
use crate::config::KilnConfig;
use crate::paths::PathTable;
use crate::reload::ReloadHandle;
use crate::task::{TaskContext, WatchTable};

const CHANNEL_BUFFER: usize = 32;

/// Coordinator - wires up and runs the actor system.
pub struct Coordinator {
    ctx: TaskContext,
    watch: Arc<WatchTable>,
    fs: FsActor,
    dispatch: (mpsc::Sender<DispatchMsg>, mpsc::Receiver<DispatchMsg>),
    ws: (mpsc::Sender<WsMsg>, mpsc::Receiver<WsMsg>),
}

impl Coordinator {
    /// Open the channels, start the WebSocket acceptor and the watcher.
    pub fn start(config: Arc<KilnConfig>, table: Arc<PathTable>) -> Result<Self> {
        let (dispatch_tx, dispatch_rx) = mpsc::channel::<DispatchMsg>(CHANNEL_BUFFER);
        let (ws_tx, ws_rx) = mpsc::channel::<WsMsg>(CHANNEL_BUFFER);

        match crate::reload::server::start_ws_server(
            config.serve.interface,
            config.serve.reload_port,
            ws_tx.clone(),
        ) {
            Ok(port) => {
                crate::debug!("reload"; "ws://{}:{}", config.serve.interface, port);
                crate::cli::serve::set_actual_ws_port(port);
            }
            Err(e) => crate::log!("reload"; "websocket server failed: {}", e),
        }

        let source = config.source_dir();
        let debounce = Duration::from_millis(config.watch.debounce_ms);
        let fs = FsActor::new(&source, debounce, dispatch_tx.clone())
            .with_context(|| format!("failed to watch {}", source.display()))?;

        let watch = Arc::new(WatchTable::standard(&table));
        let ctx = TaskContext::new(config, table, ReloadHandle::new(ws_tx.clone()));

        Ok(Self {
            ctx,
            watch,
            fs,
            dispatch: (dispatch_tx, dispatch_rx),
            ws: (ws_tx, ws_rx),
        })
    }

    /// Context the initial build runs with (reload channel attached).
    pub fn context(&self) -> &TaskContext {
        &self.ctx
    }

    /// Run the actor system until the shutdown signal fires.
    pub async fn run(self, shutdown_rx: Receiver<()>) {
        let Self {
            ctx,
            watch,
            fs,
            dispatch: (dispatch_tx, dispatch_rx),
            ws: (ws_tx, ws_rx),
        } = self;

        let dispatcher = Dispatcher::new(dispatch_rx, dispatch_tx.clone(), watch, ctx);
        let ws = WsActor::new(ws_rx);

        let fs_handle = tokio::spawn(fs.run());
        let dispatch_handle = tokio::spawn(dispatcher.run());
        let ws_handle = tokio::spawn(ws.run());
        crate::debug!("actor"; "start");

        loop {
            if shutdown_rx.try_recv().is_ok() || crate::core::is_shutdown() {
                crate::debug!("actor"; "shutdown signal received");
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        fs_handle.abort();
        let _ = dispatch_tx.send(DispatchMsg::Shutdown).await;
        let _ = ws_tx.send(WsMsg::Shutdown).await;

        let grace = Duration::from_millis(500);
        let _ = tokio::time::timeout(grace, dispatch_handle).await;
        let _ = tokio::time::timeout(grace, ws_handle).await;
        crate::debug!("actor"; "stopped");
    }
}

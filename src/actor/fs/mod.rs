//! FileSystem Actor
//!
//! Watches the source tree and sends debounced change batches to the
//! Dispatcher. The watcher is created before the initial build so changes
//! made during it are buffered, not lost.
//!
//! ```text
//! notify → Debouncer (pure timing) → DispatchMsg::Changed
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use super::messages::DispatchMsg;

mod debouncer;
mod types;

#[cfg(test)]
mod tests;

use debouncer::Debouncer;

/// FileSystem Actor - watches for file changes
pub struct FsActor {
    /// Channel to receive notify events (sync -> async bridge)
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Watcher handle (must be kept alive)
    _watcher: RecommendedWatcher,
    dispatch_tx: mpsc::Sender<DispatchMsg>,
    debouncer: Debouncer,
}

impl FsActor {
    /// Start watching `root` recursively. Events buffer until [`run`](Self::run).
    pub fn new(
        root: &Path,
        debounce: Duration,
        dispatch_tx: mpsc::Sender<DispatchMsg>,
    ) -> notify::Result<Self> {
        // notify has no async support
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();

        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;
        watcher.watch(root, RecursiveMode::Recursive)?;
        crate::debug!("watch"; "watching {}", root.display());

        Ok(Self {
            notify_rx,
            _watcher: watcher,
            dispatch_tx,
            debouncer: Debouncer::new(debounce),
        })
    }

    /// Run the actor event loop
    pub async fn run(self) {
        let Self {
            notify_rx,
            _watcher,
            dispatch_tx,
            mut debouncer,
        } = self;

        let (async_tx, mut async_rx) = mpsc::channel::<notify::Event>(64);

        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => crate::log!("watch"; "notify error: {}", e),
                }
            }
        });

        loop {
            tokio::select! {
                biased;
                Some(event) = async_rx.recv() => debouncer.add_event(&event),
                _ = tokio::time::sleep(debouncer.sleep_duration()) => {
                    let Some(changes) = debouncer.take_if_ready() else {
                        continue;
                    };
                    let mut paths: Vec<PathBuf> = changes.into_keys().collect();
                    paths.sort();
                    if dispatch_tx.send(DispatchMsg::Changed(paths)).await.is_err() {
                        break;
                    }
                }
            }
        }
    }
}

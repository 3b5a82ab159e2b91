//! Dispatcher - routes debounced changes to watch bindings.
//!
//! At most one run per binding at a time. A trigger that arrives while its
//! binding runs marks it pending; the finished run is followed by exactly
//! one more. Distinct bindings run concurrently on the blocking pool.
//!
//! ```text
//! Changed(paths) ─► WatchTable::triggered ─► BindingGate::request ─► spawn
//! Finished(id)   ─────────────────────────► BindingGate::finish  ─► respawn?
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use rustc_hash::FxHashMap;
use tokio::sync::mpsc;

use super::messages::DispatchMsg;
use crate::core::AssetClass;
use crate::task::{self, TaskContext, WatchTable};

/// Runs one binding's task sequence to completion (blocking).
pub type Runner = Arc<dyn Fn(AssetClass) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GateState {
    Running,
    /// Running, with another trigger since it started
    Pending,
}

/// Per-binding run state.
#[derive(Debug, Default)]
pub struct BindingGate {
    states: FxHashMap<AssetClass, GateState>,
}

impl BindingGate {
    /// Record a trigger. Returns `true` if the binding should start now.
    pub fn request(&mut self, id: AssetClass) -> bool {
        match self.states.get_mut(&id) {
            None => {
                self.states.insert(id, GateState::Running);
                true
            }
            Some(state) => {
                *state = GateState::Pending;
                false
            }
        }
    }

    /// Record a finished run. Returns `true` if the binding must run again.
    pub fn finish(&mut self, id: AssetClass) -> bool {
        match self.states.remove(&id) {
            Some(GateState::Pending) => {
                self.states.insert(id, GateState::Running);
                true
            }
            _ => false,
        }
    }

    #[cfg(test)]
    pub fn is_running(&self, id: AssetClass) -> bool {
        self.states.contains_key(&id)
    }
}

/// Dispatcher actor.
pub struct Dispatcher {
    rx: mpsc::Receiver<DispatchMsg>,
    /// Loopback for `Finished` notifications from runners
    tx: mpsc::Sender<DispatchMsg>,
    table: Arc<WatchTable>,
    runner: Runner,
    gate: BindingGate,
}

impl Dispatcher {
    /// Dispatcher running each binding's task tree against `ctx`.
    pub fn new(
        rx: mpsc::Receiver<DispatchMsg>,
        tx: mpsc::Sender<DispatchMsg>,
        table: Arc<WatchTable>,
        ctx: TaskContext,
    ) -> Self {
        let bindings = Arc::clone(&table);
        let runner: Runner = Arc::new(move |id| {
            if let Some(binding) = bindings.get(id) {
                run_binding(id, &binding.task, &ctx);
            }
        });
        Self::with_runner(rx, tx, table, runner)
    }

    pub fn with_runner(
        rx: mpsc::Receiver<DispatchMsg>,
        tx: mpsc::Sender<DispatchMsg>,
        table: Arc<WatchTable>,
        runner: Runner,
    ) -> Self {
        Self {
            rx,
            tx,
            table,
            runner,
            gate: BindingGate::default(),
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            match msg {
                DispatchMsg::Changed(paths) => self.on_changed(&paths),
                DispatchMsg::Finished(id) => {
                    if self.gate.finish(id) {
                        crate::debug!("watch"; "{} changed during run, rerunning", id);
                        self.spawn(id);
                    }
                }
                DispatchMsg::Shutdown => {
                    crate::debug!("watch"; "dispatcher shutting down");
                    break;
                }
            }
        }
    }

    fn on_changed(&mut self, paths: &[PathBuf]) {
        let triggered = self.table.triggered(paths);
        crate::debug!("watch"; "{} path(s) changed, triggered: {:?}", paths.len(), triggered);

        for id in triggered {
            if self.gate.request(id) {
                self.spawn(id);
            }
        }
    }

    fn spawn(&self, id: AssetClass) {
        let runner = Arc::clone(&self.runner);
        let tx = self.tx.clone();
        tokio::task::spawn_blocking(move || {
            runner(id);
            let _ = tx.blocking_send(DispatchMsg::Finished(id));
        });
    }
}

/// Run a binding's task tree. Fatal errors are logged; the binding stays installed.
fn run_binding(id: AssetClass, task: &task::Task, ctx: &TaskContext) {
    let start = Instant::now();
    crate::debug!(
        "watch";
        "{}: {}",
        id,
        task.steps().iter().map(ToString::to_string).collect::<Vec<_>>().join(" → ")
    );
    match task::run(task, ctx) {
        Ok(summary) => {
            crate::debug!(
                "watch";
                "{} done: {} file(s) in {:?}",
                id,
                summary.written,
                start.elapsed()
            );
        }
        Err(e) => {
            crate::logger::status_error(&format!("{id} failed"), &e.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::PathTable;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn test_gate_first_request_starts() {
        let mut gate = BindingGate::default();
        assert!(gate.request(AssetClass::Styles));
        assert!(gate.is_running(AssetClass::Styles));
        assert!(!gate.finish(AssetClass::Styles));
        assert!(!gate.is_running(AssetClass::Styles));
    }

    #[test]
    fn test_gate_coalesces_to_one_rerun() {
        let mut gate = BindingGate::default();
        assert!(gate.request(AssetClass::Scripts));
        assert!(!gate.request(AssetClass::Scripts));
        assert!(!gate.request(AssetClass::Scripts));

        assert!(gate.finish(AssetClass::Scripts));
        assert!(gate.is_running(AssetClass::Scripts));
        assert!(!gate.finish(AssetClass::Scripts));
    }

    #[test]
    fn test_gate_bindings_are_independent() {
        let mut gate = BindingGate::default();
        assert!(gate.request(AssetClass::Styles));
        assert!(gate.request(AssetClass::Pages));
        assert!(!gate.finish(AssetClass::Pages));
        assert!(gate.is_running(AssetClass::Styles));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_rapid_triggers_never_overlap() {
        let table = PathTable::new(Path::new("/p"), Path::new("src"), Path::new("public")).unwrap();
        let watch = Arc::new(WatchTable::standard(&table));

        let active = Arc::new(AtomicUsize::new(0));
        let max_active = Arc::new(AtomicUsize::new(0));
        let runs = Arc::new(AtomicUsize::new(0));

        let runner: Runner = {
            let (active, max_active, runs) = (active.clone(), max_active.clone(), runs.clone());
            Arc::new(move |_| {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                max_active.fetch_max(now, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(100));
                runs.fetch_add(1, Ordering::SeqCst);
                active.fetch_sub(1, Ordering::SeqCst);
            })
        };

        let (tx, rx) = mpsc::channel(32);
        let dispatcher = Dispatcher::with_runner(rx, tx.clone(), watch, runner);
        let handle = tokio::spawn(dispatcher.run());

        let changed = || DispatchMsg::Changed(vec![PathBuf::from("/p/src/assets/js/index.js")]);
        for _ in 0..3 {
            tx.send(changed()).await.unwrap();
        }

        tokio::time::sleep(Duration::from_millis(500)).await;
        tx.send(DispatchMsg::Shutdown).await.unwrap();
        handle.await.unwrap();

        assert_eq!(max_active.load(Ordering::SeqCst), 1);
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unrelated_path_runs_nothing() {
        let table = PathTable::new(Path::new("/p"), Path::new("src"), Path::new("public")).unwrap();
        let watch = Arc::new(WatchTable::standard(&table));
        let runs = Arc::new(AtomicUsize::new(0));
        let runner: Runner = {
            let runs = runs.clone();
            Arc::new(move |_| {
                runs.fetch_add(1, Ordering::SeqCst);
            })
        };

        let (tx, rx) = mpsc::channel(8);
        let handle = tokio::spawn(Dispatcher::with_runner(rx, tx.clone(), watch, runner).run());
        tx.send(DispatchMsg::Changed(vec![PathBuf::from("/p/README.md")]))
            .await
            .unwrap();
        tx.send(DispatchMsg::Shutdown).await.unwrap();
        handle.await.unwrap();

        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }
}

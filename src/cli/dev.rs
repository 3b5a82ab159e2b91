//! `kiln dev`: clean, build, then watch and serve with live reload.
//!
//! ```text
//! Coordinator::start (watcher + ws) ─► clean + build ─► set_watching
//!                                                          │
//!                        actor thread (tokio) ◄────────────┤
//!                        HTTP request loop (main) ◄────────┘
//! ```

use std::sync::Arc;

use anyhow::Result;

use super::build::build_all;
use super::serve;
use crate::actor::Coordinator;
use crate::config::KilnConfig;
use crate::paths::PathTable;

pub fn run(config: Arc<KilnConfig>, table: Arc<PathTable>) -> Result<()> {
    // The watcher starts first: edits during the initial build are replayed after it.
    let coordinator = Coordinator::start(Arc::clone(&config), Arc::clone(&table))?;

    build_all(coordinator.context())?;
    crate::core::set_watching();

    let bound = serve::bind_server(&config, table.output_root())?;
    bound.run(coordinator)
}

//! `kiln build`: clean and build everything once.

use std::time::Instant;

use anyhow::{Result, bail};

use crate::log;
use crate::task::{self, Summary, Task, TaskContext};

/// Run `clean` then the parallel build of every class.
///
/// Transform failures are reported per class; the build still completes,
/// but the command fails so scripted builds notice.
pub fn build_all(ctx: &TaskContext) -> Result<Summary> {
    let start = Instant::now();
    let summary = task::run(&Task::clean_build(), ctx)?;

    log!(
        "build";
        "{} file{} in {:.2?}",
        summary.written,
        if summary.written == 1 { "" } else { "s" },
        start.elapsed()
    );
    Ok(summary)
}

/// Entry point of the `build` command.
pub fn run(ctx: &TaskContext) -> Result<()> {
    let summary = build_all(ctx)?;
    if summary.failures > 0 {
        bail!(
            "{} file{} failed to build",
            summary.failures,
            if summary.failures == 1 { "" } else { "s" }
        );
    }
    Ok(())
}

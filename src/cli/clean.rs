//! `kiln clean`: delete the output directory.

use anyhow::Result;

use crate::log;
use crate::task::{self, Task, TaskContext};

pub fn run(ctx: &TaskContext) -> Result<()> {
    task::run(&Task::clean(), ctx)?;
    log!(
        "clean";
        "removed {}",
        ctx.config.root_relative(ctx.table.output_root()).display()
    );
    Ok(())
}

//! Verbatim copy of a class's sources.

use std::fs;

use rayon::prelude::*;

use super::{Outcome, collect, output_for};
use crate::core::AssetClass;
use crate::task::{StepReport, TaskContext, TaskError};

/// Copy every file matching the class's source pattern, preserving its
/// path relative to the pattern base.
pub fn run(ctx: &TaskContext, class: AssetClass) -> Result<StepReport, TaskError> {
    let root = ctx.table.root();
    let entry = ctx.table.get(class);
    let files = entry.source.collect(root);

    let outcomes: Vec<_> = files
        .par_iter()
        .map(|file| {
            let dest = output_for(entry, root, file);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent).map_err(TaskError::io(parent))?;
            }
            fs::copy(file, &dest).map_err(TaskError::io(file))?;
            Ok(Outcome::Written(1))
        })
        .collect();

    collect(outcomes)
}

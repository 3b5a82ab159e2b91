//! Output deletion.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::core::AssetClass;
use crate::task::{StepReport, TaskContext, TaskError};

/// Delete the whole output root.
pub fn all(ctx: &TaskContext) -> Result<StepReport, TaskError> {
    remove_dir(ctx.table.output_root())?;
    Ok(StepReport::default())
}

/// Delete one asset class's output directory.
pub fn class(ctx: &TaskContext, class: AssetClass) -> Result<StepReport, TaskError> {
    remove_dir(&ctx.table.get(class).output)?;
    Ok(StepReport::default())
}

/// Recursively delete `dir`. A missing directory is success.
pub fn remove_dir(dir: &Path) -> Result<(), TaskError> {
    match fs::remove_dir_all(dir) {
        Ok(()) => {
            crate::debug!("clean"; "removed {}", dir.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(TaskError::io(dir)(e)),
    }
}

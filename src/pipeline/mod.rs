//! Per-class processing steps.
//!
//! Each step reads its class's source pattern from the path table and
//! writes into the class's output directory:
//!
//! - `clean` - delete output directories (idempotent)
//! - `copy` - verbatim copy (images, fonts, videos, docs)
//! - `images` - raster conversion to WebP/AVIF
//! - `pages` - template rendering
//! - `styles` - Sass compile + CSS post-processing
//! - `scripts` - include bundling + transpile + minify
//!
//! Per-file work fans out on rayon. Transform failures are collected into
//! the step's report, filesystem failures abort the step.

pub mod clean;
pub mod copy;
pub mod images;
pub mod pages;
pub mod scripts;
pub mod styles;

use std::fs;
use std::path::{Path, PathBuf};

use crate::paths::PathEntry;
use crate::task::{StepReport, TaskError};

/// Result of processing one source file.
pub(crate) enum Outcome {
    Written(usize),
    Failed(TaskError),
}

/// Fold per-file outcomes into a report. The first fatal error wins.
pub(crate) fn collect(outcomes: Vec<Result<Outcome, TaskError>>) -> Result<StepReport, TaskError> {
    let mut report = StepReport::default();
    for outcome in outcomes {
        match outcome? {
            Outcome::Written(count) => report.wrote(count),
            Outcome::Failed(err) => report.fail(err),
        }
    }
    Ok(report)
}

/// Output path for `file`: its path relative to the pattern base, under the
/// entry's output directory.
pub(crate) fn output_for(entry: &PathEntry, root: &Path, file: &Path) -> PathBuf {
    match entry.source.relative_to_base(root, file) {
        Some(rel) => entry.output.join(rel),
        None => entry.output.join(file.file_name().unwrap_or_default()),
    }
}

/// Write `content`, creating parent directories.
pub(crate) fn write_file(path: &Path, content: impl AsRef<[u8]>) -> Result<(), TaskError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(TaskError::io(parent))?;
    }
    fs::write(path, content).map_err(TaskError::io(path))
}

/// Path shown in notifications: relative to the project root when possible.
pub(crate) fn display_path(root: &Path, file: &Path) -> PathBuf {
    file.strip_prefix(root).unwrap_or(file).to_path_buf()
}

/// Lexically normalize `.` and `..` components (the path need not exist).
pub(crate) fn normalize_lexical(path: &Path) -> PathBuf {
    use std::path::Component;

    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Relative path from directory `from` to `to` (both absolute, normalized).
pub(crate) fn relative_path(from: &Path, to: &Path) -> PathBuf {
    let from: Vec<_> = from.components().collect();
    let to: Vec<_> = to.components().collect();
    let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();

    let mut out = PathBuf::new();
    for _ in common..from.len() {
        out.push("..");
    }
    for component in &to[common..] {
        out.push(component);
    }
    out
}

/// `/`-separated form of a relative path, for URLs and source maps.
pub(crate) fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

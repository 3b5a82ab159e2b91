//! Task error types.
//!
//! Transform failures are recoverable: they are collected into a
//! [`StepReport`](super::StepReport), notified, and the task completes.
//! Filesystem failures abort the running sequence.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::AssetClass;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("{class}: failed to process `{}`: {message}", .file.display())]
    Transform {
        class: AssetClass,
        file: PathBuf,
        message: String,
    },

    #[error("IO error at `{}`", .0.display())]
    Io(PathBuf, #[source] io::Error),

    #[error("{0}")]
    Paths(#[from] crate::paths::PathError),
}

impl TaskError {
    pub fn transform(class: AssetClass, file: &Path, message: impl Into<String>) -> Self {
        Self::Transform {
            class,
            file: file.to_path_buf(),
            message: message.into(),
        }
    }

    /// Attach a path to an IO error.
    pub fn io(path: &Path) -> impl FnOnce(io::Error) -> Self + '_ {
        move |err| Self::Io(path.to_path_buf(), err)
    }

    /// Recoverable errors are reported without aborting the sequence.
    #[cfg(test)]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Transform { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_is_recoverable() {
        let err = TaskError::transform(AssetClass::Scripts, Path::new("index.js"), "unexpected token");
        assert!(err.is_recoverable());
        assert_eq!(
            err.to_string(),
            "scripts: failed to process `index.js`: unexpected token"
        );
    }

    #[test]
    fn test_io_is_fatal() {
        let err = TaskError::io(Path::new("/public"))(io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(!err.is_recoverable());
        assert!(err.to_string().contains("/public"));
    }
}

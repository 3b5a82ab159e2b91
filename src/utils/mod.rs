//! Shared utilities.
//!
//! - `exec` - external command builder with output filtering
//! - `mime` - Content-Type detection for the dev server
//! - `path` - filesystem path normalization

pub mod exec;
pub mod mime;
pub mod path;

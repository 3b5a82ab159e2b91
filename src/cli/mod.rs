//! Command-line interface module.

mod args;
pub mod build;
pub mod clean;
pub mod dev;
pub mod serve;

pub use args::{Cli, Commands, ServeArgs};

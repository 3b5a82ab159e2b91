//! Core types - pure abstractions shared across the codebase.

mod class;
mod state;

pub use class::AssetClass;
pub use state::{
    is_shutdown, is_watching, register_server, set_watching, setup_shutdown_handler,
};

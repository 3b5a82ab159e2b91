//! Configuration section definitions.
//!
//! Each section maps to a `[table]` in `kiln.toml`.

mod images;
mod pages;
mod paths;
mod scripts;
mod serve;
mod styles;
mod watch;

pub use images::{ImageFormat, ImagesConfig};
pub use pages::PagesConfig;
pub use paths::PathsConfig;
pub use scripts::ScriptsConfig;
pub use serve::ServeConfig;
pub use styles::StylesConfig;
pub use watch::WatchConfig;

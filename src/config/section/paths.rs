//! `[paths]` section configuration.
//!
//! Only the two roots are configurable; the layout below them is fixed.
//!
//! # Example
//!
//! ```toml
//! [paths]
//! source = "src"       # Source tree root
//! output = "public"    # Output tree root (deleted by `kiln clean`)
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Source and output roots.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Source tree root, relative to the project root.
    pub source: PathBuf,

    /// Output tree root, relative to the project root.
    pub output: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source: "src".into(),
            output: "public".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::config::test_parse_config;

    #[test]
    fn test_paths_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.paths.source, PathBuf::from("src"));
        assert_eq!(config.paths.output, PathBuf::from("public"));
    }

    #[test]
    fn test_paths_override() {
        let config = test_parse_config("[paths]\nsource = \"frontend\"\noutput = \"dist\"");
        assert_eq!(config.paths.source, PathBuf::from("frontend"));
        assert_eq!(config.paths.output, PathBuf::from("dist"));
    }
}

//! `[scripts]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [scripts]
//! target = "es5"       # Syntax level the bundle is lowered to
//! minify = true
//! source_map = true
//! ```

use serde::{Deserialize, Serialize};

/// Script bundling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptsConfig {
    /// Transpile target (e.g. `es5`, `es2015`, `chrome80`).
    ///
    /// oxc lowers arrow functions and ES2016+ syntax; ES2015 classes,
    /// block scoping, template literals and `for…of` are kept as written.
    pub target: String,

    /// Compress and mangle the bundle.
    pub minify: bool,

    /// Write a source map to the sibling `maps` directory.
    pub source_map: bool,
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            target: "es5".into(),
            minify: true,
            source_map: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    #[test]
    fn test_scripts_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.scripts.target, "es5");
        assert!(config.scripts.minify);
    }

    #[test]
    fn test_scripts_no_minify() {
        let config = test_parse_config("[scripts]\nminify = false\ntarget = \"es2020\"");
        assert!(!config.scripts.minify);
        assert_eq!(config.scripts.target, "es2020");
    }
}

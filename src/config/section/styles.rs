//! `[styles]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [styles]
//! command = ["sass"]          # Sass compiler command
//! browsers = ["> 0.1%"]       # Browserslist query for vendor prefixes
//! minify = true
//! source_map = true
//! ```

use serde::{Deserialize, Serialize};

/// Stylesheet compilation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StylesConfig {
    /// Sass compiler command and leading arguments.
    pub command: Vec<String>,

    /// Browserslist queries deciding which vendor prefixes are emitted.
    pub browsers: Vec<String>,

    /// Minify the compiled stylesheet.
    pub minify: bool,

    /// Write a source map to the sibling `maps` directory.
    pub source_map: bool,
}

impl Default for StylesConfig {
    fn default() -> Self {
        Self {
            command: vec!["sass".into()],
            browsers: vec!["> 0.1%".into()],
            minify: true,
            source_map: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    #[test]
    fn test_styles_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.styles.browsers, vec!["> 0.1%".to_string()]);
        assert!(config.styles.minify);
        assert!(config.styles.source_map);
    }

    #[test]
    fn test_styles_browsers_override() {
        let config = test_parse_config("[styles]\nbrowsers = [\"last 2 versions\", \"not dead\"]");
        assert_eq!(config.styles.browsers, vec!["last 2 versions", "not dead"]);
    }
}

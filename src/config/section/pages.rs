//! `[pages]` section configuration.
//!
//! Templates are rendered by an external command that reads the template on
//! stdin and writes markup to stdout.
//!
//! # Example
//!
//! ```toml
//! [pages]
//! command = ["npx", "pug"]    # Renderer command (default: ["pug"])
//! pretty = true               # Pretty-print rendered markup
//! ```

use serde::{Deserialize, Serialize};

/// Template rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PagesConfig {
    /// Renderer command and leading arguments.
    pub command: Vec<String>,

    /// Pretty-print rendered markup.
    pub pretty: bool,
}

impl Default for PagesConfig {
    fn default() -> Self {
        Self {
            command: vec!["pug".into()],
            pretty: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    #[test]
    fn test_pages_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.pages.command, vec!["pug".to_string()]);
        assert!(config.pages.pretty);
    }

    #[test]
    fn test_pages_npx_command() {
        let config = test_parse_config("[pages]\ncommand = [\"npx\", \"pug\"]\npretty = false");
        assert_eq!(config.pages.command, vec!["npx", "pug"]);
        assert!(!config.pages.pretty);
    }
}

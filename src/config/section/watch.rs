//! `[watch]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [watch]
//! debounce_ms = 300    # Quiet period before a batch of changes is dispatched
//! ```

use serde::{Deserialize, Serialize};

/// File watcher settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Quiet period in milliseconds before changes are dispatched.
    pub debounce_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { debounce_ms: 300 }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    #[test]
    fn test_watch_defaults() {
        assert_eq!(test_parse_config("").watch.debounce_ms, 300);
    }

    #[test]
    fn test_watch_override() {
        let config = test_parse_config("[watch]\ndebounce_ms = 50");
        assert_eq!(config.watch.debounce_ms, 50);
    }
}

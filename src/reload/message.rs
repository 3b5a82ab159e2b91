//! Live Reload Message Protocol
//!
//! Defines the JSON message format for WebSocket communication between
//! the development server and browser clients.
//!
//! # Message Types
//!
//! - `connected`: Sent once after the handshake
//! - `reload`: Trigger full page reload
//! - `error`: Show the transform error overlay
//! - `clear`: Remove the error overlay

use serde::{Deserialize, Serialize};

/// Live reload message sent over WebSocket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReloadMessage {
    /// Connection established
    Connected {
        /// Server version for compatibility check
        version: String,
    },

    /// Full page reload
    Reload {
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    /// Transform error (display overlay, no reload)
    Error { title: String, message: String },

    /// Clear error overlay (the failing class built cleanly again)
    Clear,
}

impl ReloadMessage {
    pub fn connected() -> Self {
        Self::Connected {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn reload(reason: impl Into<String>) -> Self {
        Self::Reload {
            reason: Some(reason.into()),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error {
            title: title.into(),
            message: message.into(),
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"reload"}"#.to_string())
    }

    /// Parse from JSON string
    #[cfg(test)]
    pub fn from_json(s: &str) -> Option<Self> {
        serde_json::from_str(s).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reload_serialization() {
        let json = ReloadMessage::reload("images").to_json();
        assert_eq!(json, r#"{"type":"reload","reason":"images"}"#);
    }

    #[test]
    fn test_reload_without_reason() {
        let json = ReloadMessage::Reload { reason: None }.to_json();
        assert_eq!(json, r#"{"type":"reload"}"#);
    }

    #[test]
    fn test_error_roundtrip() {
        let msg = ReloadMessage::error("JS", "Unexpected token (3:5)");
        let parsed = ReloadMessage::from_json(&msg.to_json()).unwrap();
        assert_eq!(parsed, msg);
    }

    #[test]
    fn test_clear_tag() {
        assert_eq!(ReloadMessage::Clear.to_json(), r#"{"type":"clear"}"#);
    }

    #[test]
    fn test_connected_carries_version() {
        let json = ReloadMessage::connected().to_json();
        assert!(json.contains(r#""type":"connected""#));
        assert!(json.contains(env!("CARGO_PKG_VERSION")));
    }
}

//! Reload Module
//!
//! Fire-and-forget live reload signalling to browser clients.
//!
//! ```text
//! task step --ReloadHandle--> WsActor --WebSocket--> Browser
//! ```
//!
//! # Modules
//!
//! - `message` - Reload message types (connected, reload, error, clear)
//! - `server` - WebSocket acceptor for client connections

pub mod message;
pub mod server;

use tokio::sync::mpsc;

use crate::actor::messages::WsMsg;

/// Sending side of the reload-notification channel.
///
/// Never blocks and never fails: with no server attached, or a full queue,
/// the signal is dropped.
#[derive(Debug, Clone, Default)]
pub struct ReloadHandle {
    tx: Option<mpsc::Sender<WsMsg>>,
}

impl ReloadHandle {
    pub fn new(tx: mpsc::Sender<WsMsg>) -> Self {
        Self { tx: Some(tx) }
    }

    /// Handle with no connected server (build and clean commands).
    pub fn disconnected() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn is_connected(&self) -> bool {
        self.tx.as_ref().is_some_and(|tx| !tx.is_closed())
    }

    /// Ask every connected browser to reload.
    pub fn reload(&self, reason: &str) {
        self.send(WsMsg::Reload {
            reason: reason.to_string(),
        });
    }

    /// Show an error overlay in connected browsers.
    pub fn error(&self, title: &str, message: &str) {
        self.send(WsMsg::Error {
            title: title.to_string(),
            message: message.to_string(),
        });
    }

    /// Remove the error overlay.
    pub fn clear_error(&self) {
        self.send(WsMsg::ClearError);
    }

    fn send(&self, msg: WsMsg) {
        if let Some(tx) = &self.tx
            && tx.try_send(msg).is_err()
        {
            crate::debug!("reload"; "signal dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disconnected_is_noop() {
        let handle = ReloadHandle::disconnected();
        assert!(!handle.is_connected());
        handle.reload("scripts");
        handle.error("JS", "boom");
    }

    #[test]
    fn test_signals_are_queued() {
        let (tx, mut rx) = mpsc::channel(4);
        let handle = ReloadHandle::new(tx);
        assert!(handle.is_connected());

        handle.reload("images");
        handle.clear_error();

        assert!(matches!(rx.try_recv(), Ok(WsMsg::Reload { reason }) if reason == "images"));
        assert!(matches!(rx.try_recv(), Ok(WsMsg::ClearError)));
    }

    #[test]
    fn test_full_queue_drops_signal() {
        let (tx, mut rx) = mpsc::channel(1);
        let handle = ReloadHandle::new(tx);

        handle.reload("first");
        handle.reload("second");

        assert!(matches!(rx.try_recv(), Ok(WsMsg::Reload { reason }) if reason == "first"));
        assert!(rx.try_recv().is_err());
    }
}

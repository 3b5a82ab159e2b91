//! WebSocket Actor - Live Reload Broadcast
//!
//! Owns the connected browser clients and broadcasts reload, error and
//! clear messages to all of them.
//!
//! ```text
//! ReloadHandle --[Reload/Error/Clear]--> WsActor --broadcast--> Clients
//! ```

mod client_io;
mod delivery;

use std::net::TcpStream;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use super::messages::WsMsg;
use crate::reload::message::ReloadMessage;

/// Last error shown, replayed to clients that connect while it is active.
#[derive(Debug, Clone)]
struct PendingError {
    title: String,
    message: String,
}

/// WebSocket Actor - manages client connections and broadcasts
pub struct WsActor {
    rx: mpsc::Receiver<WsMsg>,
    /// Connected clients (shared between broadcast and the reader thread)
    clients: Arc<Mutex<Vec<WebSocket<TcpStream>>>>,
    pending_error: Mutex<Option<PendingError>>,
}

impl WsActor {
    pub fn new(rx: mpsc::Receiver<WsMsg>) -> Self {
        Self {
            rx,
            clients: Arc::new(Mutex::new(Vec::new())),
            pending_error: Mutex::new(None),
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        let clients_for_reader = Arc::clone(&self.clients);
        std::thread::spawn(move || {
            Self::client_reader_loop(clients_for_reader);
        });

        while let Some(msg) = self.rx.recv().await {
            match msg {
                WsMsg::Reload { reason } => {
                    crate::debug!("ws"; "sending reload: {}", reason);
                    self.broadcast(&ReloadMessage::reload(reason));
                }

                WsMsg::Error { title, message } => {
                    *self.pending_error.lock() = Some(PendingError {
                        title: title.clone(),
                        message: message.clone(),
                    });
                    self.broadcast(&ReloadMessage::error(title, message));
                }

                WsMsg::ClearError => {
                    *self.pending_error.lock() = None;
                    self.broadcast(&ReloadMessage::Clear);
                }

                WsMsg::AddClient(stream) => self.add_client(stream),

                WsMsg::Shutdown => {
                    crate::debug!("ws"; "shutting down");
                    for mut client in self.clients.lock().drain(..) {
                        let _ = client.close(None);
                    }
                    break;
                }
            }
        }
    }

    fn text(msg: &ReloadMessage) -> Message {
        Message::Text(msg.to_json().into())
    }
}

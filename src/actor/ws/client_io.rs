use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use crate::reload::message::ReloadMessage;

use super::WsActor;

impl WsActor {
    /// Complete the handshake and register a new client.
    pub(super) fn add_client(&self, stream: TcpStream) {
        let mut ws = match tungstenite::accept(stream) {
            Ok(ws) => ws,
            Err(e) => {
                crate::log!("ws"; "handshake failed: {}", e);
                return;
            }
        };

        // Non-blocking after the handshake so the reader thread can poll
        let _ = ws.get_ref().set_nonblocking(true);

        if let Err(e) = ws.send(Self::text(&ReloadMessage::connected())) {
            crate::log!("ws"; "failed to send connected message: {}", e);
            return;
        }

        if let Some(err) = self.pending_error.lock().clone() {
            let msg = ReloadMessage::error(err.title, err.message);
            if let Err(e) = ws.send(Self::text(&msg)) {
                crate::log!("ws"; "failed to send pending error: {}", e);
            } else {
                crate::debug!("ws"; "sent pending error to new client");
            }
        }

        let mut clients = self.clients.lock();
        clients.push(ws);
        crate::debug!("ws"; "client connected (total: {})", clients.len());
    }

    /// Background thread dropping clients that closed their socket.
    pub(super) fn client_reader_loop(clients: Arc<Mutex<Vec<WebSocket<TcpStream>>>>) {
        while !crate::core::is_shutdown() {
            std::thread::sleep(Duration::from_millis(100));

            clients.lock().retain_mut(|ws| match ws.read() {
                Ok(Message::Close(_)) => false,
                Ok(_) => true,
                Err(tungstenite::Error::Io(ref e)) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    true
                }
                Err(_) => false,
            });
        }
    }
}

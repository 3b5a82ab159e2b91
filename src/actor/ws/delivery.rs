use crate::reload::message::ReloadMessage;

use super::WsActor;

impl WsActor {
    /// Broadcast a message to all connected clients, dropping dead ones.
    pub(super) fn broadcast(&self, msg: &ReloadMessage) {
        let mut clients = self.clients.lock();
        let count = clients.len();

        if count == 0 {
            crate::debug!("ws"; "no clients connected");
            return;
        }

        let frame = Self::text(msg);
        clients.retain_mut(|ws| match ws.send(frame.clone()) {
            Ok(()) => true,
            Err(e) => {
                crate::debug!("ws"; "client disconnected: {}", e);
                false
            }
        });
        crate::debug!("ws"; "broadcast to {} clients", count);
    }
}

use actix::Addr;
use uuid::Uuid;

use super::events::{SendToUser, SendToUsers};
use super::message::ServerMessage;
use super::server::WebSocketServer;

/// Fire-and-forget delivery of push frames. Offline users simply miss them.
pub trait EventPublisher: Send + Sync {
    fn send_to_user(&self, user_id: Uuid, message: ServerMessage);

    fn send_to_users(&self, user_ids: Vec<Uuid>, message: ServerMessage);
}

impl EventPublisher for Addr<WebSocketServer> {
    fn send_to_user(&self, user_id: Uuid, message: ServerMessage) {
        self.do_send(SendToUser { user_id, message });
    }

    fn send_to_users(&self, user_ids: Vec<Uuid>, message: ServerMessage) {
        if user_ids.is_empty() {
            return;
        }
        self.do_send(SendToUsers { user_ids, message });
    }
}

/// Push server actor
///
/// Owns every live session and the user → sessions index. All mutations run on
/// the actor's mailbox, so handlers never race each other.
use actix::prelude::*;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use super::events::*;
use super::message::ServerMessage;
use super::session::WebSocketSession;

#[derive(Default)]
pub struct WebSocketServer {
    /// session_id -> session actor
    sessions: HashMap<Uuid, Addr<WebSocketSession>>,

    /// user_id -> session_ids, one per device
    users: HashMap<Uuid, HashSet<Uuid>>,
}

impl WebSocketServer {
    pub fn new() -> Self {
        Self::default()
    }

    fn send_to_session(&self, session_id: &Uuid, message: ServerMessage) {
        if let Some(session_addr) = self.sessions.get(session_id) {
            session_addr.do_send(message);
        }
    }

    /// Returns the number of sessions reached.
    fn send_to_user(&self, user_id: &Uuid, message: &ServerMessage) -> usize {
        let Some(session_ids) = self.users.get(user_id) else {
            return 0;
        };
        for session_id in session_ids {
            self.send_to_session(session_id, message.clone());
        }
        session_ids.len()
    }
}

impl Actor for WebSocketServer {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        tracing::info!("WebSocket server started");
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::info!("WebSocket server stopped");
    }
}

impl Handler<Connect> for WebSocketServer {
    type Result = ();

    fn handle(&mut self, msg: Connect, _: &mut Context<Self>) {
        tracing::debug!("New WebSocket session connected: {}", msg.id);
        self.sessions.insert(msg.id, msg.addr);
    }
}

impl Handler<Disconnect> for WebSocketServer {
    type Result = ();

    fn handle(&mut self, msg: Disconnect, _: &mut Context<Self>) {
        tracing::debug!("WebSocket session disconnected: {}", msg.id);
        self.sessions.remove(&msg.id);

        self.users.retain(|user_id, sessions| {
            if sessions.remove(&msg.id) && sessions.is_empty() {
                tracing::info!("User {} has no more sessions", user_id);
                return false;
            }
            true
        });
    }
}

impl Handler<Authenticate> for WebSocketServer {
    type Result = ();

    fn handle(&mut self, msg: Authenticate, _: &mut Context<Self>) {
        let sessions = self.users.entry(msg.user_id).or_default();
        sessions.insert(msg.session_id);

        tracing::info!(
            "User {} authenticated on session {} ({} active)",
            msg.user_id,
            msg.session_id,
            sessions.len()
        );
    }
}

impl Handler<SendToUser> for WebSocketServer {
    type Result = ();

    fn handle(&mut self, msg: SendToUser, _: &mut Context<Self>) {
        let sent = self.send_to_user(&msg.user_id, &msg.message);
        if sent == 0 {
            tracing::debug!("User {} not online, push dropped", msg.user_id);
        }
    }
}

impl Handler<SendToUsers> for WebSocketServer {
    type Result = ();

    fn handle(&mut self, msg: SendToUsers, _: &mut Context<Self>) {
        let sent: usize =
            msg.user_ids.iter().map(|user_id| self.send_to_user(user_id, &msg.message)).sum();

        tracing::debug!("Pushed to {} users ({} sessions)", msg.user_ids.len(), sent);
    }
}

impl Message for ServerMessage {
    type Result = ();
}

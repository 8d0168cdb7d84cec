/// Messages exchanged between session actors and the server actor.
use actix::prelude::*;
use uuid::Uuid;

use super::message::ServerMessage;
use super::session::WebSocketSession;

#[derive(Message)]
#[rtype(result = "()")]
pub struct Connect {
    pub id: Uuid,
    pub addr: Addr<WebSocketSession>,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct Disconnect {
    pub id: Uuid,
}

/// A session proved who it is
#[derive(Message)]
#[rtype(result = "()")]
pub struct Authenticate {
    pub session_id: Uuid,
    pub user_id: Uuid,
}

/// Delivered to every session of the user (multi-device)
#[derive(Message)]
#[rtype(result = "()")]
pub struct SendToUser {
    pub user_id: Uuid,
    pub message: ServerMessage,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct SendToUsers {
    pub user_ids: Vec<Uuid>,
    pub message: ServerMessage,
}

/// The socket is gone; the session actor stops and unregisters itself.
#[derive(Message)]
#[rtype(result = "()")]
pub struct CloseSession;

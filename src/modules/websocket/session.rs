/// One actor per WebSocket connection.
///
/// Holds the authenticated user and writes outgoing frames to the channel that
/// `handler.rs` drains into the socket. Database work is spawned on the actor
/// context with `into_actor`.
use actix::prelude::*;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::ENV;
use crate::modules::activity::handle::ActivitySvc;
use crate::utils::{Claims, TypeClaims};

use super::events::*;
use super::message::{ClientMessage, ServerMessage};
use super::server::WebSocketServer;

pub struct WebSocketSession {
    pub id: Uuid,

    /// Set once an `auth` frame succeeds
    pub user_id: Option<Uuid>,

    pub server: Addr<WebSocketServer>,

    /// JSON frames bound for the client
    pub tx: mpsc::UnboundedSender<String>,

    pub activity_service: actix_web::web::Data<ActivitySvc>,
}

impl WebSocketSession {
    pub fn new(
        server: Addr<WebSocketServer>,
        tx: mpsc::UnboundedSender<String>,
        activity_service: actix_web::web::Data<ActivitySvc>,
    ) -> Self {
        Self { id: Uuid::now_v7(), user_id: None, server, tx, activity_service }
    }

    fn send_to_client(&self, msg: &ServerMessage) {
        send_frame(&self.tx, self.id, msg);
    }

    fn send_error(&self, message: &str) {
        self.send_to_client(&ServerMessage::Error { message: message.to_string() });
    }

    fn require_auth(&self) -> Option<Uuid> {
        if self.user_id.is_none() {
            self.send_error("Authenticate before sending this frame");
            tracing::warn!("Session {} is not authenticated, frame rejected", self.id);
        }
        self.user_id
    }

    fn handle_client_message(&mut self, msg: ClientMessage, ctx: &mut Context<Self>) {
        match msg {
            ClientMessage::Auth { token } => self.handle_auth(&token),
            ClientMessage::CheckActivity => self.handle_check_activity(ctx),
            ClientMessage::Ping => self.send_to_client(&ServerMessage::Pong),
        }
    }

    fn handle_auth(&mut self, token: &str) {
        if self.user_id.is_some() {
            self.send_error("Session already authenticated");
            return;
        }

        let claims = match Claims::decode(token, ENV.jwt_secret.as_ref()) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::warn!("JWT verification failed (session {}): {}", self.id, e);
                self.send_to_client(&ServerMessage::AuthFailed {
                    reason: "Token Invalid or Expired".to_string(),
                });
                return;
            }
        };

        if !claims.is_type(TypeClaims::AccessToken) {
            self.send_to_client(&ServerMessage::AuthFailed {
                reason: "Access token required".to_string(),
            });
            return;
        }

        let user_id = claims.sub;
        self.user_id = Some(user_id);
        self.server.do_send(Authenticate { session_id: self.id, user_id });
        self.send_to_client(&ServerMessage::AuthSuccess { user_id });

        tracing::info!("User {} authenticated on session {}", user_id, self.id);
    }

    fn handle_check_activity(&self, ctx: &mut Context<Self>) {
        let Some(user_id) = self.require_auth() else {
            return;
        };

        let service = self.activity_service.clone();
        let tx = self.tx.clone();
        let session_id = self.id;

        ctx.spawn(
            async move {
                let reply = match service.evaluate(user_id).await {
                    Ok(badge) => ServerMessage::ActivityBadge { has_unseen: badge.has_unseen },
                    Err(e) => {
                        tracing::error!("Activity check failed (session {}): {}", session_id, e);
                        ServerMessage::Error { message: "Could not check activity".to_string() }
                    }
                };
                send_frame(&tx, session_id, &reply);
            }
            .into_actor(self),
        );
    }
}

fn send_frame(tx: &mpsc::UnboundedSender<String>, session_id: Uuid, msg: &ServerMessage) {
    match serde_json::to_string(msg) {
        Ok(json) => {
            if let Err(e) = tx.send(json) {
                tracing::error!("Could not queue frame for session {}: {}", session_id, e);
            }
        }
        Err(e) => tracing::error!("Could not serialize frame for session {}: {}", session_id, e),
    }
}

impl Actor for WebSocketSession {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::debug!("WebSocket session started: {}", self.id);
        self.server.do_send(Connect { id: self.id, addr: ctx.address() });
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::debug!("WebSocket session stopped: {}", self.id);
        self.server.do_send(Disconnect { id: self.id });
    }
}

impl Message for ClientMessage {
    type Result = ();
}

impl Handler<ClientMessage> for WebSocketSession {
    type Result = ();

    fn handle(&mut self, msg: ClientMessage, ctx: &mut Context<Self>) {
        self.handle_client_message(msg, ctx);
    }
}

impl Handler<CloseSession> for WebSocketSession {
    type Result = ();

    fn handle(&mut self, _: CloseSession, ctx: &mut Context<Self>) {
        ctx.stop();
    }
}

/// Pushes from the server actor
impl Handler<ServerMessage> for WebSocketSession {
    type Result = ();

    fn handle(&mut self, msg: ServerMessage, _ctx: &mut Context<Self>) {
        self.send_to_client(&msg);
    }
}

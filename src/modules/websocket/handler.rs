/// `GET /ws` upgrade.
///
/// Inbound frames are parsed into `ClientMessage` and sent to the session actor.
/// Outbound frames come back from the actor through an unbounded channel.
use actix::{Actor, Addr};
use actix_web::{Error, HttpRequest, HttpResponse, web};
use actix_ws::Message;
use tokio::sync::mpsc;

use super::events::CloseSession;
use super::message::ClientMessage;
use super::server::WebSocketServer;
use super::session::WebSocketSession;
use crate::modules::activity::handle::ActivitySvc;

pub async fn websocket_handler(
    req: HttpRequest,
    stream: web::Payload,
    server: web::Data<Addr<WebSocketServer>>,
    activity_service: web::Data<ActivitySvc>,
) -> Result<HttpResponse, Error> {
    tracing::debug!("WebSocket upgrade request from {:?}", req.peer_addr());

    let (response, mut ws_session, mut msg_stream) = actix_ws::handle(&req, stream)?;
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let addr = WebSocketSession::new(server.get_ref().clone(), tx, activity_service).start();

    actix_web::rt::spawn(async move {
        loop {
            tokio::select! {
                msg = msg_stream.recv() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            match serde_json::from_str::<ClientMessage>(&text) {
                                Ok(client_msg) => addr.do_send(client_msg),
                                Err(e) => {
                                    tracing::warn!(
                                        "Unparseable client frame: {} - raw: {}",
                                        e,
                                        text.chars().take(100).collect::<String>()
                                    );
                                }
                            }
                        }

                        Some(Ok(Message::Ping(data))) => {
                            if let Err(e) = ws_session.pong(&data).await {
                                tracing::error!("Could not send pong: {}", e);
                                break;
                            }
                        }

                        Some(Ok(Message::Close(reason))) => {
                            tracing::info!("WebSocket close frame: {:?}", reason);
                            break;
                        }

                        Some(Ok(Message::Binary(_))) => {
                            tracing::warn!("Binary frames are not supported");
                        }

                        Some(Ok(Message::Pong(_) | Message::Continuation(_) | Message::Nop)) => {}

                        Some(Err(e)) => {
                            tracing::error!("WebSocket protocol error: {}", e);
                            break;
                        }

                        None => break,
                    }
                }

                Some(json) = rx.recv() => {
                    if ws_session.text(json).await.is_err() {
                        tracing::error!("Could not write to WebSocket client");
                        break;
                    }
                }
            }
        }

        let _ = ws_session.close(None).await;
        addr.do_send(CloseSession);
        tracing::debug!("WebSocket message loop finished");
    });

    Ok(response)
}

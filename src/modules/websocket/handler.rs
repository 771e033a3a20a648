use actix::{Actor, Addr};
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_ws::Message;
use futures_util::StreamExt;
use tokio::sync::mpsc;

use super::events::{Inbound, Stop};
use super::message::ClientMessage;
use super::server::WebSocketServer;
use super::session::WebSocketSession;
use crate::middlewares::get_auth;

/// Upgrades the request to a websocket and bridges the bidirectional flow:
/// - Inbound:  client frame -> parse ClientMessage -> session actor
/// - Outbound: server actor -> session actor -> mpsc channel -> client
pub async fn websocket_handler(
    req: HttpRequest,
    stream: web::Payload,
    server: web::Data<Addr<WebSocketServer>>,
) -> Result<HttpResponse, Error> {
    let auth = get_auth(&req)?;
    tracing::debug!("WebSocket upgrade request from user {}", auth.user_id);

    let (response, mut ws_session, mut msg_stream) = actix_ws::handle(&req, stream)?;

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let addr = WebSocketSession::new(auth.user_id, server.get_ref().clone(), tx).start();

    actix_web::rt::spawn(async move {
        loop {
            tokio::select! {
                outbound = rx.recv() => {
                    match outbound {
                        Some(json) => {
                            if ws_session.text(json).await.is_err() {
                                break;
                            }
                        }
                        None => break,
                    }
                }
                inbound = msg_stream.next() => {
                    match inbound {
                        Some(Ok(Message::Text(text))) => {
                            match serde_json::from_str::<ClientMessage>(&text) {
                                Ok(client_msg) => addr.do_send(Inbound(client_msg)),
                                Err(err) => {
                                    tracing::warn!("Dropping unparseable client frame: {}", err);
                                }
                            }
                        }
                        Some(Ok(Message::Ping(bytes))) => {
                            if ws_session.pong(&bytes).await.is_err() {
                                break;
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => break,
                        Some(Ok(_)) => {}
                        Some(Err(err)) => {
                            tracing::warn!("WebSocket protocol error: {}", err);
                            break;
                        }
                    }
                }
            }
        }
        addr.do_send(Stop);
        let _ = ws_session.close(None).await;
    });

    Ok(response)
}

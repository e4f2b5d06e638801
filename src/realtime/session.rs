use actix_ws::Message;
use futures_util::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::realtime::hub::NegotiationHub;
use crate::realtime::protocol::ServerEvent;

/// Drives one WebSocket subscription: forwards hub events to the socket and
/// handles cleanup on disconnect.
///
/// The negotiation channel is server-push only: offers and agreements go
/// through the REST endpoints so they hit the transactional write path.
/// Text frames from the client are answered with an error event.
pub async fn run(
    mut session: actix_ws::Session,
    mut msg_stream: actix_ws::MessageStream,
    mut rx: mpsc::UnboundedReceiver<ServerEvent>,
    session_id: Uuid,
    user_id: Uuid,
    hub: Arc<NegotiationHub>,
) {
    loop {
        tokio::select! {
            // Incoming frame from the client.
            Some(msg) = msg_stream.next() => {
                match msg {
                    Ok(Message::Text(_)) => {
                        let err = ServerEvent::Error {
                            message: "This channel is read-only; use the negotiation endpoints to act"
                                .to_string(),
                        };
                        let json = serde_json::to_string(&err).unwrap_or_default();
                        if session.text(json).await.is_err() {
                            break;
                        }
                    }
                    Ok(Message::Ping(bytes)) => {
                        if session.pong(&bytes).await.is_err() {
                            break;
                        }
                    }
                    Ok(Message::Close(_)) => {
                        break;
                    }
                    Err(_) => {
                        break;
                    }
                    _ => {}
                }
            }
            // Outgoing event from the hub to this subscriber.
            Some(event) = rx.recv() => {
                let json = match serde_json::to_string(&event) {
                    Ok(j) => j,
                    Err(_) => continue,
                };
                if session.text(json).await.is_err() {
                    break;
                }
            }
            // Both channels closed — exit.
            else => break,
        }
    }

    hub.leave(session_id, user_id).await;
    let _ = session.close(None).await;
}

use actix_ws::Message;
use futures_util::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::notify::presence::Presence;
use crate::notify::protocol::ServerEvent;

/// Drives one notification socket: forwards pushed events, answers pings,
/// and unregisters the connection once either side goes away.
///
/// The event stream ends when a newer connection from the same user replaces
/// this one, which closes this socket.
pub async fn run_session(
    mut session: actix_ws::Session,
    mut msg_stream: actix_ws::MessageStream,
    mut rx: mpsc::UnboundedReceiver<ServerEvent>,
    user_id: Uuid,
    connection_id: Uuid,
    presence: Arc<dyn Presence>,
) {
    loop {
        tokio::select! {
            incoming = msg_stream.next() => {
                match incoming {
                    Some(Ok(Message::Ping(bytes))) => {
                        if session.pong(&bytes).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    // The channel is push-only; anything else from the client is ignored.
                    Some(Ok(_)) => {}
                }
            }
            outgoing = rx.recv() => {
                let Some(event) = outgoing else {
                    tracing::debug!(%user_id, %connection_id, "connection replaced, closing");
                    break;
                };
                let json = match serde_json::to_string(&event) {
                    Ok(j) => j,
                    Err(_) => continue,
                };
                if session.text(json).await.is_err() {
                    break;
                }
            }
        }
    }

    presence.unregister(user_id, connection_id).await;
    let _ = session.close(None).await;
    tracing::info!(%user_id, %connection_id, "notification socket closed");
}

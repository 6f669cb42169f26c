use actix_web::{HttpRequest, HttpResponse, web};
use std::sync::Arc;

use crate::auth::TokenVerifier;
use crate::error::MarketError;
use crate::notify::session::run_session;
use crate::notify::{ConnectionHandle, Presence};

/// Query params for the WebSocket handshake endpoint.
#[derive(Debug, serde::Deserialize)]
pub struct WsQuery {
    pub token: Option<String>,
}

/// GET /api/notifications/ws?token=<jwt>
///
/// Browsers can't set an Authorization header on the handshake, so the token
/// rides in the query string. It is verified before the upgrade; a missing or
/// bad token gets a 401 error body and no socket.
pub async fn ws_connect(
    req: HttpRequest,
    stream: web::Payload,
    query: web::Query<WsQuery>,
    verifier: web::Data<Arc<TokenVerifier>>,
    presence: web::Data<Arc<dyn Presence>>,
) -> Result<HttpResponse, actix_web::Error> {
    let token = query
        .token
        .as_deref()
        .ok_or_else(|| MarketError::Unauthorized("Missing token query parameter".to_string()))?;
    let claims = verifier
        .verify(token)
        .await
        .map_err(|e| MarketError::Unauthorized(format!("Invalid token: {e}")))?;
    let user_id = claims.user_id().map_err(MarketError::Unauthorized)?;

    let (response, session, msg_stream) = actix_ws::handle(&req, stream)?;

    let (handle, rx) = ConnectionHandle::open();
    let connection_id = handle.connection_id;
    presence.register(user_id, handle).await;
    tracing::info!(%user_id, %connection_id, "notification socket opened");

    actix_web::rt::spawn(run_session(
        session,
        msg_stream,
        rx,
        user_id,
        connection_id,
        presence.get_ref().clone(),
    ));

    Ok(response)
}

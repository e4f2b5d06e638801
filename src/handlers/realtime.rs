use actix_web::{HttpRequest, HttpResponse, web};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::jwt;
use crate::auth::middleware::JwtSecret;
use crate::db::negotiations as negotiation_db;
use crate::error::ApiError;
use crate::realtime::hub::NegotiationHub;
use crate::realtime::session;

/// Query params for the WebSocket handshake endpoint.
#[derive(Debug, serde::Deserialize)]
pub struct WsQuery {
    pub token: String,
}

/// GET /api/negotiation/ws/{session_id}?token=<jwt>
///
/// Upgrades the HTTP connection to the session's private event channel.
/// Authenticates via a query-param token (browsers can't send Authorization
/// headers during the WebSocket handshake) and authorizes the subscription
/// before the upgrade: only the session's two participants are admitted.
pub async fn ws_connect(
    req: HttpRequest,
    stream: web::Payload,
    path: web::Path<Uuid>,
    query: web::Query<WsQuery>,
    db: web::Data<DatabaseConnection>,
    secret: web::Data<JwtSecret>,
    hub: web::Data<Arc<NegotiationHub>>,
) -> Result<HttpResponse, ApiError> {
    let session_id = path.into_inner();

    // 1. Validate the JWT.
    let claims = jwt::validate_token(&query.token, &secret.get_ref().0)
        .map_err(|e| ApiError::Unauthorized(format!("Invalid token: {e}")))?;
    let user_id = claims.user_id().map_err(ApiError::Unauthorized)?;

    // 2. Verify the subscriber is one of the session's two participants.
    let negotiation = negotiation_db::get_session_by_id(db.get_ref(), session_id)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!("Negotiation session {session_id} not found"))
        })?;

    if negotiation.role_of(user_id).is_none() {
        return Err(ApiError::Forbidden(
            "You are not a participant of this negotiation".to_string(),
        ));
    }

    // 3. Upgrade to WebSocket.
    let (response, ws_session, msg_stream) = actix_ws::handle(&req, stream)
        .map_err(|_| ApiError::InvalidInput("WebSocket handshake failed".to_string()))?;

    // 4. Join the channel and get a receiver for outgoing events.
    let rx = hub.join(session_id, user_id).await;

    // 5. Spawn the subscription driver.
    let hub_clone = hub.get_ref().clone();
    actix_web::rt::spawn(session::run(
        ws_session, msg_stream, rx, session_id, user_id, hub_clone,
    ));

    Ok(response)
}

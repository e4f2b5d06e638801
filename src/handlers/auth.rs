use actix_web::{HttpResponse, Responder};

use crate::auth::middleware::AuthenticatedUser;
use crate::models::users::UserResponse;

/// GET /api/auth/me — the resolved current actor.
///
/// Token issuance belongs to the identity service; this endpoint only
/// reflects what the token resolves to so clients can pick the right side
/// of the negotiation UI.
pub async fn me(user: AuthenticatedUser) -> impl Responder {
    let response: UserResponse = user.0.into();
    HttpResponse::Ok().json(response)
}

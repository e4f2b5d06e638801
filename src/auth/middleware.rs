use actix_web::FromRequest;
use actix_web::{HttpRequest, dev::Payload, web};
use sea_orm::DatabaseConnection;
use std::future::Future;
use std::pin::Pin;

use crate::auth::jwt;
use crate::db::users::find_or_create_from_auth;
use crate::error::ApiError;
use crate::models::users::{self, CreateUserFromAuth};

/// The resolved current actor: extractor usable by any handler.
pub struct AuthenticatedUser(pub users::Model);

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            // 1. Extract the Bearer token from the Authorization header.
            let auth_header = req
                .headers()
                .get("Authorization")
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| {
                    ApiError::Unauthorized("Missing Authorization header".to_string())
                })?;

            let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
                ApiError::Unauthorized(
                    "Authorization header must be: Bearer <token>".to_string(),
                )
            })?;

            // 2. Validate the JWT against the shared secret.
            let secret = req
                .app_data::<web::Data<JwtSecret>>()
                .ok_or(ApiError::Misconfigured("JWT secret"))?;

            let claims = jwt::validate_token(token, &secret.get_ref().0)
                .map_err(|e| ApiError::Unauthorized(format!("Invalid token: {e}")))?;

            // 3. Extract identity from claims.
            let user_id = claims.user_id().map_err(ApiError::Unauthorized)?;
            let role = claims.marketplace_role().map_err(ApiError::Unauthorized)?;
            let email = claims
                .email
                .clone()
                .ok_or_else(|| ApiError::Unauthorized("No email in token claims".to_string()))?;

            // 4. Resolve to a user row (created on first sight).
            let db = req
                .app_data::<web::Data<DatabaseConnection>>()
                .ok_or(ApiError::Misconfigured("Database connection"))?;

            let user = find_or_create_from_auth(
                db.get_ref(),
                CreateUserFromAuth {
                    id: user_id,
                    email,
                    username: claims.username.clone(),
                    display_name: None,
                    role,
                },
            )
            .await?;

            Ok(AuthenticatedUser(user))
        })
    }
}

/// Wrapper type to store the JWT shared secret in Actix app data.
#[derive(Clone)]
pub struct JwtSecret(pub String);

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::users::Role;

/// Claims carried by the identity provider's HS256 tokens.
///
/// The `sub` field is the user's UUID; `role` is the marketplace role the
/// account registered with. Token issuance lives in the identity service;
/// this backend only verifies and reads.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// The auth user UUID.
    pub sub: String,
    /// Token expiration (Unix timestamp).
    pub exp: usize,
    /// Token issued-at (Unix timestamp).
    pub iat: Option<usize>,
    /// User's email.
    pub email: Option<String>,
    /// Marketplace role: "jobprovider" or "jobseeker".
    pub role: Option<String>,
    /// Public handle, when the profile has one.
    pub username: Option<String>,
}

impl Claims {
    /// Extract the user UUID from the `sub` claim.
    pub fn user_id(&self) -> Result<Uuid, String> {
        Uuid::parse_str(&self.sub).map_err(|e| format!("Invalid UUID in sub claim: {e}"))
    }

    /// The marketplace role, rejecting tokens that carry none or an
    /// unknown value. Every negotiation action is role-dependent.
    pub fn marketplace_role(&self) -> Result<Role, String> {
        match self.role.as_deref() {
            Some("jobprovider") => Ok(Role::JobProvider),
            Some("jobseeker") => Ok(Role::JobSeeker),
            Some(other) => Err(format!("Unknown role claim: {other}")),
            None => Err("Missing role claim".to_string()),
        }
    }
}

/// Validate an HS256 JWT against the shared secret and return its claims.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, String> {
    let validation = Validation::new(Algorithm::HS256);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| format!("{e:?}"))
}

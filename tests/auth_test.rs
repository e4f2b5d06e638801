///! Integration test for JWT auth validation.
///!
///! Mints an HS256 JWT locally using the same shared secret the server
///! would use, then validates it through the `validate_token` function.
///! No running server or database is needed.
///!
///! Run with: `cargo test --test auth_test`
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use uuid::Uuid;

use worklink_backend::auth::jwt::{Claims, validate_token};
use worklink_backend::models::users::Role;

/// A fake secret for testing — never use the real one in tests committed to git.
const TEST_SECRET: &str = "test-secret-at-least-256-bits-long-for-hs256-xxxxxxx";

/// Helper: mint a JWT signed with HS256 using the test secret.
fn mint_test_token(sub: &str, email: &str, role: &str) -> String {
    let now = Utc::now().timestamp() as usize;

    let claims = Claims {
        sub: sub.to_string(),
        exp: now + 3600, // 1 hour from now
        iat: Some(now),
        email: Some(email.to_string()),
        role: Some(role.to_string()),
        username: Some("alice".to_string()),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("Failed to encode test JWT")
}

#[test]
fn test_valid_token_decodes_correctly() {
    let user_id = Uuid::new_v4();
    let token = mint_test_token(&user_id.to_string(), "alice@example.com", "jobseeker");

    let claims = validate_token(&token, TEST_SECRET).expect("Token should be valid");

    assert_eq!(claims.sub, user_id.to_string());
    assert_eq!(claims.email.as_deref(), Some("alice@example.com"));
    assert_eq!(claims.user_id().unwrap(), user_id);
    assert_eq!(claims.marketplace_role().unwrap(), Role::JobSeeker);
}

#[test]
fn test_provider_role_claim_maps_to_provider() {
    let token = mint_test_token(&Uuid::new_v4().to_string(), "bob@example.com", "jobprovider");

    let claims = validate_token(&token, TEST_SECRET).expect("Token should be valid");
    assert_eq!(claims.marketplace_role().unwrap(), Role::JobProvider);
}

#[test]
fn test_expired_token_is_rejected() {
    let now = Utc::now().timestamp() as usize;

    let claims = Claims {
        sub: Uuid::new_v4().to_string(),
        exp: now - 300, // expired 5 minutes ago (well past the 60s default leeway)
        iat: Some(now - 3600),
        email: Some("expired@example.com".to_string()),
        role: Some("jobseeker".to_string()),
        username: None,
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap();

    let result = validate_token(&token, TEST_SECRET);
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("ExpiredSignature"));
}

#[test]
fn test_wrong_secret_is_rejected() {
    let token = mint_test_token(&Uuid::new_v4().to_string(), "bob@example.com", "jobprovider");

    let result = validate_token(&token, "completely-wrong-secret-xxxxxxxxxxxxxxxxxxx");
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("InvalidSignature"));
}

#[test]
fn test_garbage_token_is_rejected() {
    let result = validate_token("not.a.valid.jwt", TEST_SECRET);
    assert!(result.is_err());
}

#[test]
fn test_missing_or_unknown_role_claims_are_rejected() {
    let now = Utc::now().timestamp() as usize;

    let no_role = Claims {
        sub: Uuid::new_v4().to_string(),
        exp: now + 3600,
        iat: Some(now),
        email: Some("bare@example.com".to_string()),
        role: None,
        username: None,
    };
    assert!(no_role.marketplace_role().is_err());

    let odd_role = Claims {
        role: Some("admin".to_string()),
        ..no_role
    };
    assert!(odd_role.marketplace_role().is_err());
}

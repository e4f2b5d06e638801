use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use sea_orm::DbErr;
use thiserror::Error;

use crate::db::negotiations::NegotiationError;
use crate::negotiation::state::TermsError;

/// Error taxonomy for the negotiation API.
///
/// Every variant except `Internal` carries a caller-facing message; internal
/// storage errors are logged and surfaced as a generic 500 so no driver or
/// schema detail leaks over the wire.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    NotFound(String),
    /// A concurrent write invalidated a precondition. Safe to re-fetch the
    /// negotiation view and retry the action.
    #[error("{0}")]
    ConflictRetryable(String),
    /// The session is in a state where the action is not allowed
    /// (finalized session, agree with an empty offer log).
    #[error("{0}")]
    InvalidState(String),
    #[error("internal server error")]
    Internal(#[from] DbErr),
    #[error("internal server error")]
    Misconfigured(&'static str),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::ConflictRetryable(_) | ApiError::InvalidState(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) | ApiError::Misconfigured(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::Internal(e) => tracing::error!(error = %e, "database error"),
            ApiError::Misconfigured(what) => tracing::error!("{what} not configured"),
            _ => {}
        }

        let body = match self {
            ApiError::ConflictRetryable(msg) => serde_json::json!({
                "error": msg,
                "retryable": true,
            }),
            other => serde_json::json!({
                "error": other.to_string(),
            }),
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}

impl From<TermsError> for ApiError {
    fn from(e: TermsError) -> Self {
        ApiError::InvalidInput(e.to_string())
    }
}

impl From<NegotiationError> for ApiError {
    fn from(e: NegotiationError) -> Self {
        match e {
            NegotiationError::JobClosed | NegotiationError::NoOffer => {
                ApiError::InvalidState(e.to_string())
            }
            NegotiationError::OfferSuperseded => ApiError::ConflictRetryable(e.to_string()),
            NegotiationError::MissingLink(_) => ApiError::NotFound(e.to_string()),
            NegotiationError::Db(db) => ApiError::Internal(db),
        }
    }
}

use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::cache::SnapshotCache;
use crate::db::chats as chat_db;
use crate::db::jobs as job_db;
use crate::db::negotiations as negotiation_db;
use crate::error::ApiError;
use crate::models::jobs::{JobSnapshot, JobStatus};
use crate::models::negotiation_sessions::AgreementFlags;
use crate::models::offers::{CreateOffer, OfferResponse};
use crate::negotiation::state::{OfferTerms, derive_phase};
use crate::realtime::hub::NegotiationHub;
use crate::realtime::protocol::ServerEvent;

/// GET /api/chat/{chat_id}/negotiation — fetch (or lazily create) the
/// negotiation session for a conversation.
///
/// Only the chat's provider or seeker may call this. The response carries
/// everything a client needs to rebuild its panel from scratch after a
/// reconnect: both agreement flags, the offer history newest-first, a
/// read-only snapshot of the parent job, and the caller's derived phase.
pub async fn get_negotiation(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    cache: web::Data<SnapshotCache>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let chat_id = path.into_inner();
    let user_id = user.0.id;

    let chat = chat_db::get_chat_by_id(db.get_ref(), chat_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Chat {chat_id} not found")))?;

    let role = chat.role_of(user_id).ok_or_else(|| {
        ApiError::Forbidden("You are not a participant of this chat".to_string())
    })?;

    let session = negotiation_db::get_or_create_session(db.get_ref(), &chat).await?;

    // Self-healing: a both-agreed session whose job is still open was left
    // behind by a failed finalization. Retry the transition before
    // answering so the caller never sees an agreed-but-unfinalized deal.
    if session.both_agreed() {
        if let Some(job) = job_db::get_job_by_id(db.get_ref(), session.job_id).await? {
            if job.status == JobStatus::Open {
                negotiation_db::reconcile_finalization(db.get_ref(), &session).await?;
            }
        }
    }

    let offers = negotiation_db::list_offers(db.get_ref(), session.id).await?;
    let phase = derive_phase(&session, offers.first(), role);

    let snapshot = job_snapshot(&db, &cache, session.job_id).await?;

    let offers: Vec<OfferResponse> = offers.into_iter().map(Into::into).collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "session": session,
        "offers": offers,
        "job_details": snapshot,
        "phase": phase,
    })))
}

/// POST /api/negotiation/offer — propose new terms (price, hours per day,
/// days per week; all positive).
///
/// Appending an offer resets a standing agreement from the counterpart, so
/// nobody can be held to terms they never saw. Rejected once the job is
/// closed. The created offer is broadcast to both participants after the
/// write commits.
pub async fn propose_offer(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    hub: web::Data<Arc<NegotiationHub>>,
    body: web::Json<ProposeOfferRequest>,
) -> Result<HttpResponse, ApiError> {
    let user_id = user.0.id;
    let req = body.into_inner();

    let terms = OfferTerms {
        price: req.price,
        hours_per_day: req.hours_per_day,
        days_per_week: req.days_per_week,
    };
    terms.validate()?;

    let session = negotiation_db::get_session_by_id(db.get_ref(), req.session_id)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!("Negotiation session {} not found", req.session_id))
        })?;

    let role = session.role_of(user_id).ok_or_else(|| {
        ApiError::Forbidden("You are not a participant of this negotiation".to_string())
    })?;

    let offer = negotiation_db::append_offer(
        db.get_ref(),
        &session,
        CreateOffer {
            session_id: session.id,
            sender_id: user_id,
            sender_role: role,
            price: terms.price,
            hours_per_day: terms.hours_per_day,
            days_per_week: terms.days_per_week,
        },
    )
    .await?;

    let response: OfferResponse = offer.into();

    // The durable write committed; delivery is best-effort and clients
    // reconcile via re-fetch if they miss it.
    hub.broadcast(
        session.id,
        ServerEvent::NewOffer {
            offer: response.clone(),
        },
    )
    .await;

    Ok(HttpResponse::Created().json(response))
}

/// POST /api/negotiation/agree — accept the current latest offer.
///
/// When this is the second agreement, the same transaction closes the job
/// and accepts the application, and the one call that performed that
/// transition broadcasts `negotiation-complete`. Duplicate submissions are
/// no-op successes.
pub async fn agree(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    hub: web::Data<Arc<NegotiationHub>>,
    body: web::Json<AgreeRequest>,
) -> Result<HttpResponse, ApiError> {
    let user_id = user.0.id;
    let req = body.into_inner();

    let chat = chat_db::get_chat_by_id(db.get_ref(), req.chat_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Chat {} not found", req.chat_id)))?;

    let role = chat.role_of(user_id).ok_or_else(|| {
        ApiError::Forbidden("You are not a participant of this chat".to_string())
    })?;

    let outcome = negotiation_db::agree(db.get_ref(), chat.id, role, req.offer_id).await?;

    let flags = AgreementFlags::from(&outcome.session);

    if outcome.finalized_now {
        hub.broadcast(
            outcome.session.id,
            ServerEvent::NegotiationComplete {
                message: "Deal! Both sides agreed. Check your dashboard for the next steps."
                    .to_string(),
            },
        )
        .await;
    } else {
        hub.broadcast(
            outcome.session.id,
            ServerEvent::StatusUpdated {
                flags: flags.clone(),
            },
        )
        .await;
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Agreement status updated",
        "session_id": outcome.session.id,
        "flags": flags,
        "finalized": outcome.finalized_now,
    })))
}

/// Read the parent job's display snapshot through the cache. Cache trouble
/// degrades to a database read, never to a failed request.
async fn job_snapshot(
    db: &web::Data<DatabaseConnection>,
    cache: &SnapshotCache,
    job_id: Uuid,
) -> Result<JobSnapshot, ApiError> {
    match cache.get(job_id).await {
        Ok(Some(snapshot)) => return Ok(snapshot),
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, "job snapshot cache read failed"),
    }

    let job = job_db::get_job_by_id(db.get_ref(), job_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Job {job_id} not found")))?;
    let snapshot = JobSnapshot::from(job);

    if let Err(e) = cache.put(job_id, &snapshot).await {
        tracing::warn!(error = %e, "job snapshot cache write failed");
    }

    Ok(snapshot)
}

// ── Request DTOs ──

/// Request body for POST /api/negotiation/offer.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ProposeOfferRequest {
    pub session_id: Uuid,
    pub price: i64,
    pub hours_per_day: i32,
    pub days_per_week: i32,
}

/// Request body for POST /api/negotiation/agree.
/// `offer_id` optionally pins the offer the caller saw; if a counter-offer
/// landed in between, the call fails as a retryable conflict.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct AgreeRequest {
    pub chat_id: Uuid,
    pub offer_id: Option<Uuid>,
}

use sea_orm::prelude::Expr;
use sea_orm::*;
use thiserror::Error;
use uuid::Uuid;

use crate::db::{applications as application_db, is_unique_violation, jobs as job_db};
use crate::models::chats;
use crate::models::jobs::JobStatus;
use crate::models::negotiation_sessions::{self as sessions, AgreementStatus};
use crate::models::offers::{self, CreateOffer};
use crate::models::users::Role;

/// Domain failures of the negotiation write paths, distinct from raw
/// storage errors so handlers can map them onto the API taxonomy.
#[derive(Debug, Error)]
pub enum NegotiationError {
    #[error("the job for this negotiation is no longer open")]
    JobClosed,
    #[error("cannot agree before any offer has been made")]
    NoOffer,
    #[error("the latest offer changed while you were deciding")]
    OfferSuperseded,
    #[error("{0} linked to this negotiation no longer exists")]
    MissingLink(&'static str),
    #[error(transparent)]
    Db(#[from] DbErr),
}

/// Outcome of an agree call.
pub struct AgreeOutcome {
    /// The session as persisted after this call.
    pub session: sessions::Model,
    /// True only for the call that actually performed the `open` → `closed`
    /// job transition. Duplicate or racing triggers observe `false`.
    pub finalized_now: bool,
}

/// Role-keyed column accessor: the only place that maps a participant role
/// to its agreement-flag column.
fn agreement_column(role: Role) -> sessions::Column {
    match role {
        Role::JobProvider => sessions::Column::ProviderAgreement,
        Role::JobSeeker => sessions::Column::SeekerAgreement,
    }
}

/// Fetch a session by its own ID.
pub async fn get_session_by_id(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<sessions::Model>, DbErr> {
    sessions::Entity::find_by_id(id).one(db).await
}

/// Fetch the session for a parent chat, if one has been created.
pub async fn get_session_by_chat_id<C: ConnectionTrait>(
    conn: &C,
    chat_id: Uuid,
) -> Result<Option<sessions::Model>, DbErr> {
    sessions::Entity::find()
        .filter(sessions::Column::ChatId.eq(chat_id))
        .one(conn)
        .await
}

/// Get or lazily create the negotiation session for a chat.
///
/// Creation copies the chat's participant pairing and seeds both agreement
/// flags to pending. The unique constraint on `chat_id` arbitrates
/// concurrent creators: the loser of the insert race re-reads the winner's
/// row, so N concurrent callers all observe the same session.
pub async fn get_or_create_session(
    db: &DatabaseConnection,
    chat: &chats::Model,
) -> Result<sessions::Model, DbErr> {
    if let Some(existing) = get_session_by_chat_id(db, chat.id).await? {
        return Ok(existing);
    }

    let now = chrono::Utc::now();
    let new_session = sessions::ActiveModel {
        id: Set(Uuid::new_v4()),
        chat_id: Set(chat.id),
        job_id: Set(chat.job_id),
        application_id: Set(chat.application_id),
        provider_id: Set(chat.provider_id),
        seeker_id: Set(chat.seeker_id),
        provider_agreement: Set(AgreementStatus::Pending),
        seeker_agreement: Set(AgreementStatus::Pending),
        created_at: Set(now),
        updated_at: Set(now),
    };

    match new_session.insert(db).await {
        Ok(session) => Ok(session),
        Err(e) if is_unique_violation(&e) => {
            get_session_by_chat_id(db, chat.id).await?.ok_or(e)
        }
        Err(e) => Err(e),
    }
}

/// Full offer history for a session, newest first (display order).
pub async fn list_offers(
    db: &DatabaseConnection,
    session_id: Uuid,
) -> Result<Vec<offers::Model>, DbErr> {
    offers::Entity::find()
        .filter(offers::Column::SessionId.eq(session_id))
        .order_by_desc(offers::Column::CreatedAt)
        .order_by_desc(offers::Column::Id)
        .all(db)
        .await
}

/// The latest offer in a session's log. Ordering is by server-assigned
/// creation time with the ID as a deterministic tie-break; client clocks
/// are never consulted.
pub async fn latest_offer<C: ConnectionTrait>(
    conn: &C,
    session_id: Uuid,
) -> Result<Option<offers::Model>, DbErr> {
    offers::Entity::find()
        .filter(offers::Column::SessionId.eq(session_id))
        .order_by_desc(offers::Column::CreatedAt)
        .order_by_desc(offers::Column::Id)
        .one(conn)
        .await
}

/// Append a new offer to a session's log.
///
/// Runs in one transaction: the parent job must still be open (finalized
/// sessions reject new offers), the offer row is inserted with a server
/// timestamp, and a standing agreement from the counterpart is reset to
/// pending: the terms changed, so any prior agreement no longer applies.
/// The proposer's own flag is left untouched.
pub async fn append_offer(
    db: &DatabaseConnection,
    session: &sessions::Model,
    input: CreateOffer,
) -> Result<offers::Model, NegotiationError> {
    let txn = db.begin().await?;

    let job = job_db::get_job_by_id(&txn, session.job_id)
        .await?
        .ok_or(NegotiationError::MissingLink("the job"))?;
    if job.status != JobStatus::Open {
        return Err(NegotiationError::JobClosed);
    }

    let offer = offers::ActiveModel {
        id: Set(Uuid::new_v4()),
        session_id: Set(input.session_id),
        sender_id: Set(input.sender_id),
        sender_role: Set(input.sender_role),
        price: Set(input.price),
        hours_per_day: Set(input.hours_per_day),
        days_per_week: Set(input.days_per_week),
        created_at: Set(chrono::Utc::now()),
    }
    .insert(&txn)
    .await?;

    let counterpart = input.sender_role.counterpart();
    sessions::Entity::update_many()
        .col_expr(
            agreement_column(counterpart),
            Expr::value(AgreementStatus::Pending),
        )
        .col_expr(sessions::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(sessions::Column::Id.eq(session.id))
        .filter(agreement_column(counterpart).eq(AgreementStatus::Agreed))
        .exec(&txn)
        .await?;

    txn.commit().await?;
    Ok(offer)
}

/// Record one side's agreement to the current latest offer, finalizing the
/// deal when it is the second one.
///
/// The whole read-decide-write sequence runs in a single transaction: the
/// latest offer, the flag update, and (when both flags read agreed) the
/// conditional job/application transitions. Two racing agree calls both
/// commit their own flag, both may observe both-agreed, and the conditional
/// `open` → `closed` job update elects exactly one of them as the finalizer.
///
/// `expected_offer_id`, when given, must still be the latest offer; a
/// mismatch means a counter-offer landed while the caller was deciding.
pub async fn agree(
    db: &DatabaseConnection,
    chat_id: Uuid,
    role: Role,
    expected_offer_id: Option<Uuid>,
) -> Result<AgreeOutcome, NegotiationError> {
    let txn = db.begin().await?;

    let session = get_session_by_chat_id(&txn, chat_id)
        .await?
        .ok_or(NegotiationError::MissingLink("the negotiation session"))?;

    let latest = latest_offer(&txn, session.id)
        .await?
        .ok_or(NegotiationError::NoOffer)?;

    if let Some(expected) = expected_offer_id {
        if expected != latest.id {
            return Err(NegotiationError::OfferSuperseded);
        }
    }

    // Already finalized (or left un-finalized by an earlier failure):
    // duplicate submissions re-run the conditional transitions and are
    // otherwise a no-op.
    if session.both_agreed() {
        let finalized_now = finalize_links(&txn, &session).await?;
        txn.commit().await?;
        return Ok(AgreeOutcome {
            session,
            finalized_now,
        });
    }

    // Duplicate agree for the same latest offer: no-op success.
    if session.agreement_for(role) == AgreementStatus::Agreed {
        txn.commit().await?;
        return Ok(AgreeOutcome {
            session,
            finalized_now: false,
        });
    }

    let job = job_db::get_job_by_id(&txn, session.job_id)
        .await?
        .ok_or(NegotiationError::MissingLink("the job"))?;
    if job.status != JobStatus::Open {
        return Err(NegotiationError::JobClosed);
    }

    sessions::Entity::update_many()
        .col_expr(agreement_column(role), Expr::value(AgreementStatus::Agreed))
        .col_expr(sessions::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(sessions::Column::Id.eq(session.id))
        .exec(&txn)
        .await?;

    let session = sessions::Entity::find_by_id(session.id)
        .one(&txn)
        .await?
        .ok_or(NegotiationError::MissingLink("the negotiation session"))?;

    let finalized_now = if session.both_agreed() {
        finalize_links(&txn, &session).await?
    } else {
        false
    };

    txn.commit().await?;
    Ok(AgreeOutcome {
        session,
        finalized_now,
    })
}

/// Self-healing for a both-agreed session whose job is still open, the
/// signature of a finalization transaction that failed after the agreement
/// flags were persisted. Re-runs the conditional transitions.
pub async fn reconcile_finalization(
    db: &DatabaseConnection,
    session: &sessions::Model,
) -> Result<bool, DbErr> {
    let txn = db.begin().await?;
    let closed_now = finalize_links(&txn, session).await?;
    txn.commit().await?;

    if closed_now {
        tracing::warn!(
            session_id = %session.id,
            "finalized a both-agreed session left open by an earlier failure"
        );
    }

    Ok(closed_now)
}

/// The finalization side effects, guarded so each transition happens at
/// most once: application → accepted (unless already accepted), job →
/// closed (only from open). Returns true when this call closed the job.
async fn finalize_links<C: ConnectionTrait>(
    conn: &C,
    session: &sessions::Model,
) -> Result<bool, DbErr> {
    application_db::accept_if_not_accepted(conn, session.application_id).await?;
    let job_rows = job_db::close_if_open(conn, session.job_id).await?;
    Ok(job_rows == 1)
}

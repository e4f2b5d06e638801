///! End-to-end tests for the negotiation state machine against a real
///! (in-memory SQLite) database, running the actual migrations.
///!
///! Covers the core invariants: idempotent session get-or-create, the
///! counterpart-flag reset on re-propose, exactly-once finalization across
///! duplicate agree calls, no premature finalization, and the rejection of
///! actions on finalized sessions.
///!
///! Run with: `cargo test --test negotiation_flow_test`
use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use std::time::Duration;
use uuid::Uuid;

use worklink_backend::db::applications as application_db;
use worklink_backend::db::jobs as job_db;
use worklink_backend::db::negotiations as negotiation_db;
use worklink_backend::db::negotiations::NegotiationError;
use worklink_backend::models::applications::{self, ApplicationStatus};
use worklink_backend::models::chats;
use worklink_backend::models::jobs::{self, JobStatus};
use worklink_backend::models::negotiation_sessions::{self, AgreementStatus};
use worklink_backend::models::offers::CreateOffer;
use worklink_backend::models::users::{self, Role};
use worklink_backend::negotiation::state::{Phase, derive_phase};

/// One seeded conversation: a provider with an open job, a seeker with an
/// application on it, and the chat pairing the two.
struct Fixture {
    db: DatabaseConnection,
    provider_id: Uuid,
    seeker_id: Uuid,
    job_id: Uuid,
    application_id: Uuid,
    chat: chats::Model,
}

/// Fresh in-memory database with the real schema. A single pooled
/// connection keeps every statement on the same SQLite instance.
async fn setup_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:".to_string());
    opts.max_connections(1);

    let db = Database::connect(opts)
        .await
        .expect("Failed to connect to in-memory SQLite");
    Migrator::up(&db, None).await.expect("Failed to run migrations");
    db
}

async fn seed() -> Fixture {
    let db = setup_db().await;
    let now = Utc::now();

    let provider = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set("helmi@example.com".to_string()),
        username: Set(Some("helmi".to_string())),
        display_name: Set(Some("Helmi".to_string())),
        avatar_url: Set(None),
        role: Set(Role::JobProvider),
        created_at: Set(now),
        updated_at: Set(None),
    }
    .insert(&db)
    .await
    .expect("insert provider");

    let seeker = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set("naufal@example.com".to_string()),
        username: Set(Some("naufal".to_string())),
        display_name: Set(Some("Naufal".to_string())),
        avatar_url: Set(None),
        role: Set(Role::JobSeeker),
        created_at: Set(now),
        updated_at: Set(None),
    }
    .insert(&db)
    .await
    .expect("insert seeker");

    let job = jobs::ActiveModel {
        id: Set(Uuid::new_v4()),
        provider_id: Set(provider.id),
        title: Set("House cleaning".to_string()),
        location: Set("Depok, Jawa Barat".to_string()),
        date_time: Set(now),
        status: Set(JobStatus::Open),
        created_at: Set(now),
    }
    .insert(&db)
    .await
    .expect("insert job");

    let application = applications::ActiveModel {
        id: Set(Uuid::new_v4()),
        job_id: Set(job.id),
        seeker_id: Set(seeker.id),
        status: Set(ApplicationStatus::OnNegotiation),
        created_at: Set(now),
    }
    .insert(&db)
    .await
    .expect("insert application");

    let chat = chats::ActiveModel {
        id: Set(Uuid::new_v4()),
        job_id: Set(job.id),
        application_id: Set(application.id),
        provider_id: Set(provider.id),
        seeker_id: Set(seeker.id),
        created_at: Set(now),
    }
    .insert(&db)
    .await
    .expect("insert chat");

    Fixture {
        db,
        provider_id: provider.id,
        seeker_id: seeker.id,
        job_id: job.id,
        application_id: application.id,
        chat,
    }
}

/// Propose terms as one side, with a small pause so creation timestamps
/// strictly increase.
async fn propose(
    fx: &Fixture,
    session: &negotiation_sessions::Model,
    role: Role,
    price: i64,
) -> worklink_backend::models::offers::Model {
    tokio::time::sleep(Duration::from_millis(5)).await;

    let sender_id = match role {
        Role::JobProvider => fx.provider_id,
        Role::JobSeeker => fx.seeker_id,
    };

    negotiation_db::append_offer(
        &fx.db,
        session,
        CreateOffer {
            session_id: session.id,
            sender_id,
            sender_role: role,
            price,
            hours_per_day: 3,
            days_per_week: 5,
        },
    )
    .await
    .expect("append offer")
}

async fn reload_session(fx: &Fixture, id: Uuid) -> negotiation_sessions::Model {
    negotiation_db::get_session_by_id(&fx.db, id)
        .await
        .expect("reload session")
        .expect("session exists")
}

#[tokio::test]
async fn get_or_create_yields_one_session_for_repeated_calls() {
    let fx = seed().await;

    let first = negotiation_db::get_or_create_session(&fx.db, &fx.chat)
        .await
        .expect("first get-or-create");
    let second = negotiation_db::get_or_create_session(&fx.db, &fx.chat)
        .await
        .expect("second get-or-create");

    assert_eq!(first.id, second.id);
    assert_eq!(first.provider_agreement, AgreementStatus::Pending);
    assert_eq!(first.seeker_agreement, AgreementStatus::Pending);
    assert_eq!(first.provider_id, fx.provider_id);
    assert_eq!(first.seeker_id, fx.seeker_id);
}

#[tokio::test]
async fn first_offer_sets_the_table_without_touching_flags() {
    // Scenario: empty session, then the provider proposes.
    let fx = seed().await;
    let session = negotiation_db::get_or_create_session(&fx.db, &fx.chat)
        .await
        .unwrap();

    let offer = propose(&fx, &session, Role::JobProvider, 300_000).await;
    assert_eq!(offer.price, 300_000);
    assert_eq!(offer.sender_role, Role::JobProvider);

    let offers = negotiation_db::list_offers(&fx.db, session.id).await.unwrap();
    assert_eq!(offers.len(), 1);

    let session = reload_session(&fx, session.id).await;
    assert_eq!(session.provider_agreement, AgreementStatus::Pending);
    assert_eq!(session.seeker_agreement, AgreementStatus::Pending);

    assert_eq!(
        derive_phase(&session, offers.first(), Role::JobProvider),
        Phase::AwaitingCounterparty
    );
    assert_eq!(
        derive_phase(&session, offers.first(), Role::JobSeeker),
        Phase::CanAccept
    );
}

#[tokio::test]
async fn one_agreement_does_not_finalize() {
    let fx = seed().await;
    let session = negotiation_db::get_or_create_session(&fx.db, &fx.chat)
        .await
        .unwrap();
    propose(&fx, &session, Role::JobProvider, 300_000).await;

    let outcome = negotiation_db::agree(&fx.db, fx.chat.id, Role::JobSeeker, None)
        .await
        .expect("seeker agrees");

    assert!(!outcome.finalized_now);
    assert_eq!(outcome.session.seeker_agreement, AgreementStatus::Agreed);
    assert_eq!(outcome.session.provider_agreement, AgreementStatus::Pending);

    // The job and application must be untouched while one flag is pending.
    let job = job_db::get_job_by_id(&fx.db, fx.job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Open);
    let application = application_db::get_application_by_id(&fx.db, fx.application_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(application.status, ApplicationStatus::OnNegotiation);
}

#[tokio::test]
async fn second_agreement_finalizes_exactly_once() {
    let fx = seed().await;
    let session = negotiation_db::get_or_create_session(&fx.db, &fx.chat)
        .await
        .unwrap();
    propose(&fx, &session, Role::JobProvider, 300_000).await;

    negotiation_db::agree(&fx.db, fx.chat.id, Role::JobSeeker, None)
        .await
        .expect("seeker agrees");
    let second = negotiation_db::agree(&fx.db, fx.chat.id, Role::JobProvider, None)
        .await
        .expect("provider agrees");

    assert!(second.finalized_now);
    assert!(second.session.both_agreed());

    let job = job_db::get_job_by_id(&fx.db, fx.job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Closed);
    let application = application_db::get_application_by_id(&fx.db, fx.application_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(application.status, ApplicationStatus::Accepted);

    // A duplicate trigger (client retry) must not report finalization again.
    let retry = negotiation_db::agree(&fx.db, fx.chat.id, Role::JobProvider, None)
        .await
        .expect("duplicate agree is a no-op success");
    assert!(!retry.finalized_now);
    assert!(retry.session.both_agreed());
}

#[tokio::test]
async fn agreeing_twice_before_the_counterpart_is_a_noop() {
    let fx = seed().await;
    let session = negotiation_db::get_or_create_session(&fx.db, &fx.chat)
        .await
        .unwrap();
    propose(&fx, &session, Role::JobProvider, 300_000).await;

    negotiation_db::agree(&fx.db, fx.chat.id, Role::JobSeeker, None)
        .await
        .unwrap();
    let repeat = negotiation_db::agree(&fx.db, fx.chat.id, Role::JobSeeker, None)
        .await
        .expect("duplicate one-sided agree succeeds");

    assert!(!repeat.finalized_now);
    assert_eq!(repeat.session.seeker_agreement, AgreementStatus::Agreed);
    assert_eq!(repeat.session.provider_agreement, AgreementStatus::Pending);

    let job = job_db::get_job_by_id(&fx.db, fx.job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Open);
}

#[tokio::test]
async fn counter_offer_resets_the_standing_agreement() {
    // Scenario: the provider agrees, then the seeker counters before the
    // deal closes. The provider's agreement referred to terms that no
    // longer exist, so it must read pending again.
    let fx = seed().await;
    let session = negotiation_db::get_or_create_session(&fx.db, &fx.chat)
        .await
        .unwrap();
    propose(&fx, &session, Role::JobSeeker, 300_000).await;

    negotiation_db::agree(&fx.db, fx.chat.id, Role::JobProvider, None)
        .await
        .expect("provider agrees");
    let session = reload_session(&fx, session.id).await;
    assert_eq!(session.provider_agreement, AgreementStatus::Agreed);

    propose(&fx, &session, Role::JobSeeker, 350_000).await;

    let session = reload_session(&fx, session.id).await;
    assert_eq!(session.provider_agreement, AgreementStatus::Pending);
    assert_eq!(session.seeker_agreement, AgreementStatus::Pending);

    let job = job_db::get_job_by_id(&fx.db, fx.job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Open);

    // Both sides must now agree to the new terms for the deal to close.
    negotiation_db::agree(&fx.db, fx.chat.id, Role::JobProvider, None)
        .await
        .unwrap();
    let last = negotiation_db::agree(&fx.db, fx.chat.id, Role::JobSeeker, None)
        .await
        .unwrap();
    assert!(last.finalized_now);
}

#[tokio::test]
async fn agreeing_to_nothing_is_rejected() {
    let fx = seed().await;
    negotiation_db::get_or_create_session(&fx.db, &fx.chat)
        .await
        .unwrap();

    let result = negotiation_db::agree(&fx.db, fx.chat.id, Role::JobSeeker, None).await;
    assert!(matches!(result, Err(NegotiationError::NoOffer)));
}

#[tokio::test]
async fn agreeing_to_a_superseded_offer_is_a_retryable_conflict() {
    let fx = seed().await;
    let session = negotiation_db::get_or_create_session(&fx.db, &fx.chat)
        .await
        .unwrap();

    let first = propose(&fx, &session, Role::JobProvider, 300_000).await;
    propose(&fx, &session, Role::JobSeeker, 280_000).await;

    // The provider still has the first offer on screen.
    let result =
        negotiation_db::agree(&fx.db, fx.chat.id, Role::JobProvider, Some(first.id)).await;
    assert!(matches!(result, Err(NegotiationError::OfferSuperseded)));

    // Re-fetching and retrying against the current offer works.
    let latest = negotiation_db::latest_offer(&fx.db, session.id)
        .await
        .unwrap()
        .unwrap();
    let outcome =
        negotiation_db::agree(&fx.db, fx.chat.id, Role::JobProvider, Some(latest.id))
            .await
            .expect("agree against the current offer");
    assert_eq!(outcome.session.provider_agreement, AgreementStatus::Agreed);
}

#[tokio::test]
async fn finalized_sessions_reject_new_offers() {
    let fx = seed().await;
    let session = negotiation_db::get_or_create_session(&fx.db, &fx.chat)
        .await
        .unwrap();
    propose(&fx, &session, Role::JobProvider, 300_000).await;

    negotiation_db::agree(&fx.db, fx.chat.id, Role::JobSeeker, None)
        .await
        .unwrap();
    negotiation_db::agree(&fx.db, fx.chat.id, Role::JobProvider, None)
        .await
        .unwrap();

    let session = reload_session(&fx, session.id).await;
    let result = negotiation_db::append_offer(
        &fx.db,
        &session,
        CreateOffer {
            session_id: session.id,
            sender_id: fx.provider_id,
            sender_role: Role::JobProvider,
            price: 350_000,
            hours_per_day: 3,
            days_per_week: 5,
        },
    )
    .await;

    assert!(matches!(result, Err(NegotiationError::JobClosed)));

    // The log is untouched by the rejected attempt.
    let offers = negotiation_db::list_offers(&fx.db, session.id).await.unwrap();
    assert_eq!(offers.len(), 1);
}

#[tokio::test]
async fn offers_are_immutable_once_created() {
    let fx = seed().await;
    let session = negotiation_db::get_or_create_session(&fx.db, &fx.chat)
        .await
        .unwrap();

    let first = propose(&fx, &session, Role::JobProvider, 300_000).await;
    propose(&fx, &session, Role::JobSeeker, 280_000).await;
    negotiation_db::agree(&fx.db, fx.chat.id, Role::JobProvider, None)
        .await
        .unwrap();

    // After more activity, the first offer reads back unchanged.
    let offers = negotiation_db::list_offers(&fx.db, session.id).await.unwrap();
    let reread = offers.iter().find(|o| o.id == first.id).expect("still there");
    assert_eq!(reread.price, 300_000);
    assert_eq!(reread.hours_per_day, 3);
    assert_eq!(reread.days_per_week, 5);
    assert_eq!(reread.sender_id, fx.provider_id);
}

#[tokio::test]
async fn latest_offer_follows_creation_order() {
    let fx = seed().await;
    let session = negotiation_db::get_or_create_session(&fx.db, &fx.chat)
        .await
        .unwrap();

    propose(&fx, &session, Role::JobProvider, 300_000).await;
    let counter = propose(&fx, &session, Role::JobSeeker, 280_000).await;

    let latest = negotiation_db::latest_offer(&fx.db, session.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(latest.id, counter.id);

    let offers = negotiation_db::list_offers(&fx.db, session.id).await.unwrap();
    assert_eq!(offers.first().unwrap().id, counter.id); // newest first
}

#[tokio::test]
async fn reconciliation_heals_a_both_agreed_session_left_open() {
    // Simulate a finalization transaction that failed after the flags were
    // persisted: both flags agreed, job still open.
    let fx = seed().await;
    let session = negotiation_db::get_or_create_session(&fx.db, &fx.chat)
        .await
        .unwrap();
    propose(&fx, &session, Role::JobProvider, 300_000).await;

    let mut active: negotiation_sessions::ActiveModel = session.clone().into();
    active.provider_agreement = Set(AgreementStatus::Agreed);
    active.seeker_agreement = Set(AgreementStatus::Agreed);
    let session = active.update(&fx.db).await.expect("force both-agreed");

    let job = job_db::get_job_by_id(&fx.db, fx.job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Open);

    let closed_now = negotiation_db::reconcile_finalization(&fx.db, &session)
        .await
        .expect("reconcile");
    assert!(closed_now);

    let job = job_db::get_job_by_id(&fx.db, fx.job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Closed);
    let application = application_db::get_application_by_id(&fx.db, fx.application_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(application.status, ApplicationStatus::Accepted);

    // Running it again is a no-op.
    let again = negotiation_db::reconcile_finalization(&fx.db, &session)
        .await
        .expect("second reconcile");
    assert!(!again);
}

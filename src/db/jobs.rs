use sea_orm::prelude::Expr;
use sea_orm::*;
use uuid::Uuid;

use crate::models::jobs::{self, JobStatus};

/// Fetch a single job by ID. Generic over the connection so it can run
/// inside the negotiation transactions.
pub async fn get_job_by_id<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<Option<jobs::Model>, DbErr> {
    jobs::Entity::find_by_id(id).one(conn).await
}

/// Conditionally close a job: only the `open` → `closed` transition is ever
/// written. Returns rows affected: 1 when this call performed the
/// transition, 0 when the job was already closed. This is the exactly-once
/// guard for finalization.
pub async fn close_if_open<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<u64, DbErr> {
    let result = jobs::Entity::update_many()
        .col_expr(jobs::Column::Status, Expr::value(JobStatus::Closed))
        .filter(jobs::Column::Id.eq(id))
        .filter(jobs::Column::Status.eq(JobStatus::Open))
        .exec(conn)
        .await?;

    Ok(result.rows_affected)
}

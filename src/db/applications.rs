use sea_orm::prelude::Expr;
use sea_orm::*;
use uuid::Uuid;

use crate::models::applications::{self, ApplicationStatus};

/// Fetch a single application by ID.
pub async fn get_application_by_id<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<Option<applications::Model>, DbErr> {
    applications::Entity::find_by_id(id).one(conn).await
}

/// Conditionally accept an application: a no-op when it is already
/// `accepted`, so a duplicate finalization trigger cannot double-transition.
pub async fn accept_if_not_accepted<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<u64, DbErr> {
    let result = applications::Entity::update_many()
        .col_expr(
            applications::Column::Status,
            Expr::value(ApplicationStatus::Accepted),
        )
        .filter(applications::Column::Id.eq(id))
        .filter(applications::Column::Status.ne(ApplicationStatus::Accepted))
        .exec(conn)
        .await?;

    Ok(result.rows_affected)
}

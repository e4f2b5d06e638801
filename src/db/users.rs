use sea_orm::*;

use crate::db::is_unique_violation;
use crate::models::users::{self, CreateUserFromAuth};

/// Find the user row matching the token's subject, creating it from the
/// claims on first sight. Two concurrent first requests race on the insert;
/// the loser re-reads the winner's row.
pub async fn find_or_create_from_auth(
    db: &DatabaseConnection,
    input: CreateUserFromAuth,
) -> Result<users::Model, DbErr> {
    if let Some(user) = users::Entity::find_by_id(input.id).one(db).await? {
        return Ok(user);
    }

    let new_user = users::ActiveModel {
        id: Set(input.id),
        email: Set(input.email),
        username: Set(input.username),
        display_name: Set(input.display_name),
        avatar_url: Set(None),
        role: Set(input.role),
        created_at: Set(chrono::Utc::now()),
        updated_at: Set(None),
    };

    match new_user.insert(db).await {
        Ok(user) => Ok(user),
        Err(e) if is_unique_violation(&e) => users::Entity::find_by_id(input.id)
            .one(db)
            .await?
            .ok_or(e),
        Err(e) => Err(e),
    }
}

use sea_orm::*;
use uuid::Uuid;

use crate::models::chats;

/// Fetch a single chat (parent conversation) by ID.
pub async fn get_chat_by_id(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<chats::Model>, DbErr> {
    chats::Entity::find_by_id(id).one(db).await
}

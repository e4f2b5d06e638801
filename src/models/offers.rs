use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::users::Role;

/// SeaORM entity for the `offers` table.
///
/// Append-only: rows are inserted by the propose flow and never updated or
/// deleted. "The latest offer" is the max of (`created_at`, `id`).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "offers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub session_id: Uuid,
    pub sender_id: Uuid,
    pub sender_role: Role,
    pub price: i64,
    pub hours_per_day: i32,
    pub days_per_week: i32,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::negotiation_sessions::Entity",
        from = "Column::SessionId",
        to = "super::negotiation_sessions::Column::Id"
    )]
    Session,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::SenderId",
        to = "super::users::Column::Id"
    )]
    Sender,
}

impl Related<super::negotiation_sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sender.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

/// DTO for appending an offer (used internally by the propose flow; terms
/// are validated before this is constructed).
#[derive(Debug, Clone)]
pub struct CreateOffer {
    pub session_id: Uuid,
    pub sender_id: Uuid,
    pub sender_role: Role,
    pub price: i64,
    pub hours_per_day: i32,
    pub days_per_week: i32,
}

/// Response DTO for offers, sent over both REST and the realtime channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferResponse {
    pub id: Uuid,
    pub session_id: Uuid,
    pub sender_id: Uuid,
    pub sender_role: Role,
    pub price: i64,
    pub hours_per_day: i32,
    pub days_per_week: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Model> for OfferResponse {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            session_id: m.session_id,
            sender_id: m.sender_id,
            sender_role: m.sender_role,
            price: m.price,
            hours_per_day: m.hours_per_day,
            days_per_week: m.days_per_week,
            created_at: m.created_at,
        }
    }
}

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Job status stored as a lowercase string in the database.
///
/// The negotiation core only ever writes `Closed`, and only through the
/// finalization path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum JobStatus {
    #[sea_orm(string_value = "open")]
    #[serde(rename = "open")]
    Open,
    #[sea_orm(string_value = "closed")]
    #[serde(rename = "closed")]
    Closed,
}

/// SeaORM entity for the `jobs` table.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "jobs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub provider_id: Uuid,
    pub title: String,
    pub location: String,
    pub date_time: DateTimeUtc,
    pub status: JobStatus,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::ProviderId",
        to = "super::users::Column::Id"
    )]
    Provider,
    #[sea_orm(has_many = "super::applications::Entity")]
    Applications,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Provider.def()
    }
}

impl Related<super::applications::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Applications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

/// Read-only slice of the parent job shown in the negotiation panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub location: String,
    pub date_time: DateTimeUtc,
}

impl From<Model> for JobSnapshot {
    fn from(m: Model) -> Self {
        Self {
            location: m.location,
            date_time: m.date_time,
        }
    }
}

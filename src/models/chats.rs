use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::users::Role;

/// SeaORM entity for the `chats` table.
///
/// The parent conversation: one job, one application, one provider, one
/// seeker. Negotiation sessions are keyed by this row's id.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "chats")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub job_id: Uuid,
    #[sea_orm(unique)]
    pub application_id: Uuid,
    pub provider_id: Uuid,
    pub seeker_id: Uuid,
    pub created_at: DateTimeUtc,
}

impl Model {
    /// The role a user holds in this conversation, or `None` for outsiders.
    pub fn role_of(&self, user_id: Uuid) -> Option<Role> {
        if user_id == self.provider_id {
            Some(Role::JobProvider)
        } else if user_id == self.seeker_id {
            Some(Role::JobSeeker)
        } else {
            None
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::jobs::Entity",
        from = "Column::JobId",
        to = "super::jobs::Column::Id"
    )]
    Job,
    #[sea_orm(
        belongs_to = "super::applications::Entity",
        from = "Column::ApplicationId",
        to = "super::applications::Column::Id"
    )]
    Application,
}

impl Related<super::jobs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Job.def()
    }
}

impl Related<super::applications::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Application.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

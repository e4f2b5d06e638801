use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::users::Role;

/// Per-participant agreement flag, stored as a lowercase string.
///
/// `Agreed` always refers to the latest offer in the session's log: a new
/// offer resets the counterpart's flag back to `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum AgreementStatus {
    #[sea_orm(string_value = "pending")]
    #[serde(rename = "pending")]
    Pending,
    #[sea_orm(string_value = "agreed")]
    #[serde(rename = "agreed")]
    Agreed,
}

/// SeaORM entity for the `negotiation_sessions` table.
///
/// One session per chat (unique `chat_id`), pairing the provider and the
/// seeker of the parent conversation to one job and one application. The row
/// is the serialization point for all agreement mutations.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "negotiation_sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub chat_id: Uuid,
    pub job_id: Uuid,
    pub application_id: Uuid,
    pub provider_id: Uuid,
    pub seeker_id: Uuid,
    pub provider_agreement: AgreementStatus,
    pub seeker_agreement: AgreementStatus,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// The role a user holds in this session, or `None` for outsiders.
    pub fn role_of(&self, user_id: Uuid) -> Option<Role> {
        if user_id == self.provider_id {
            Some(Role::JobProvider)
        } else if user_id == self.seeker_id {
            Some(Role::JobSeeker)
        } else {
            None
        }
    }

    /// Role-keyed accessor for the agreement flags. All role-dependent reads
    /// go through here instead of selecting a field by name at runtime.
    pub fn agreement_for(&self, role: Role) -> AgreementStatus {
        match role {
            Role::JobProvider => self.provider_agreement,
            Role::JobSeeker => self.seeker_agreement,
        }
    }

    pub fn both_agreed(&self) -> bool {
        self.provider_agreement == AgreementStatus::Agreed
            && self.seeker_agreement == AgreementStatus::Agreed
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::chats::Entity",
        from = "Column::ChatId",
        to = "super::chats::Column::Id"
    )]
    Chat,
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
    #[sea_orm(has_many = "super::offers::Entity")]
    Offers,
}

impl Related<super::chats::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Chat.def()
    }
}

impl Related<super::offers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Offers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

/// The pair of agreement flags, as broadcast in `status-updated` events and
/// returned by the agree endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgreementFlags {
    pub provider_agreement: AgreementStatus,
    pub seeker_agreement: AgreementStatus,
}

impl From<&Model> for AgreementFlags {
    fn from(m: &Model) -> Self {
        Self {
            provider_agreement: m.provider_agreement,
            seeker_agreement: m.seeker_agreement,
        }
    }
}

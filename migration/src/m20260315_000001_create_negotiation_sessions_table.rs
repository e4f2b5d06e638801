use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Identifiers for the `negotiation_sessions` table and its columns.
///
/// `chat_id` carries a UNIQUE constraint: concurrent get-or-create callers
/// race on the insert and the loser re-reads the winner's row.
#[derive(DeriveIden)]
enum NegotiationSessions {
    Table,
    Id,
    ChatId,
    JobId,
    ApplicationId,
    ProviderId,
    SeekerId,
    ProviderAgreement,
    SeekerAgreement,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Chats {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Jobs {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Applications {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(NegotiationSessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(NegotiationSessions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(NegotiationSessions::ChatId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(NegotiationSessions::JobId).uuid().not_null())
                    .col(
                        ColumnDef::new(NegotiationSessions::ApplicationId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(NegotiationSessions::ProviderId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(NegotiationSessions::SeekerId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(NegotiationSessions::ProviderAgreement)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(NegotiationSessions::SeekerAgreement)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(NegotiationSessions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(NegotiationSessions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_negotiation_sessions_chat_id")
                            .from(NegotiationSessions::Table, NegotiationSessions::ChatId)
                            .to(Chats::Table, Chats::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_negotiation_sessions_job_id")
                            .from(NegotiationSessions::Table, NegotiationSessions::JobId)
                            .to(Jobs::Table, Jobs::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_negotiation_sessions_application_id")
                            .from(
                                NegotiationSessions::Table,
                                NegotiationSessions::ApplicationId,
                            )
                            .to(Applications::Table, Applications::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(NegotiationSessions::Table).to_owned())
            .await
    }
}

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Identifiers for the `offers` table and its columns.
///
/// Offers are append-only: no update path exists anywhere in the codebase
/// and rows are never deleted while their session survives.
#[derive(DeriveIden)]
enum Offers {
    Table,
    Id,
    SessionId,
    SenderId,
    SenderRole,
    Price,
    HoursPerDay,
    DaysPerWeek,
    CreatedAt,
}

#[derive(DeriveIden)]
enum NegotiationSessions {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Offers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Offers::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Offers::SessionId).uuid().not_null())
                    .col(ColumnDef::new(Offers::SenderId).uuid().not_null())
                    .col(ColumnDef::new(Offers::SenderRole).string().not_null())
                    .col(ColumnDef::new(Offers::Price).big_integer().not_null())
                    .col(ColumnDef::new(Offers::HoursPerDay).integer().not_null())
                    .col(ColumnDef::new(Offers::DaysPerWeek).integer().not_null())
                    .col(
                        ColumnDef::new(Offers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_offers_session_id")
                            .from(Offers::Table, Offers::SessionId)
                            .to(NegotiationSessions::Table, NegotiationSessions::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_offers_sender_id")
                            .from(Offers::Table, Offers::SenderId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Offers::Table).to_owned())
            .await
    }
}

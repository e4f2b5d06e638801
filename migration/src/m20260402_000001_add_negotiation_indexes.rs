use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Offers {
    Table,
    SessionId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Chats {
    Table,
    ProviderId,
    SeekerId,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Offer history is always read per session, ordered by creation time.
        manager
            .create_index(
                Index::create()
                    .name("idx_offers_session_created")
                    .table(Offers::Table)
                    .col(Offers::SessionId)
                    .col(Offers::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_chats_provider")
                    .table(Chats::Table)
                    .col(Chats::ProviderId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_chats_seeker")
                    .table(Chats::Table)
                    .col(Chats::SeekerId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_offers_session_created")
                    .table(Offers::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_chats_provider")
                    .table(Chats::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_chats_seeker")
                    .table(Chats::Table)
                    .to_owned(),
            )
            .await
    }
}

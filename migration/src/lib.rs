pub use sea_orm_migration::prelude::*;

mod m20260302_000001_create_users_table;
mod m20260302_000002_create_jobs_table;
mod m20260302_000003_create_applications_table;
mod m20260302_000004_create_chats_table;
mod m20260315_000001_create_negotiation_sessions_table;
mod m20260315_000002_create_offers_table;
mod m20260402_000001_add_negotiation_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260302_000001_create_users_table::Migration),
            Box::new(m20260302_000002_create_jobs_table::Migration),
            Box::new(m20260302_000003_create_applications_table::Migration),
            Box::new(m20260302_000004_create_chats_table::Migration),
            Box::new(m20260315_000001_create_negotiation_sessions_table::Migration),
            Box::new(m20260315_000002_create_offers_table::Migration),
            Box::new(m20260402_000001_add_negotiation_indexes::Migration),
        ]
    }
}

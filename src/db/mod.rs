pub mod applications;
pub mod chats;
pub mod jobs;
pub mod negotiations;
pub mod users;

use sea_orm::{Database, DatabaseConnection, DbErr, SqlErr};
use std::env;

/// Create a SeaORM database connection pool from the `DATABASE_URL` env var.
pub async fn create_pool() -> DatabaseConnection {
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    Database::connect(&database_url)
        .await
        .expect("Failed to connect to database")
}

/// True when the error is the backend's unique-constraint violation, the
/// signal that a concurrent writer won an insert race.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{info, instrument, warn};

use crate::shared::AppError;

/// Connects to PostgreSQL and applies pending schema migrations
#[instrument(skip(database_url))]
pub async fn connect(database_url: &str) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to connect to database");
            AppError::DatabaseError(e.to_string())
        })?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to run database migrations");
            AppError::DatabaseError(e.to_string())
        })?;

    info!("Database connected and migrations applied");
    Ok(pool)
}

/// True when the error is a Postgres unique-constraint violation (SQLSTATE 23505)
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

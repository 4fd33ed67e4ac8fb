//! PostgreSQL access: connection pool, schema migrations, row models and
//! repositories, plus adapters implementing the domain's storage traits.

use sqlx::postgres::PgPoolOptions;

pub mod migrations;
pub mod models;
pub mod repositories;

pub use migrations::{rollback, run_migrations, run_migrations_through, MigrationError};

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// The server's version string, as reported by `SHOW server_version`.
pub async fn server_version(pool: &DbPool) -> Result<String, sqlx::Error> {
    sqlx::query_scalar("SHOW server_version").fetch_one(pool).await
}

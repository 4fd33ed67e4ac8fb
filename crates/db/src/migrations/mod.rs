//! Schema migration registry and executor.
//!
//! Migrations are applied in registry order, each inside its own
//! transaction, and recorded in `schema_migrations`. Reverting runs the
//! `down` scripts of the most recent migrations in reverse order.
//!
//! A migration without a `down` script (a data-reshaping upgrade) cannot be
//! reverted; asking to do so fails before anything is touched.

use sqlx::{PgConnection, PgPool};
use scholar_core::types::Timestamp;

/// Advisory lock held while migrating, so concurrent start-ups serialize.
const MIGRATION_LOCK_ID: i64 = 5_310_001;

const CREATE_BOOKKEEPING_TABLE: &str = "\
    CREATE TABLE IF NOT EXISTS schema_migrations (\
        name VARCHAR(255) PRIMARY KEY, \
        applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()\
    )";

/// A named schema change.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub name: &'static str,
    up: &'static str,
    down: Option<&'static str>,
}

impl Migration {
    pub fn is_reversible(&self) -> bool {
        self.down.is_some()
    }
}

macro_rules! migration {
    ($name:literal) => {
        Migration {
            name: $name,
            up: include_str!(concat!("../../migrations/", $name, ".up.sql")),
            down: Some(include_str!(concat!("../../migrations/", $name, ".down.sql"))),
        }
    };
    ($name:literal, irreversible) => {
        Migration {
            name: $name,
            up: include_str!(concat!("../../migrations/", $name, ".up.sql")),
            down: None,
        }
    };
}

/// Every migration, in application order. Names must never change.
pub const MIGRATIONS: &[Migration] = &[
    migration!("0001_site"),
    migration!("0002_announcements"),
    migration!("0003_scheduled_tasks"),
    migration!("0004_section_editors"),
    migration!("0005_subeditor_categories", irreversible),
    migration!("0006_payments"),
    migration!("0007_navigation_menus"),
    migration!("0008_data_object_tombstones"),
    migration!("0009_controlled_vocabs"),
    migration!("0010_pub_object_identifiers"),
];

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Migration {migration} cannot be reverted")]
    DowngradeNotSupported { migration: &'static str },

    #[error("Database has migration {0} which this build does not know")]
    UnknownMigration(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// A row of `schema_migrations`.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct AppliedMigration {
    pub name: String,
    pub applied_at: Timestamp,
}

fn find(name: &str) -> Option<&'static Migration> {
    MIGRATIONS.iter().find(|m| m.name == name)
}

async fn ensure_bookkeeping(conn: &mut PgConnection) -> Result<(), sqlx::Error> {
    sqlx::query(CREATE_BOOKKEEPING_TABLE).execute(&mut *conn).await?;
    Ok(())
}

async fn lock(conn: &mut PgConnection) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(MIGRATION_LOCK_ID)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

async fn applied_names(conn: &mut PgConnection) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar("SELECT name FROM schema_migrations ORDER BY name")
        .fetch_all(&mut *conn)
        .await
}

/// Migrations recorded as applied, oldest first.
pub async fn applied(pool: &PgPool) -> Result<Vec<AppliedMigration>, MigrationError> {
    let mut conn = pool.acquire().await?;
    ensure_bookkeeping(&mut conn).await?;
    let rows = sqlx::query_as::<_, AppliedMigration>(
        "SELECT name, applied_at FROM schema_migrations ORDER BY name",
    )
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows)
}

/// Names of registered migrations not yet applied, in application order.
pub async fn pending(pool: &PgPool) -> Result<Vec<&'static str>, MigrationError> {
    let mut conn = pool.acquire().await?;
    ensure_bookkeeping(&mut conn).await?;
    let done = applied_names(&mut conn).await?;
    Ok(MIGRATIONS
        .iter()
        .filter(|m| !done.iter().any(|d| d == m.name))
        .map(|m| m.name)
        .collect())
}

/// Apply every pending migration. Returns the names applied by this call.
pub async fn run_migrations(pool: &PgPool) -> Result<Vec<&'static str>, MigrationError> {
    run_migrations_through(pool, None).await
}

/// Apply pending migrations up to and including `last` (all when `None`).
pub async fn run_migrations_through(
    pool: &PgPool,
    last: Option<&str>,
) -> Result<Vec<&'static str>, MigrationError> {
    if let Some(last) = last {
        if find(last).is_none() {
            return Err(MigrationError::UnknownMigration(last.to_string()));
        }
    }
    {
        let mut conn = pool.acquire().await?;
        ensure_bookkeeping(&mut conn).await?;
        for name in applied_names(&mut conn).await? {
            if find(&name).is_none() {
                return Err(MigrationError::UnknownMigration(name));
            }
        }
    }

    let mut newly_applied = Vec::new();
    for migration in MIGRATIONS {
        let mut tx = pool.begin().await?;
        lock(&mut tx).await?;

        let already: Option<String> =
            sqlx::query_scalar("SELECT name FROM schema_migrations WHERE name = $1")
                .bind(migration.name)
                .fetch_optional(&mut *tx)
                .await?;
        if already.is_some() {
            if last == Some(migration.name) {
                break;
            }
            continue;
        }

        sqlx::raw_sql(migration.up).execute(&mut *tx).await?;
        sqlx::query("INSERT INTO schema_migrations (name) VALUES ($1)")
            .bind(migration.name)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!(migration = migration.name, "Applied migration");
        newly_applied.push(migration.name);

        if last == Some(migration.name) {
            break;
        }
    }
    Ok(newly_applied)
}

/// Revert the `steps` most recently applied migrations, newest first.
///
/// Fails with [`MigrationError::DowngradeNotSupported`] without changing
/// anything if any of them cannot be reverted. Returns the names reverted.
pub async fn rollback(pool: &PgPool, steps: usize) -> Result<Vec<&'static str>, MigrationError> {
    let mut tx = pool.begin().await?;
    ensure_bookkeeping(&mut tx).await?;
    lock(&mut tx).await?;

    let done = applied_names(&mut tx).await?;
    let mut targets = Vec::with_capacity(steps);
    for name in done.iter().rev().take(steps) {
        let migration = find(name).ok_or_else(|| MigrationError::UnknownMigration(name.clone()))?;
        targets.push(migration);
    }

    if let Some(blocked) = targets.iter().find(|m| !m.is_reversible()) {
        tracing::warn!(migration = blocked.name, "Refusing to revert irreversible migration");
        return Err(MigrationError::DowngradeNotSupported {
            migration: blocked.name,
        });
    }

    let mut reverted = Vec::with_capacity(targets.len());
    for migration in targets {
        if let Some(down) = migration.down {
            sqlx::raw_sql(down).execute(&mut *tx).await?;
        }
        sqlx::query("DELETE FROM schema_migrations WHERE name = $1")
            .bind(migration.name)
            .execute(&mut *tx)
            .await?;
        tracing::info!(migration = migration.name, "Reverted migration");
        reverted.push(migration.name);
    }
    tx.commit().await?;
    Ok(reverted)
}

//! Schema definitions and migration utilities.
//!
//! The schema is embedded at compile time and applied with `raw_sql`, so a
//! deployed binary does not need the `migrations/` directory next to it.

use sqlx::PgPool;

use crate::error::{StoreError, StoreResult};

/// Embedded migration SQL for the schema (001_schema.sql).
pub const SCHEMA_MIGRATION: &str = include_str!("../../../migrations/001_schema.sql");

/// Tables the service cannot run without.
const REQUIRED_TABLES: [&str; 3] = ["users", "notes", "logs"];

/// Apply the schema.
///
/// Idempotent: every statement is `IF NOT EXISTS`, so this can run on every
/// startup.
pub async fn run_migrations(pool: &PgPool) -> StoreResult<()> {
    tracing::info!("Running database migrations...");

    sqlx::raw_sql(SCHEMA_MIGRATION)
        .execute(pool)
        .await
        .map_err(|e| StoreError::MigrationError(format!("Schema migration failed: {}", e)))?;

    tracing::info!("Migrations completed successfully");
    Ok(())
}

/// Check if the schema has been initialized.
///
/// Returns true if all of `users`, `notes` and `logs` exist.
pub async fn is_schema_initialized(pool: &PgPool) -> StoreResult<bool> {
    let tables: Vec<String> = REQUIRED_TABLES.iter().map(|t| t.to_string()).collect();

    let found: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM information_schema.tables
        WHERE table_schema = 'public'
        AND table_name = ANY($1)
        "#,
    )
    .bind(&tables)
    .fetch_one(pool)
    .await?;

    Ok(found == REQUIRED_TABLES.len() as i64)
}

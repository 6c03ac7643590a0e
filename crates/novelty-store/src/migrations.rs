//! Database schema migrations.
//!
//! Applies the initial schema: the proposals table holding one row per
//! ingested document (key, text, embedding blob), plus the
//! schema_migrations tracking table.

use rusqlite::Connection;
use tracing::info;

use novelty_core::error::NoveltyError;

/// Run all pending database migrations.
///
/// Currently implements the initial schema (version 1). Future migrations
/// can be added by checking the current version and applying incremental changes.
pub fn run_migrations(conn: &Connection) -> Result<(), NoveltyError> {
    // Create the migrations tracking table first.
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version     INTEGER PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL,
            applied_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );",
    )
    .map_err(|e| NoveltyError::Store(format!("Failed to create migrations table: {}", e)))?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .map_err(|e| NoveltyError::Store(format!("Failed to query migration version: {}", e)))?;

    if current_version < 1 {
        apply_v1(conn)?;
        info!("Applied migration v1: initial_schema");
    }

    Ok(())
}

/// Version 1: Initial schema.
///
/// `key` is indexed but not UNIQUE: upsert-mode uniqueness is enforced by
/// the repository so that append-mode deployments can share the schema.
fn apply_v1(conn: &Connection) -> Result<(), NoveltyError> {
    conn.execute_batch(
        "
        -- One row per ingested proposal document.
        CREATE TABLE IF NOT EXISTS proposals (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            key         TEXT NOT NULL,
            text        TEXT NOT NULL,
            embedding   BLOB NOT NULL,
            dimensions  INTEGER NOT NULL,
            created_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now')),
            updated_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );

        CREATE INDEX IF NOT EXISTS idx_proposals_key
            ON proposals (key);

        -- Record migration.
        INSERT OR IGNORE INTO schema_migrations (version, name) VALUES (1, 'initial_schema');
        ",
    )
    .map_err(|e| NoveltyError::Store(format!("Failed to apply migration v1: {}", e)))?;

    Ok(())
}

//! Database schema migrations for dailyread.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};

/// Current schema version.
///
/// Increment this when adding new migrations.
pub const SCHEMA_VERSION: i32 = 2;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Returns 0 if no version is set (initial database).
pub fn get_schema_version(conn: &Connection) -> SqliteResult<i32> {
    match conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
        row.get::<_, Option<i32>>(0)
    }) {
        Ok(v) => Ok(v.unwrap_or(0)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
        Err(e) => Err(e),
    }
}

fn set_schema_version(tx: &Connection, version: i32) -> SqliteResult<()> {
    tx.execute("DELETE FROM schema_version", [])?;
    tx.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Migration v1: users, plan, progress and event log, claimed interactions.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
            id               INTEGER PRIMARY KEY,
            username         TEXT,
            timezone         TEXT NOT NULL,
            current_month    INTEGER NOT NULL,
            current_day      INTEGER NOT NULL,
            last_daily_sent  TEXT,
            last_nudge_sent  TEXT,
            created_at       TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS plan (
            month       INTEGER NOT NULL,
            day         INTEGER NOT NULL,
            new_a_book  TEXT NOT NULL,
            new_a_ref   TEXT NOT NULL,
            new_b_book  TEXT NOT NULL,
            new_b_ref   TEXT NOT NULL,
            old_a_book  TEXT NOT NULL,
            old_a_ref   TEXT NOT NULL,
            old_b_book  TEXT NOT NULL,
            old_b_ref   TEXT NOT NULL,
            PRIMARY KEY (month, day)
        );

        CREATE TABLE IF NOT EXISTS user_progress (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id      INTEGER NOT NULL REFERENCES users(id),
            month        INTEGER NOT NULL,
            day          INTEGER NOT NULL,
            completed_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS user_events (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id     INTEGER NOT NULL REFERENCES users(id),
            action      TEXT NOT NULL,
            plan_month  INTEGER,
            plan_day    INTEGER,
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS processed_interactions (
            interaction_id TEXT PRIMARY KEY,
            processed_at   TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_progress_user_completed ON user_progress(user_id, completed_at);
        CREATE INDEX IF NOT EXISTS idx_events_user_action_created ON user_events(user_id, action, created_at);",
    )?;

    set_schema_version(&tx, 1)?;
    tx.commit()?;
    Ok(())
}

/// Migration v2: index claims by time for retention pruning.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_interactions_processed_at
         ON processed_interactions(processed_at);",
    )?;
    set_schema_version(&tx, 2)?;
    tx.commit()?;
    Ok(())
}

//! Database migrations.
//!
//! Applied migrations are tracked in a `_migrations` table and new
//! migrations are applied in order.

use anyhow::{anyhow, Result};
use chrono::Utc;
use libsql::params;

use super::connection::DbConnection;

/// A database migration.
struct Migration {
    /// Migration name (unique identifier).
    name: &'static str,
    /// SQL statements to apply the migration.
    up_sql: &'static str,
}

/// All migrations in order.
const MIGRATIONS: &[Migration] = &[
    Migration {
        name: "m20240301_000001_create_users_table",
        up_sql: r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL,
                last_login_at TEXT
            );
        "#,
    },
    Migration {
        name: "m20240301_000002_create_sessions_table",
        up_sql: r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                user_id INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                expires_at TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_sessions_expires_at ON sessions (expires_at);
        "#,
    },
    Migration {
        name: "m20240301_000003_create_notes_table",
        up_sql: r#"
            CREATE TABLE IF NOT EXISTS notes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                text TEXT NOT NULL,
                slug TEXT NOT NULL UNIQUE,
                author_id INTEGER NOT NULL,
                FOREIGN KEY (author_id) REFERENCES users(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_notes_author_id ON notes (author_id);
        "#,
    },
];

/// Runs all pending database migrations.
pub async fn run_migrations(conn: &DbConnection) -> Result<()> {
    create_migrations_table(conn).await?;

    let applied = get_applied_migrations(conn).await?;

    for migration in MIGRATIONS {
        if !applied.iter().any(|name| name == migration.name) {
            tracing::info!("Applying migration: {}", migration.name);
            apply_migration(conn, migration).await?;
        }
    }

    tracing::info!("All migrations applied successfully");
    Ok(())
}

/// Creates the migrations tracking table.
async fn create_migrations_table(conn: &DbConnection) -> Result<()> {
    let sql = r#"
        CREATE TABLE IF NOT EXISTS _migrations (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL
        )
    "#;
    conn.execute(sql, ()).await?;
    Ok(())
}

/// Gets the list of already-applied migration names.
async fn get_applied_migrations(conn: &DbConnection) -> Result<Vec<String>> {
    let sql = "SELECT name FROM _migrations ORDER BY name";
    let mut rows = conn.query(sql, ()).await?;

    let mut names = Vec::new();
    while let Some(row) = rows.next().await? {
        let name: String = row.get(0)?;
        names.push(name);
    }

    Ok(names)
}

/// Applies a single migration.
///
/// Unlike the performance pragmas, a failing schema statement is fatal.
async fn apply_migration(conn: &DbConnection, migration: &Migration) -> Result<()> {
    for statement in migration.up_sql.split(';') {
        let statement = statement.trim();
        if statement.is_empty() {
            continue;
        }

        conn.execute(statement, ())
            .await
            .map_err(|e| anyhow!("Migration {} failed: {}", migration.name, e))?;
    }

    let now = Utc::now().to_rfc3339();
    let sql = "INSERT INTO _migrations (name, applied_at) VALUES (?1, ?2)";
    conn.execute(sql, params![migration.name, now]).await?;

    Ok(())
}

//! SQLite (libSQL) connection handling.

use std::sync::Arc;

use anyhow::Result;
use libsql::{params::IntoParams, Builder, Connection, Database};
use tokio::sync::RwLock;

use crate::config::DatabaseConfig;

/// How long to wait for another process holding the write lock.
const BUSY_TIMEOUT_MS: u64 = 5000;

/// A connection to the notes database.
///
/// Statements normally share the connection through a read lock.
/// Multi-statement transactions take the write lock so no other
/// statement can interleave with them.
pub struct DbConnection {
    // Kept alive for as long as the connection is
    _database: Database,
    connection: RwLock<Connection>,
    path: String,
}

impl std::fmt::Debug for DbConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbConnection")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl DbConnection {
    /// Opens the database described by the configuration.
    pub async fn connect(config: &DatabaseConfig) -> Result<Arc<Self>> {
        let path = config.path().to_string();

        tracing::info!("Connecting to local SQLite database at {}", path);
        let database = Builder::new_local(&path).build().await?;
        let connection = database.connect()?;

        // Cascading deletes depend on this one
        pragma(&connection, "PRAGMA foreign_keys = ON").await?;

        // jotteradm and one-shot modes may write from another process
        pragma(
            &connection,
            &format!("PRAGMA busy_timeout = {}", BUSY_TIMEOUT_MS),
        )
        .await?;

        // These only improve performance, so failures are ignored
        let pragmas = [
            "PRAGMA journal_mode=WAL",
            "PRAGMA synchronous=normal",
            "PRAGMA temp_store=memory",
        ];

        for sql in pragmas {
            if let Err(e) = pragma(&connection, sql).await {
                tracing::debug!("Failed to set pragma ({}): {}", sql, e);
            }
        }

        Ok(Arc::new(Self {
            _database: database,
            connection: RwLock::new(connection),
            path,
        }))
    }

    /// Returns a shared reference to the underlying connection.
    pub async fn conn(&self) -> tokio::sync::RwLockReadGuard<'_, Connection> {
        self.connection.read().await
    }

    /// Returns exclusive access to the underlying connection.
    ///
    /// Hold the guard for the whole of a transaction.
    pub async fn conn_mut(&self) -> tokio::sync::RwLockWriteGuard<'_, Connection> {
        self.connection.write().await
    }

    /// Executes a statement and returns the number of affected rows.
    pub async fn execute<P: IntoParams>(&self, sql: &str, params: P) -> Result<u64> {
        let conn = self.connection.read().await;
        Ok(conn.execute(sql, params).await?)
    }

    /// Executes a query and returns the results.
    pub async fn query<P: IntoParams>(&self, sql: &str, params: P) -> Result<libsql::Rows> {
        let conn = self.connection.read().await;
        Ok(conn.query(sql, params).await?)
    }
}

/// Runs a pragma. Some pragmas answer with a row, so this steps once.
async fn pragma(connection: &Connection, sql: &str) -> libsql::Result<()> {
    let mut rows = connection.query(sql, ()).await?;
    rows.next().await?;
    Ok(())
}

/// Returns whether a database error is a `UNIQUE` constraint violation.
pub fn is_unique_violation(error: &impl std::fmt::Display) -> bool {
    let error_str = error.to_string();
    error_str.contains("UNIQUE constraint")
}

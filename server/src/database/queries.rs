//! Raw SQL queries.

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use libsql::Connection;
use tracing::instrument;

use crate::error::{ErrorKind, ServerError, ServerResult};
use jotter::slug::Slug;
use jotter::user::Username;

use super::connection::{is_unique_violation, DbConnection};
use super::models::{NoteModel, SessionModel, UserModel};

/// A simple error type for database operations that implements StdError.
#[derive(Debug)]
struct DbError(String);

impl std::fmt::Display for DbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for DbError {}

/// Helper to convert errors to ServerError.
fn db_err<E: std::fmt::Display>(e: E) -> ServerError {
    ServerError::database_error(DbError(e.to_string()))
}

const USER_COLUMNS: &str = "id, username, password_hash, created_at, last_login_at";
const NOTE_COLUMNS: &str = "id, title, text, slug, author_id";

// ============================================================================
// Users
// ============================================================================

/// Creates a new user.
pub async fn create_user(
    conn: &DbConnection,
    username: &Username,
    password_hash: &str,
) -> ServerResult<UserModel> {
    let now = Utc::now().to_rfc3339();

    let sql = format!(
        r#"
        INSERT INTO users (username, password_hash, created_at)
        VALUES (?1, ?2, ?3)
        RETURNING {}
        "#,
        USER_COLUMNS
    );

    let mut rows = conn
        .query(&sql, (username.as_str(), password_hash, now.as_str()))
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ErrorKind::UsernameTaken(username.to_string()).into()
            } else {
                db_err(e)
            }
        })?;

    match rows.next().await.map_err(db_err)? {
        Some(row) => UserModel::from_row(&row).map_err(db_err),
        None => Err(ErrorKind::DatabaseError(anyhow!("Failed to create user")).into()),
    }
}

/// Finds a user by name.
pub async fn find_user_by_username(
    conn: &DbConnection,
    username: &str,
) -> ServerResult<Option<UserModel>> {
    let sql = format!("SELECT {} FROM users WHERE username = ?1", USER_COLUMNS);

    let mut rows = conn.query(&sql, [username]).await.map_err(db_err)?;

    match rows.next().await.map_err(db_err)? {
        Some(row) => Ok(Some(UserModel::from_row(&row).map_err(db_err)?)),
        None => Ok(None),
    }
}

/// Finds a user by ID.
pub async fn find_user_by_id(conn: &DbConnection, user_id: i64) -> ServerResult<UserModel> {
    let sql = format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS);

    let mut rows = conn.query(&sql, [user_id]).await.map_err(db_err)?;

    match rows.next().await.map_err(db_err)? {
        Some(row) => UserModel::from_row(&row).map_err(db_err),
        None => Err(ErrorKind::NoSuchUser.into()),
    }
}

/// Records a successful login.
pub async fn update_user_last_login(conn: &DbConnection, user_id: i64) -> ServerResult<()> {
    let now = Utc::now().to_rfc3339();
    let sql = "UPDATE users SET last_login_at = ?1 WHERE id = ?2";

    conn.execute(sql, (now.as_str(), user_id))
        .await
        .map_err(db_err)?;

    Ok(())
}

/// Counts registered users.
pub async fn count_users(conn: &DbConnection) -> ServerResult<u64> {
    count(conn, "SELECT COUNT(*) FROM users").await
}

// ============================================================================
// Sessions
// ============================================================================

/// Creates a session for a user.
pub async fn create_session(
    conn: &DbConnection,
    session_id: &str,
    user_id: i64,
    expires_at: DateTime<Utc>,
) -> ServerResult<SessionModel> {
    let now = Utc::now();

    let sql = r#"
        INSERT INTO sessions (id, user_id, created_at, expires_at)
        VALUES (?1, ?2, ?3, ?4)
    "#;

    conn.execute(
        sql,
        (
            session_id,
            user_id,
            now.to_rfc3339(),
            expires_at.to_rfc3339(),
        ),
    )
    .await
    .map_err(db_err)?;

    Ok(SessionModel {
        id: session_id.to_string(),
        user_id,
        created_at: now,
        expires_at,
    })
}

/// Finds a session along with its user.
///
/// Expired sessions are returned too. The caller decides what to do with them.
pub async fn find_session(
    conn: &DbConnection,
    session_id: &str,
) -> ServerResult<Option<(SessionModel, UserModel)>> {
    let sql = r#"
        SELECT
            s.id, s.user_id, s.created_at, s.expires_at,
            u.id, u.username, u.password_hash, u.created_at, u.last_login_at
        FROM sessions s
        INNER JOIN users u ON s.user_id = u.id
        WHERE s.id = ?1
    "#;

    let mut rows = conn.query(sql, [session_id]).await.map_err(db_err)?;

    match rows.next().await.map_err(db_err)? {
        Some(row) => {
            let session = SessionModel::from_row_at(&row, 0).map_err(db_err)?;
            let user = UserModel::from_row_at(&row, SessionModel::column_count() as i32)
                .map_err(db_err)?;
            Ok(Some((session, user)))
        }
        None => Ok(None),
    }
}

/// Deletes a session.
pub async fn delete_session(conn: &DbConnection, session_id: &str) -> ServerResult<()> {
    conn.execute("DELETE FROM sessions WHERE id = ?1", [session_id])
        .await
        .map_err(db_err)?;

    Ok(())
}

/// Deletes all expired sessions, returning how many were removed.
#[instrument(skip_all)]
pub async fn delete_expired_sessions(conn: &DbConnection) -> ServerResult<u64> {
    let now = Utc::now().to_rfc3339();

    conn.execute("DELETE FROM sessions WHERE expires_at <= ?1", [now.as_str()])
        .await
        .map_err(db_err)
}

// ============================================================================
// Notes
// ============================================================================

/// Creates a note.
///
/// The slug check and the insert run in one transaction while holding
/// exclusive access to the connection. The `UNIQUE` constraint on
/// `notes.slug` backs the check up.
#[instrument(skip(conn, title, text, slug), fields(slug = %slug))]
pub async fn create_note(
    conn: &DbConnection,
    author_id: i64,
    title: &str,
    text: &str,
    slug: &Slug,
) -> ServerResult<NoteModel> {
    let guard = conn.conn_mut().await;

    guard
        .execute("BEGIN IMMEDIATE", ())
        .await
        .map_err(db_err)?;

    let result = match insert_note(&guard, author_id, title, text, slug).await {
        Ok(note) => guard
            .execute("COMMIT", ())
            .await
            .map(|_| note)
            .map_err(db_err),
        Err(e) => Err(e),
    };

    // A failed COMMIT leaves the transaction open
    if result.is_err() {
        if let Err(rollback_err) = guard.execute("ROLLBACK", ()).await {
            tracing::warn!("Failed to roll back note creation: {}", rollback_err);
        }
    }

    result
}

/// Checks the slug and inserts a note. Must run inside a transaction.
async fn insert_note(
    conn: &Connection,
    author_id: i64,
    title: &str,
    text: &str,
    slug: &Slug,
) -> ServerResult<NoteModel> {
    let mut rows = conn
        .query("SELECT 1 FROM notes WHERE slug = ?1", [slug.as_str()])
        .await
        .map_err(db_err)?;

    if rows.next().await.map_err(db_err)?.is_some() {
        return Err(ErrorKind::SlugConflict(slug.clone()).into());
    }

    let sql = format!(
        r#"
        INSERT INTO notes (title, text, slug, author_id)
        VALUES (?1, ?2, ?3, ?4)
        RETURNING {}
        "#,
        NOTE_COLUMNS
    );

    let mut rows = conn
        .query(&sql, (title, text, slug.as_str(), author_id))
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ErrorKind::SlugConflict(slug.clone()).into()
            } else {
                db_err(e)
            }
        })?;

    match rows.next().await.map_err(db_err)? {
        Some(row) => NoteModel::from_row(&row).map_err(db_err),
        None => Err(ErrorKind::DatabaseError(anyhow!("Failed to create note")).into()),
    }
}

/// Lists the notes written by a user, oldest first.
pub async fn list_notes_by_author(
    conn: &DbConnection,
    author_id: i64,
) -> ServerResult<Vec<NoteModel>> {
    let sql = format!(
        "SELECT {} FROM notes WHERE author_id = ?1 ORDER BY id",
        NOTE_COLUMNS
    );

    let mut rows = conn.query(&sql, [author_id]).await.map_err(db_err)?;

    let mut notes = Vec::new();
    while let Some(row) = rows.next().await.map_err(db_err)? {
        notes.push(NoteModel::from_row(&row).map_err(db_err)?);
    }

    Ok(notes)
}

/// Finds a note by slug, regardless of author.
pub async fn find_note_by_slug(conn: &DbConnection, slug: &str) -> ServerResult<Option<NoteModel>> {
    let sql = format!("SELECT {} FROM notes WHERE slug = ?1", NOTE_COLUMNS);

    let mut rows = conn.query(&sql, [slug]).await.map_err(db_err)?;

    match rows.next().await.map_err(db_err)? {
        Some(row) => Ok(Some(NoteModel::from_row(&row).map_err(db_err)?)),
        None => Ok(None),
    }
}

/// Updates the title and text of a note.
///
/// The slug of a note never changes after creation.
#[instrument(skip(conn, title, text))]
pub async fn update_note(
    conn: &DbConnection,
    note_id: i64,
    title: &str,
    text: &str,
) -> ServerResult<()> {
    let affected = conn
        .execute(
            "UPDATE notes SET title = ?1, text = ?2 WHERE id = ?3",
            (title, text, note_id),
        )
        .await
        .map_err(db_err)?;

    if affected == 0 {
        return Err(ErrorKind::NoSuchNote.into());
    }

    Ok(())
}

/// Deletes a note.
#[instrument(skip(conn))]
pub async fn delete_note(conn: &DbConnection, note_id: i64) -> ServerResult<()> {
    let affected = conn
        .execute("DELETE FROM notes WHERE id = ?1", [note_id])
        .await
        .map_err(db_err)?;

    if affected == 0 {
        return Err(ErrorKind::NoSuchNote.into());
    }

    Ok(())
}

/// Counts all notes.
pub async fn count_notes(conn: &DbConnection) -> ServerResult<u64> {
    count(conn, "SELECT COUNT(*) FROM notes").await
}

async fn count(conn: &DbConnection, sql: &str) -> ServerResult<u64> {
    let mut rows = conn.query(sql, ()).await.map_err(db_err)?;

    match rows.next().await.map_err(db_err)? {
        Some(row) => Ok(row.get::<i64>(0).map_err(db_err)? as u64),
        None => Ok(0),
    }
}

//! Database models.
//!
//! Rows are parsed by hand from `libsql::Row` values, by column position.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use libsql::Row;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserModel {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl UserModel {
    /// Parses a UserModel from a database row.
    pub fn from_row(row: &Row) -> Result<Self> {
        Self::from_row_at(row, 0)
    }

    /// Parses a UserModel from a row starting at the given index.
    pub fn from_row_at(row: &Row, start: i32) -> Result<Self> {
        Ok(Self {
            id: row.get::<i64>(start)?,
            username: row.get::<String>(start + 1)?,
            password_hash: row.get::<String>(start + 2)?,
            created_at: parse_datetime(&row.get::<String>(start + 3)?)?,
            last_login_at: row
                .get::<Option<String>>(start + 4)?
                .map(|s| parse_datetime(&s))
                .transpose()?,
        })
    }

    /// Returns the number of columns in this model.
    pub const fn column_count() -> usize {
        5
    }
}

/// A login session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionModel {
    pub id: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionModel {
    /// Parses a SessionModel from a row starting at the given index.
    pub fn from_row_at(row: &Row, start: i32) -> Result<Self> {
        Ok(Self {
            id: row.get::<String>(start)?,
            user_id: row.get::<i64>(start + 1)?,
            created_at: parse_datetime(&row.get::<String>(start + 2)?)?,
            expires_at: parse_datetime(&row.get::<String>(start + 3)?)?,
        })
    }

    /// Returns the number of columns in this model.
    pub const fn column_count() -> usize {
        4
    }

    /// Returns whether the session has expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// A note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteModel {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub slug: String,
    pub author_id: i64,
}

impl NoteModel {
    /// Parses a NoteModel from a database row.
    pub fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.get::<i64>(0)?,
            title: row.get::<String>(1)?,
            text: row.get::<String>(2)?,
            slug: row.get::<String>(3)?,
            author_id: row.get::<i64>(4)?,
        })
    }

    /// Returns whether the given user wrote this note.
    pub fn is_authored_by(&self, user: &UserModel) -> bool {
        self.author_id == user.id
    }
}

/// Parses an RFC 3339 timestamp as stored in the database.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| anyhow!("Invalid timestamp {:?}: {}", s, e))
}

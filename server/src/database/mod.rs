//! SQLite (libSQL) database backend.

pub mod connection;
pub mod migrations;
pub mod models;
pub mod queries;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ServerResult;
use jotter::slug::Slug;

pub use connection::DbConnection;
use models::{NoteModel, UserModel};

/// Storage for notes.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Creates a note with the given slug, failing with `SlugConflict`
    /// if any note already uses it.
    async fn create_note(
        &self,
        author: &UserModel,
        title: &str,
        text: &str,
        slug: &Slug,
    ) -> ServerResult<NoteModel>;

    /// Lists the notes written by a user.
    async fn list_notes_for(&self, author: &UserModel) -> ServerResult<Vec<NoteModel>>;

    /// Finds a note by slug without checking who wrote it.
    async fn find_note(&self, slug: &str) -> ServerResult<Option<NoteModel>>;

    /// Replaces the title and text of a note.
    async fn update_note(&self, note: &NoteModel, title: &str, text: &str) -> ServerResult<()>;

    /// Deletes a note.
    async fn delete_note(&self, note: &NoteModel) -> ServerResult<()>;

    /// Counts all notes.
    async fn count_notes(&self) -> ServerResult<u64>;
}

#[async_trait]
impl NoteStore for Arc<DbConnection> {
    async fn create_note(
        &self,
        author: &UserModel,
        title: &str,
        text: &str,
        slug: &Slug,
    ) -> ServerResult<NoteModel> {
        queries::create_note(self, author.id, title, text, slug).await
    }

    async fn list_notes_for(&self, author: &UserModel) -> ServerResult<Vec<NoteModel>> {
        queries::list_notes_by_author(self, author.id).await
    }

    async fn find_note(&self, slug: &str) -> ServerResult<Option<NoteModel>> {
        queries::find_note_by_slug(self, slug).await
    }

    async fn update_note(&self, note: &NoteModel, title: &str, text: &str) -> ServerResult<()> {
        queries::update_note(self, note.id, title, text).await
    }

    async fn delete_note(&self, note: &NoteModel) -> ServerResult<()> {
        queries::delete_note(self, note.id).await
    }

    async fn count_notes(&self) -> ServerResult<u64> {
        queries::count_notes(self).await
    }
}

//! Access control.
//!
//! Notes are private to their authors. Every route that touches a note
//! goes through two checks:
//!
//! 1. The request must carry a valid session. Anonymous requests are
//!    redirected to the login page, with the original URL in `next`.
//! 2. For routes naming a note by slug, the session user must be the
//!    author. Anyone else gets the same 404 as for a missing note, so
//!    the existence of other users' notes is never revealed.
//!
//! The first check is performed by the extractors in [`http`].

pub mod http;


use axum::http::{header, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::database::models::{NoteModel, UserModel};
use crate::database::NoteStore;
use crate::error::{ErrorKind, ServerResult};

/// Path of the login page.
pub const LOGIN_URL: &str = "/auth/login/";

/// Characters escaped in the `next` parameter.
///
/// Everything except unreserved characters and `/`.
const NEXT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/');

/// Returns the URL of the login page, remembering where to go afterwards.
pub fn login_url(next: &Uri) -> String {
    let next = next
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| next.path());

    format!(
        "{}?next={}",
        LOGIN_URL,
        utf8_percent_encode(next, NEXT_ENCODE_SET)
    )
}

/// Redirects with `302 Found`.
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// Redirects to the login page.
pub fn login_redirect(next: &Uri) -> Response {
    found(&login_url(next))
}

/// Returns where to go after logging in.
///
/// Only local paths are honored.
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(next) if is_local_path(next) => next,
        _ => "/",
    }
}

fn is_local_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.starts_with("//")
        && !path.contains('\\')
        // Browsers drop tabs and newlines, which could turn `/\t/` into `//`
        && !path.chars().any(char::is_control)
}

/// Loads a note on behalf of a user.
///
/// Fails with `NoSuchNote` both when the note does not exist and when
/// it belongs to someone else.
pub async fn authorize_note(
    store: &impl NoteStore,
    user: &UserModel,
    slug: &str,
) -> ServerResult<NoteModel> {
    let note = store.find_note(slug).await?.ok_or(ErrorKind::NoSuchNote)?;
    check_owner(&note, user)?;

    Ok(note)
}

/// Checks that a user wrote a note.
pub fn check_owner(note: &NoteModel, user: &UserModel) -> ServerResult<()> {
    if note.is_authored_by(user) {
        Ok(())
    } else {
        tracing::debug!(
            "User {} tried to access note {} of user {}",
            user.id,
            note.id,
            note.author_id
        );
        Err(ErrorKind::NoSuchNote.into())
    }
}

//! Note handlers for the web UI.

use askama::Template;
use axum::{
    extract::{Path, State as AxumState},
    response::{Html, IntoResponse, Response},
    Form,
};
use tracing::instrument;

use super::forms::{slug_conflict_message, NoteForm, NoteFormData};
use super::WebUiState;
use crate::access::{authorize_note, found};
use crate::access::http::{MaybeUser, SessionUser};
use crate::database::models::{NoteModel, UserModel};
use crate::database::NoteStore;
use crate::error::{ErrorKind, ServerResult};

/// Where to go after a note is saved or deleted.
pub const SUCCESS_URL: &str = "/done/";

// ============================================================================
// Templates
// ============================================================================

#[derive(Template)]
#[template(path = "home.html")]
struct HomeTemplate {
    user: Option<UserModel>,
}

#[derive(Template)]
#[template(path = "notes/list.html")]
struct ListTemplate {
    user: Option<UserModel>,
    notes: Vec<NoteModel>,
}

#[derive(Template)]
#[template(path = "notes/form.html")]
struct FormTemplate {
    user: Option<UserModel>,
    form: NoteForm,
    /// Where the form posts to.
    action: String,
}

#[derive(Template)]
#[template(path = "notes/detail.html")]
struct DetailTemplate {
    user: Option<UserModel>,
    note: NoteModel,
}

#[derive(Template)]
#[template(path = "notes/delete.html")]
struct DeleteTemplate {
    user: Option<UserModel>,
    note: NoteModel,
}

#[derive(Template)]
#[template(path = "notes/success.html")]
struct SuccessTemplate {
    user: Option<UserModel>,
}

fn render_form(user: UserModel, form: NoteForm, action: String) -> ServerResult<Response> {
    let template = FormTemplate {
        user: Some(user),
        form,
        action,
    };

    Ok(Html(template.render()?).into_response())
}

fn edit_url(slug: &str) -> String {
    format!("/edit/{}/", slug)
}

// ============================================================================
// Handlers
// ============================================================================

/// GET / - Show the home page.
#[instrument(skip_all)]
pub async fn home(MaybeUser(user): MaybeUser) -> ServerResult<Html<String>> {
    let template = HomeTemplate { user };
    Ok(Html(template.render()?))
}

/// GET /notes/ - List the notes of the logged-in user.
#[instrument(skip_all)]
pub async fn list_notes(
    AxumState(web_ui): AxumState<WebUiState>,
    SessionUser(user): SessionUser,
) -> ServerResult<Html<String>> {
    let db = web_ui.app_state.database().await?;
    let notes = db.list_notes_for(&user).await?;

    let template = ListTemplate {
        user: Some(user),
        notes,
    };

    Ok(Html(template.render()?))
}

/// GET /add/ - Show an empty note form.
#[instrument(skip_all)]
pub async fn add_page(SessionUser(user): SessionUser) -> ServerResult<Response> {
    render_form(user, NoteForm::blank(), "/add/".to_string())
}

/// POST /add/ - Create a note.
///
/// Validation errors, including a taken slug, re-render the form.
#[instrument(skip_all)]
pub async fn add_note(
    AxumState(web_ui): AxumState<WebUiState>,
    SessionUser(user): SessionUser,
    Form(data): Form<NoteFormData>,
) -> ServerResult<Response> {
    let action = "/add/".to_string();
    let mut form = NoteForm::from_submission(data);

    let Some(draft) = form.validate() else {
        return render_form(user, form, action);
    };

    let slug = match draft.resolve_slug() {
        Ok(slug) => slug,
        Err(e) => {
            form.errors.add_error(&e);
            return render_form(user, form, action);
        }
    };

    let db = web_ui.app_state.database().await?;

    match db.create_note(&user, &draft.title, &draft.text, &slug).await {
        Ok(note) => {
            tracing::info!("User {} created note {}", user.id, note.slug);
            Ok(found(SUCCESS_URL))
        }
        Err(e) => match e.kind() {
            ErrorKind::SlugConflict(slug) => {
                tracing::debug!("Slug {} is taken", slug);
                form.errors.add("slug", slug_conflict_message(slug));
                render_form(user, form, action)
            }
            _ => Err(e),
        },
    }
}

/// GET /done/ - Confirm a successful change.
#[instrument(skip_all)]
pub async fn success(SessionUser(user): SessionUser) -> ServerResult<Html<String>> {
    let template = SuccessTemplate { user: Some(user) };
    Ok(Html(template.render()?))
}

/// GET /note/{slug}/ - Show a note.
#[instrument(skip_all, fields(slug = %slug))]
pub async fn note_detail(
    AxumState(web_ui): AxumState<WebUiState>,
    SessionUser(user): SessionUser,
    Path(slug): Path<String>,
) -> ServerResult<Html<String>> {
    let db = web_ui.app_state.database().await?;
    let note = authorize_note(db, &user, &slug).await?;

    let template = DetailTemplate {
        user: Some(user),
        note,
    };

    Ok(Html(template.render()?))
}

/// GET /edit/{slug}/ - Show the form for a note.
#[instrument(skip_all, fields(slug = %slug))]
pub async fn edit_page(
    AxumState(web_ui): AxumState<WebUiState>,
    SessionUser(user): SessionUser,
    Path(slug): Path<String>,
) -> ServerResult<Response> {
    let db = web_ui.app_state.database().await?;
    let note = authorize_note(db, &user, &slug).await?;

    let form = NoteForm::for_note(&note.title, &note.text, &note.slug);
    render_form(user, form, edit_url(&note.slug))
}

/// POST /edit/{slug}/ - Update the title and text of a note.
///
/// A submitted slug is ignored.
#[instrument(skip_all, fields(slug = %slug))]
pub async fn edit_note(
    AxumState(web_ui): AxumState<WebUiState>,
    SessionUser(user): SessionUser,
    Path(slug): Path<String>,
    Form(data): Form<NoteFormData>,
) -> ServerResult<Response> {
    let db = web_ui.app_state.database().await?;
    let note = authorize_note(db, &user, &slug).await?;

    let mut form = NoteForm::for_note(&data.title, &data.text, &note.slug);

    let Some(draft) = form.validate() else {
        return render_form(user, form, edit_url(&note.slug));
    };

    db.update_note(&note, &draft.title, &draft.text).await?;
    tracing::info!("User {} updated note {}", user.id, note.slug);

    Ok(found(SUCCESS_URL))
}

/// GET /delete/{slug}/ - Ask for confirmation.
#[instrument(skip_all, fields(slug = %slug))]
pub async fn delete_page(
    AxumState(web_ui): AxumState<WebUiState>,
    SessionUser(user): SessionUser,
    Path(slug): Path<String>,
) -> ServerResult<Html<String>> {
    let db = web_ui.app_state.database().await?;
    let note = authorize_note(db, &user, &slug).await?;

    let template = DeleteTemplate {
        user: Some(user),
        note,
    };

    Ok(Html(template.render()?))
}

/// POST or DELETE /delete/{slug}/ - Delete a note.
#[instrument(skip_all, fields(slug = %slug))]
pub async fn delete_note(
    AxumState(web_ui): AxumState<WebUiState>,
    SessionUser(user): SessionUser,
    Path(slug): Path<String>,
) -> ServerResult<Response> {
    let db = web_ui.app_state.database().await?;
    let note = authorize_note(db, &user, &slug).await?;

    db.delete_note(&note).await?;
    tracing::info!("User {} deleted note {}", user.id, note.slug);

    Ok(found(SUCCESS_URL))
}

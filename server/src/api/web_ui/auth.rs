//! Authentication handlers for the web UI.
//!
//! Handles signup, login, and logout.

use askama::Template;
use axum::{
    extract::{Query, State as AxumState},
    response::{Html, IntoResponse, Response},
    Form,
};
use axum_extra::extract::cookie::{Cookie, PrivateCookieJar, SameSite};
use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use super::forms::FieldErrors;
use super::WebUiState;
use crate::access::http::MaybeUser;
use crate::access::{found, safe_next, LOGIN_URL};
use crate::database::models::UserModel;
use crate::database::queries;
use crate::error::{ErrorKind, ServerResult};
use crate::password::{hash_password, verify_password};
use jotter::user::{Username, MIN_PASSWORD_LENGTH};

/// Session cookie name.
pub const SESSION_COOKIE: &str = "jotter_session";

// ============================================================================
// Templates
// ============================================================================

#[derive(Template)]
#[template(path = "auth/login.html")]
struct LoginTemplate<'a> {
    user: Option<UserModel>,
    username: &'a str,
    next: Option<&'a str>,
    error: Option<&'a str>,
}

#[derive(Template)]
#[template(path = "auth/logout.html")]
struct LogoutTemplate {
    user: Option<UserModel>,
}

#[derive(Template)]
#[template(path = "auth/signup.html")]
struct SignupTemplate<'a> {
    user: Option<UserModel>,
    username: &'a str,
    errors: FieldErrors,
}

// ============================================================================
// Request types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /auth/login/ - Show the login page.
#[instrument(skip_all)]
pub async fn login_page(
    MaybeUser(user): MaybeUser,
    Query(query): Query<NextQuery>,
) -> ServerResult<Html<String>> {
    let template = LoginTemplate {
        user,
        username: "",
        next: query.next.as_deref(),
        error: None,
    };

    Ok(Html(template.render()?))
}

/// POST /auth/login/ - Log in with a username and password.
#[instrument(skip_all)]
pub async fn login(
    AxumState(web_ui): AxumState<WebUiState>,
    jar: PrivateCookieJar,
    Query(query): Query<NextQuery>,
    Form(form): Form<LoginForm>,
) -> ServerResult<Response> {
    let next = form
        .next
        .as_deref()
        .filter(|next| !next.is_empty())
        .or(query.next.as_deref());

    let user = match authenticate(&web_ui, &form.username, &form.password).await? {
        Some(user) => user,
        None => {
            tracing::info!("Failed login for {:?}", form.username);

            let template = LoginTemplate {
                user: None,
                username: &form.username,
                next,
                error: Some(
                    "Please enter a correct username and password. Note that both fields may be case-sensitive.",
                ),
            };
            return Ok(Html(template.render()?).into_response());
        }
    };

    let session_id = create_session(&web_ui, &user).await?;
    tracing::info!("User {} logged in", user.username);

    let jar = jar.add(session_cookie(&web_ui, session_id));

    Ok((jar, found(safe_next(next))).into_response())
}

/// GET or POST /auth/logout/ - End the current session.
#[instrument(skip_all)]
pub async fn logout(
    AxumState(web_ui): AxumState<WebUiState>,
    jar: PrivateCookieJar,
) -> ServerResult<(PrivateCookieJar, Html<String>)> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        let db = web_ui.app_state.database().await?;
        queries::delete_session(db, cookie.value()).await?;
    }

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    let template = LogoutTemplate { user: None };

    Ok((jar, Html(template.render()?)))
}

/// GET /auth/signup/ - Show the signup page.
#[instrument(skip_all)]
pub async fn signup_page(MaybeUser(user): MaybeUser) -> ServerResult<Html<String>> {
    let template = SignupTemplate {
        user,
        username: "",
        errors: FieldErrors::default(),
    };

    Ok(Html(template.render()?))
}

/// POST /auth/signup/ - Create an account.
#[instrument(skip_all)]
pub async fn signup(
    AxumState(web_ui): AxumState<WebUiState>,
    Form(form): Form<SignupForm>,
) -> ServerResult<Response> {
    let mut errors = FieldErrors::default();

    let username = match Username::new(form.username.trim().to_string()) {
        Ok(username) => Some(username),
        Err(e) => {
            errors.add_error(&e);
            None
        }
    };

    if let Err(message) = check_passwords(&form.password1, &form.password2) {
        errors.add("password2", message);
    }

    if let (Some(username), true) = (&username, errors.is_empty()) {
        let db = web_ui.app_state.database().await?;
        let password = form.password1.clone();
        let password_hash = blocking(move || hash_password(&password)).await?;

        match queries::create_user(db, username, &password_hash).await {
            Ok(user) => {
                tracing::info!("User {} signed up", user.username);
                return Ok(found(LOGIN_URL));
            }
            Err(e) if matches!(e.kind(), ErrorKind::UsernameTaken(_)) => {
                errors.add("username", "A user with that username already exists.".to_string());
            }
            Err(e) => return Err(e),
        }
    }

    let template = SignupTemplate {
        user: None,
        username: &form.username,
        errors,
    };

    Ok(Html(template.render()?).into_response())
}

// ============================================================================
// Sessions
// ============================================================================

/// Checks a username and password, recording the login on success.
pub async fn authenticate(
    web_ui: &WebUiState,
    username: &str,
    password: &str,
) -> ServerResult<Option<UserModel>> {
    let db = web_ui.app_state.database().await?;

    let Some(user) = queries::find_user_by_username(db, username).await? else {
        return Ok(None);
    };

    let password = password.to_string();
    let password_hash = user.password_hash.clone();

    if !blocking(move || verify_password(&password, &password_hash)).await? {
        return Ok(None);
    }

    queries::update_user_last_login(db, user.id).await?;

    Ok(Some(user))
}

/// Starts a session for a user, returning its ID.
pub async fn create_session(web_ui: &WebUiState, user: &UserModel) -> ServerResult<String> {
    let db = web_ui.app_state.database().await?;

    let session_id = Uuid::new_v4().to_string();
    let duration = chrono::Duration::from_std(web_ui.session_duration)
        .map_err(|_| ErrorKind::InternalServerError)?;
    let expires_at = Utc::now() + duration;

    queries::create_session(db, &session_id, user.id, expires_at).await?;

    Ok(session_id)
}

/// Runs password hashing on the blocking thread pool.
async fn blocking<T, F>(f: F) -> ServerResult<T>
where
    F: FnOnce() -> ServerResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|_| ErrorKind::InternalServerError)?
}

fn session_cookie(web_ui: &WebUiState, session_id: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, session_id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(web_ui.secure_cookie)
        .max_age(time::Duration::seconds(
            web_ui.session_duration.as_secs() as i64
        ))
        .build()
}

fn check_passwords(password1: &str, password2: &str) -> Result<(), String> {
    if password1.is_empty() {
        return Err("This field is required.".to_string());
    }

    if password1 != password2 {
        return Err("The two password fields didn't match.".to_string());
    }

    if password1.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "This password is too short. It must contain at least {} characters.",
            MIN_PASSWORD_LENGTH
        ));
    }

    Ok(())
}

/// Extracts session user from cookie.
///
/// Expired sessions are deleted and treated as absent.
pub async fn get_session_user(
    web_ui: &WebUiState,
    jar: &PrivateCookieJar,
) -> ServerResult<Option<UserModel>> {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return Ok(None);
    };
    let session_id = cookie.value();

    let db = web_ui.app_state.database().await?;
    let Some((session, user)) = queries::find_session(db, session_id).await? else {
        return Ok(None);
    };

    // Check if session is expired
    if session.is_expired() {
        tracing::debug!("Session of user {} expired", user.id);
        queries::delete_session(db, session_id).await?;
        return Ok(None);
    }

    Ok(Some(user))
}

//! Web UI for the Jotter notes server.
//!
//! Pages are rendered on the server with askama. Logins are kept in
//! server-side sessions referenced by an encrypted cookie.

pub mod auth;
pub mod forms;
pub mod notes;

use std::time::Duration;

use anyhow::{anyhow, Result};
use axum::{extract::FromRef, routing::get, Router};
use axum_extra::extract::cookie::Key;

use crate::config::SessionConfig;
use crate::State;

/// Web UI state shared across all handlers.
#[derive(Clone)]
pub struct WebUiState {
    /// Cookie encryption key.
    pub cookie_key: Key,

    /// How long a login lasts.
    pub session_duration: Duration,

    /// Whether session cookies are marked `Secure`.
    pub secure_cookie: bool,

    /// Reference to the main application state.
    pub app_state: State,
}

// Allow extracting Key from WebUiState for PrivateCookieJar
impl FromRef<WebUiState> for Key {
    fn from_ref(state: &WebUiState) -> Self {
        state.cookie_key.clone()
    }
}

// Allow extracting main State from WebUiState
impl FromRef<WebUiState> for State {
    fn from_ref(state: &WebUiState) -> Self {
        state.app_state.clone()
    }
}

impl WebUiState {
    /// Creates a new WebUI state from configuration.
    pub fn new(config: &SessionConfig, app_state: State) -> Result<Self> {
        // Use provided key or generate a random one
        let cookie_key = if let Some(key) = config.cookie_key()? {
            Key::try_from(&key[..]).map_err(|e| anyhow!("Invalid cookie key: {:?}", e))?
        } else {
            tracing::warn!("No cookie-key-base64 configured, generating random key. Sessions won't persist across restarts.");
            Key::generate()
        };

        Ok(Self {
            cookie_key,
            session_duration: config.duration,
            secure_cookie: config.secure_cookie,
            app_state,
        })
    }
}

/// Returns the web UI router.
pub fn get_router(app_state: State) -> Result<Router<()>> {
    let state = WebUiState::new(&app_state.config.session, app_state.clone())?;

    let router = Router::new()
        .route("/", get(notes::home))
        // Notes of the logged-in user
        .route("/notes/", get(notes::list_notes))
        .route("/add/", get(notes::add_page).post(notes::add_note))
        .route("/done/", get(notes::success))
        // Routes naming a single note
        .route("/note/:slug/", get(notes::note_detail))
        .route("/edit/:slug/", get(notes::edit_page).post(notes::edit_note))
        .route(
            "/delete/:slug/",
            get(notes::delete_page)
                .post(notes::delete_note)
                .delete(notes::delete_note),
        )
        // Accounts
        .route("/auth/login/", get(auth::login_page).post(auth::login))
        .route("/auth/logout/", get(auth::logout).post(auth::logout))
        .route("/auth/signup/", get(auth::signup_page).post(auth::signup))
        // Set the state - this makes Key extractable via FromRef
        .with_state(state);

    Ok(router)
}

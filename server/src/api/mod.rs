//! HTTP API.

pub mod web_ui;

use anyhow::Result;
use axum::Router;

use crate::error::{ErrorKind, ServerError};
use crate::State;

async fn not_found() -> ServerError {
    ErrorKind::NotFound.into()
}

/// Returns the router.
pub(crate) fn get_router(app_state: State) -> Result<Router> {
    let router = web_ui::get_router(app_state)?.fallback(not_found);

    Ok(router)
}

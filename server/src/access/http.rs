//! HTTP middlewares for access control.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Key, PrivateCookieJar};

use super::login_redirect;
use crate::api::web_ui::auth::get_session_user;
use crate::api::web_ui::WebUiState;
use crate::database::models::UserModel;

/// The logged-in user.
///
/// Anonymous requests are redirected to the login page.
#[derive(Debug)]
pub struct SessionUser(pub UserModel);

/// The logged-in user, if any.
#[derive(Debug)]
pub struct MaybeUser(pub Option<UserModel>);

#[async_trait]
impl FromRequestParts<WebUiState> for MaybeUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &WebUiState,
    ) -> Result<Self, Self::Rejection> {
        let jar = PrivateCookieJar::<Key>::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        let user = get_session_user(state, &jar)
            .await
            .map_err(IntoResponse::into_response)?;

        Ok(Self(user))
    }
}

#[async_trait]
impl FromRequestParts<WebUiState> for SessionUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &WebUiState,
    ) -> Result<Self, Self::Rejection> {
        match MaybeUser::from_request_parts(parts, state).await? {
            MaybeUser(Some(user)) => Ok(Self(user)),
            MaybeUser(None) => {
                tracing::debug!("Anonymous request to {}, redirecting to login", parts.uri);
                Err(login_redirect(&parts.uri))
            }
        }
    }
}

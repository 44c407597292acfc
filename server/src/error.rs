//! Error handling.

use std::error::Error as StdError;

use anyhow::Error as AnyError;
use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use displaydoc::Display;
use tracing_error::SpanTrace;

use jotter::slug::Slug;

pub type ServerResult<T> = Result<T, ServerError>;

/// An error.
#[derive(Debug)]
pub struct ServerError {
    /// The kind of the error.
    kind: ErrorKind,

    /// Context of where the error occurred.
    context: SpanTrace,
}

/// The kind of an error.
#[derive(Debug, Display)]
pub enum ErrorKind {
    // Generic responses
    /// The URL you requested was not found.
    NotFound,

    /// The server encountered an internal error or misconfiguration.
    InternalServerError,

    /// Bad Host
    InvalidHost,

    // Specialized responses
    /// The requested note does not exist.
    NoSuchNote,

    /// A note with slug {0} already exists.
    SlugConflict(Slug),

    /// The requested user does not exist.
    NoSuchUser,

    /// A user named {0:?} already exists.
    UsernameTaken(String),

    /// Database error: {0}
    DatabaseError(AnyError),

    /// Template error: {0}
    TemplateError(askama::Error),

    /// Password hashing error: {0}
    PasswordError(String),
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate<'a> {
    code: u16,
    message: &'a str,
}

impl ServerError {
    pub fn database_error(error: impl StdError + Send + Sync + 'static) -> Self {
        ErrorKind::DatabaseError(AnyError::new(error)).into()
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)?;
        self.context.fmt(f)?;
        Ok(())
    }
}

impl<T: Into<ErrorKind>> From<T> for ServerError {
    fn from(error: T) -> Self {
        Self {
            kind: error.into(),
            context: SpanTrace::capture(),
        }
    }
}

impl From<askama::Error> for ErrorKind {
    fn from(error: askama::Error) -> Self {
        Self::TemplateError(error)
    }
}

impl StdError for ServerError {}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        if matches!(
            self.kind,
            ErrorKind::DatabaseError(_)
                | ErrorKind::TemplateError(_)
                | ErrorKind::PasswordError(_)
        ) {
            tracing::error!("{:?}", self);
        } else {
            tracing::debug!("{}", self.kind);
        }

        let status = self.kind.http_status_code();

        // Internal details stay in the logs
        let message = match self.kind {
            ErrorKind::DatabaseError(_)
            | ErrorKind::TemplateError(_)
            | ErrorKind::PasswordError(_) => ErrorKind::InternalServerError.to_string(),
            // A missing note and someone else's note must look the same
            ErrorKind::NoSuchNote => ErrorKind::NotFound.to_string(),
            ref kind => kind.to_string(),
        };

        let template = ErrorTemplate {
            code: status.as_u16(),
            message: &message,
        };

        let body = template
            .render()
            .unwrap_or_else(|_| format!("{} {}", status.as_u16(), message));

        (status, Html(body)).into_response()
    }
}

impl ErrorKind {
    fn http_status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::InvalidHost => StatusCode::BAD_REQUEST,
            Self::NoSuchNote => StatusCode::NOT_FOUND,
            Self::NoSuchUser => StatusCode::NOT_FOUND,
            Self::SlugConflict(_) => StatusCode::CONFLICT,
            Self::UsernameTaken(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

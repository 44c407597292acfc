//! Error handling.

use std::error::Error as StdError;

use displaydoc::Display;

pub type JotterResult<T> = Result<T, JotterError>;

/// An error.
#[derive(Debug, Display, PartialEq, Eq)]
pub enum JotterError {
    /// Invalid slug {slug:?}: {reason}
    InvalidSlug { slug: String, reason: &'static str },

    /// Could not derive a slug from title {title:?}
    EmptyDerivedSlug { title: String },

    /// Invalid username {username:?}: {reason}
    InvalidUsername {
        username: String,
        reason: &'static str,
    },

    /// Field {field} is required
    FieldRequired { field: &'static str },

    /// Field {field} is too long ({len} characters, at most {max})
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },
}

impl JotterError {
    /// Returns the name of the form field this error belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidSlug { .. } | Self::EmptyDerivedSlug { .. } => "slug",
            Self::InvalidUsername { .. } => "username",
            Self::FieldRequired { field } | Self::FieldTooLong { field, .. } => *field,
        }
    }

    /// Returns a short, user-facing message suitable for a form.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidSlug { .. } => {
                "Enter a valid slug consisting of letters, numbers, underscores or hyphens."
                    .to_string()
            }
            Self::EmptyDerivedSlug { .. } => {
                "Could not build a slug from the title, please enter one.".to_string()
            }
            Self::InvalidUsername { reason, .. } => format!("Invalid username: {}.", reason),
            Self::FieldRequired { .. } => "This field is required.".to_string(),
            Self::FieldTooLong { len, max, .. } => format!(
                "Ensure this value has at most {} characters (it has {}).",
                max, len
            ),
        }
    }
}

impl StdError for JotterError {}

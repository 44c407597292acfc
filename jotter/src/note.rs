//! Note field validation.

use crate::error::{JotterError, JotterResult};
use crate::slug::Slug;

/// Maximum length of a note title, in characters.
pub const MAX_TITLE_LENGTH: usize = 100;

/// The user-editable fields of a note, after validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub text: String,

    /// An explicit slug. When `None` the slug is derived from the title.
    pub slug: Option<Slug>,
}

impl NoteDraft {
    /// Validates raw field values, collecting every error.
    ///
    /// An empty or whitespace-only slug counts as absent.
    pub fn validate(
        title: &str,
        text: &str,
        slug: Option<&str>,
    ) -> Result<Self, Vec<JotterError>> {
        let mut errors = Vec::new();

        let title = title.trim();
        if title.is_empty() {
            errors.push(JotterError::FieldRequired { field: "title" });
        } else {
            let len = title.chars().count();
            if len > MAX_TITLE_LENGTH {
                errors.push(JotterError::FieldTooLong {
                    field: "title",
                    len,
                    max: MAX_TITLE_LENGTH,
                });
            }
        }

        let text = text.trim();
        if text.is_empty() {
            errors.push(JotterError::FieldRequired { field: "text" });
        }

        let slug = match slug.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => match s.parse::<Slug>() {
                Ok(slug) => Some(slug),
                Err(e) => {
                    errors.push(e);
                    None
                }
            },
            None => None,
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Self {
            title: title.to_string(),
            text: text.to_string(),
            slug,
        })
    }

    /// Returns the explicit slug, or derives one from the title.
    pub fn resolve_slug(&self) -> JotterResult<Slug> {
        match &self.slug {
            Some(slug) => Ok(slug.clone()),
            None => Slug::from_title(&self.title),
        }
    }
}

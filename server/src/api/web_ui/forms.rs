//! Form handling for the web UI.

use std::collections::BTreeMap;

use serde::Deserialize;

use jotter::error::JotterError;
use jotter::note::NoteDraft;
use jotter::slug::Slug;

/// Appended to a slug that is already in use.
pub const WARNING: &str = " - this slug is already taken, please choose a unique value!";

/// Returns the error shown when a slug is taken.
pub fn slug_conflict_message(slug: &Slug) -> String {
    format!("{}{}", slug, WARNING)
}

/// Errors attached to form fields.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: &'static str, message: String) {
        self.0.entry(field).or_default().push(message);
    }

    pub fn add_error(&mut self, error: &JotterError) {
        self.add(error.field(), error.user_message());
    }

    /// Returns the errors for a field.
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Submitted note fields.
#[derive(Debug, Default, Deserialize)]
pub struct NoteFormData {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub slug: String,
}

/// A note form as shown to the user.
#[derive(Debug, Default)]
pub struct NoteForm {
    pub title: String,
    pub text: String,
    pub slug: String,

    /// Whether the slug can be edited.
    ///
    /// Slugs are fixed once a note exists.
    pub slug_editable: bool,

    pub errors: FieldErrors,
}

impl NoteForm {
    /// An empty form for a new note.
    pub fn blank() -> Self {
        Self {
            slug_editable: true,
            ..Default::default()
        }
    }

    /// A form for an existing note.
    pub fn for_note(title: &str, text: &str, slug: &str) -> Self {
        Self {
            title: title.to_string(),
            text: text.to_string(),
            slug: slug.to_string(),
            slug_editable: false,
            errors: FieldErrors::default(),
        }
    }

    /// A form for a new note, filled with what the user submitted.
    pub fn from_submission(data: NoteFormData) -> Self {
        Self {
            title: data.title,
            text: data.text,
            slug: data.slug,
            slug_editable: true,
            errors: FieldErrors::default(),
        }
    }

    /// Validates the fields, recording any errors on the form.
    pub fn validate(&mut self) -> Option<NoteDraft> {
        let slug = if self.slug_editable {
            Some(self.slug.as_str())
        } else {
            None
        };

        match NoteDraft::validate(&self.title, &self.text, slug) {
            Ok(draft) => Some(draft),
            Err(errors) => {
                for error in &errors {
                    self.errors.add_error(error);
                }
                None
            }
        }
    }

    /// Returns the errors for a field.
    pub fn errors_for(&self, field: &str) -> &[String] {
        self.errors.get(field)
    }
}

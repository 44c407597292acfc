//! Note slugs.
//!
//! A slug is the URL-safe identifier of a note. Slugs are unique across
//! all notes, not just per author. When a note is created without one,
//! it is derived from the title with [`slugify`].

use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{de, Deserialize, Serialize};

use crate::error::{JotterError, JotterResult};

/// Maximum length of a slug, in characters.
pub const MAX_SLUG_LENGTH: usize = 100;

lazy_static! {
    static ref SLUG_REGEX: Regex = Regex::new(r"^[-a-zA-Z0-9_]+$").unwrap();
}

/// A validated note slug.
#[derive(Serialize, Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Creates a slug from a string, validating it.
    pub fn new(slug: String) -> JotterResult<Self> {
        if slug.len() > MAX_SLUG_LENGTH {
            return Err(JotterError::InvalidSlug {
                slug,
                reason: "too long",
            });
        }

        if !SLUG_REGEX.is_match(&slug) {
            return Err(JotterError::InvalidSlug {
                slug,
                reason: "must only contain letters, numbers, underscores or hyphens",
            });
        }

        Ok(Self(slug))
    }

    /// Derives a slug from a note title.
    ///
    /// Fails if nothing of the title survives transliteration.
    pub fn from_title(title: &str) -> JotterResult<Self> {
        let slug = slugify(title);

        if slug.is_empty() {
            return Err(JotterError::EmptyDerivedSlug {
                title: title.to_string(),
            });
        }

        Self::new(slug)
    }

    /// Returns the slug as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Slug {
    type Err = JotterError;

    fn from_str(s: &str) -> JotterResult<Self> {
        Self::new(s.to_owned())
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for Slug {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(de::Error::custom)
    }
}

/// Turns arbitrary text into a slug.
///
/// The text is transliterated to ASCII and lowercased. Characters other
/// than letters, digits, underscores, hyphens and whitespace are dropped,
/// runs of whitespace and hyphens become a single hyphen, and leading or
/// trailing hyphens and underscores are trimmed. The result is cut to
/// [`MAX_SLUG_LENGTH`] characters.
///
/// The function is deterministic and `slugify(slugify(s)) == slugify(s)`.
/// The result may be empty.
pub fn slugify(text: &str) -> String {
    let ascii = deunicode::deunicode(text).to_lowercase();

    let mut slug = String::with_capacity(ascii.len());
    let mut pending_separator = false;

    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c);
        } else if c == '-' || c.is_whitespace() {
            pending_separator = true;
        }
    }

    // ASCII only at this point, so byte truncation is safe
    slug.truncate(MAX_SLUG_LENGTH);

    slug.trim_matches(|c| c == '-' || c == '_').to_string()
}

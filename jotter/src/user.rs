//! Usernames.

use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{JotterError, JotterResult};

/// Maximum length of a username, in characters.
pub const MAX_USERNAME_LENGTH: usize = 150;

/// Minimum length of a password, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

lazy_static! {
    static ref USERNAME_REGEX: Regex = Regex::new(r"^[\w.@+-]+$").unwrap();
}

/// A validated username.
///
/// Letters (including non-ASCII ones), digits and `@.+-_` are allowed.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct Username(String);

impl Username {
    pub fn new(username: String) -> JotterResult<Self> {
        if username.is_empty() {
            return Err(JotterError::InvalidUsername {
                username,
                reason: "must not be empty",
            });
        }

        if username.chars().count() > MAX_USERNAME_LENGTH {
            return Err(JotterError::InvalidUsername {
                username,
                reason: "too long",
            });
        }

        if !USERNAME_REGEX.is_match(&username) {
            return Err(JotterError::InvalidUsername {
                username,
                reason: "only letters, digits and @/./+/-/_ are allowed",
            });
        }

        Ok(Self(username))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Username {
    type Err = JotterError;

    fn from_str(s: &str) -> JotterResult<Self> {
        Self::new(s.to_owned())
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

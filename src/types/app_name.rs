// ABOUTME: Validated container app names.
// ABOUTME: Enforces the RFC 1123 label rules the platform applies to app names.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppNameError {
    #[error("app name cannot be empty")]
    Empty,

    #[error("app name exceeds {max} characters: {len}")]
    TooLong { len: usize, max: usize },

    #[error("app name cannot begin or end with a hyphen")]
    EdgeHyphen,

    #[error("invalid character in app name: '{0}'")]
    InvalidChar(char),
}

/// A platform-valid application name: lowercase alphanumerics and hyphens,
/// at most 32 characters so revision suffixes stay within platform limits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AppName(String);

const MAX_LEN: usize = 32;

impl AppName {
    pub fn new(value: &str) -> Result<Self, AppNameError> {
        if value.is_empty() {
            return Err(AppNameError::Empty);
        }
        if value.len() > MAX_LEN {
            return Err(AppNameError::TooLong {
                len: value.len(),
                max: MAX_LEN,
            });
        }
        if value.starts_with('-') || value.ends_with('-') {
            return Err(AppNameError::EdgeHyphen);
        }
        if let Some(c) = value
            .chars()
            .find(|c| !c.is_ascii_lowercase() && !c.is_ascii_digit() && *c != '-')
        {
            return Err(AppNameError::InvalidChar(c));
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

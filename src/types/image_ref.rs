// ABOUTME: Container image reference validation.
// ABOUTME: Accepts registry/name:tag@digest forms; the platform pulls by this string.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseImageRefError {
    #[error("image reference cannot be empty")]
    Empty,

    #[error("invalid character in image reference: '{0}'")]
    InvalidChar(char),

    #[error("image reference has an empty {0} component")]
    EmptyComponent(&'static str),
}

/// A validated image reference.
///
/// The managed platform pulls images server-side, so the reference is kept
/// as the original string and components are sliced out on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn parse(input: &str) -> Result<Self, ParseImageRefError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ParseImageRefError::Empty);
        }

        if let Some(c) = input.chars().find(|c| {
            !c.is_ascii_alphanumeric() && !matches!(c, '/' | ':' | '.' | '-' | '_' | '@')
        }) {
            return Err(ParseImageRefError::InvalidChar(c));
        }

        let parsed = Self(input.to_string());
        if parsed.repository().is_empty() {
            return Err(ParseImageRefError::EmptyComponent("repository"));
        }
        if matches!(parsed.tag(), Some("")) {
            return Err(ParseImageRefError::EmptyComponent("tag"));
        }
        if matches!(parsed.digest(), Some("")) {
            return Err(ParseImageRefError::EmptyComponent("digest"));
        }

        Ok(parsed)
    }

    /// The full reference as given.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Everything before the tag/digest: `registry/name`.
    pub fn repository(&self) -> &str {
        let before_digest = self.0.split('@').next().unwrap_or(&self.0);
        match before_digest.rsplit_once(':') {
            // A colon after the last slash separates the tag; a colon inside
            // the registry host (port) does not.
            Some((repo, maybe_tag)) if !maybe_tag.contains('/') => repo,
            _ => before_digest,
        }
    }

    pub fn tag(&self) -> Option<&str> {
        let before_digest = self.0.split('@').next().unwrap_or(&self.0);
        match before_digest.rsplit_once(':') {
            Some((_, tag)) if !tag.contains('/') => Some(tag),
            _ => None,
        }
    }

    pub fn digest(&self) -> Option<&str> {
        self.0.split_once('@').map(|(_, digest)| digest)
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

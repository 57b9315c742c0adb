//! Repository key addressing one record.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Opaque identifier of one repository record.
///
/// Derived from the `owner/name` pair by the surrounding system; core only
/// requires it to be non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepoKey(String);

/// Rejected repository key input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoKeyError {
    Empty,
    InvalidSegment(String),
}

impl Display for RepoKeyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "repository key cannot be empty"),
            Self::InvalidSegment(value) => {
                write!(f, "invalid repository key segment: `{value}`")
            }
        }
    }
}

impl Error for RepoKeyError {}

impl RepoKey {
    /// Wraps an already-derived key.
    pub fn new(raw: impl Into<String>) -> Result<Self, RepoKeyError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(RepoKeyError::Empty);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Derives `owner/name`.
    ///
    /// Both segments are trimmed and must be non-empty and free of `/`.
    pub fn from_owner_and_name(owner: &str, name: &str) -> Result<Self, RepoKeyError> {
        let owner = normalize_segment(owner)?;
        let name = normalize_segment(name)?;
        Ok(Self(format!("{owner}/{name}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RepoKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn normalize_segment(value: &str) -> Result<&str, RepoKeyError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.contains('/') {
        return Err(RepoKeyError::InvalidSegment(value.to_string()));
    }
    Ok(trimmed)
}

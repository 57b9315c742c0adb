//! Author reference data.

use serde::{Deserialize, Serialize};

/// Immutable user reference embedded in issues, comments and commits.
///
/// Users are resolved by `id` through a `UserDirectory`; the record only
/// stores the snapshot taken at write time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct User {
    pub id: String,
    /// Display name, e.g. `Ada Lovelace`.
    pub name: String,
    /// Handle, e.g. `ada`.
    pub username: String,
    pub avatar_url: String,
}

impl User {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        username: impl Into<String>,
        avatar_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            username: username.into(),
            avatar_url: avatar_url.into(),
        }
    }
}

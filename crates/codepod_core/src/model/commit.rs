//! Commit model.
//!
//! A commit records one successful file content update. It is not linked to
//! a path or a diff.

use crate::model::user::User;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Globally unique commit identifier (UUID v4).
pub type CommitId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Commit {
    pub id: CommitId,
    pub message: String,
    pub author: User,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl Commit {
    /// Creates a commit with a freshly generated identifier.
    pub fn new(message: impl Into<String>, author: User, created_at: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            message: message.into(),
            author,
            created_at,
        }
    }
}

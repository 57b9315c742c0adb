//! Repository metadata shown in listings and repository headers.

use crate::model::user::User;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Repository {
    pub id: String,
    pub name: String,
    pub owner: User,
    pub description: String,
    pub stars: u32,
    pub forks: u32,
    /// Unix epoch milliseconds.
    pub updated_at: i64,
    pub is_private: bool,
}

impl Repository {
    /// `true` when this repository is addressed by `owner/name`.
    pub fn is_addressed_by(&self, owner: &str, name: &str) -> bool {
        self.owner.username == owner.trim() && self.name == name.trim()
    }
}

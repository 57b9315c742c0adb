//! Pull request reference data.

use crate::model::user::User;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PullRequestStatus {
    Open,
    Closed,
    Merged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PullRequest {
    pub id: u64,
    pub title: String,
    pub author: User,
    pub status: PullRequestStatus,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Source branch name.
    pub branch: String,
}

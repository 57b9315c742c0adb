//! Issue domain model.
//!
//! # Invariants
//! - `id` is unique within one record and assigned as `max + 1`.
//! - `comments_count` mirrors the length of the issue's comment sequence.

use crate::model::user::User;
use serde::{Deserialize, Serialize};

/// Issue identifier, unique within one repository record.
pub type IssueId = u64;

/// Issue lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    Open,
    InProgress,
    Closed,
}

impl IssueStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Closed => "closed",
        }
    }
}

/// Issue label reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Label {
    pub id: String,
    pub name: String,
    /// Presentation color token, opaque to core.
    pub color: String,
}

impl Label {
    pub fn new(id: impl Into<String>, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Issue {
    pub id: IssueId,
    pub title: String,
    pub body: String,
    pub author: User,
    pub status: IssueStatus,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    pub labels: Vec<Label>,
    /// Derived from the comment sequence; never set directly by callers.
    pub comments_count: u32,
}

impl Issue {
    /// Creates a freshly opened issue with no labels and no comments.
    pub fn open(
        id: IssueId,
        title: impl Into<String>,
        body: impl Into<String>,
        author: User,
        created_at: i64,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            body: body.into(),
            author,
            status: IssueStatus::Open,
            created_at,
            labels: Vec::new(),
            comments_count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Issue, IssueStatus};
    use crate::model::user::User;

    #[test]
    fn open_issue_starts_without_labels_or_comments() {
        let author = User::new("user-1", "Ada Lovelace", "ada", "https://example.com/ada");
        let issue = Issue::open(7, "title", "body", author, 42);
        assert_eq!(issue.status, IssueStatus::Open);
        assert!(issue.labels.is_empty());
        assert_eq!(issue.comments_count, 0);
    }

    #[test]
    fn status_serializes_as_snake_case() {
        let json = serde_json::to_string(&IssueStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        assert_eq!(IssueStatus::InProgress.as_str(), "in_progress");
    }

    #[test]
    fn issue_serializes_with_camel_case_fields() {
        let author = User::new("user-1", "Ada Lovelace", "ada", "https://example.com/ada");
        let value = serde_json::to_value(Issue::open(1, "t", "b", author, 5)).unwrap();
        assert_eq!(value["commentsCount"], 0);
        assert_eq!(value["createdAt"], 5);
        assert_eq!(value["author"]["avatarUrl"], "https://example.com/ada");
    }
}

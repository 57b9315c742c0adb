//! Issue comment model and identifier scheme.
//!
//! Comment ids have the form `comment-<issue_id>-<sequence>`, where
//! `sequence` starts at 1 and increases per issue.

use crate::model::issue::IssueId;
use crate::model::user::User;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

static COMMENT_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^comment-(\d+)-(\d+)$").expect("valid comment id regex"));

/// Per-issue comment identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(String);

impl CommentId {
    pub fn new(issue_id: IssueId, sequence: u64) -> Self {
        Self(format!("comment-{issue_id}-{sequence}"))
    }

    /// Splits the id into `(issue_id, sequence)`.
    ///
    /// Returns `None` when the id does not follow the comment id scheme.
    pub fn parts(&self) -> Option<(IssueId, u64)> {
        let caps = COMMENT_ID_RE.captures(&self.0)?;
        let issue_id = caps.get(1)?.as_str().parse().ok()?;
        let sequence = caps.get(2)?.as_str().parse().ok()?;
        Some((issue_id, sequence))
    }

    /// Returns the per-issue sequence number, if the id is well formed.
    pub fn sequence(&self) -> Option<u64> {
        self.parts().map(|(_, sequence)| sequence)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CommentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Comment {
    pub id: CommentId,
    pub author: User,
    pub body: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl Comment {
    pub fn new(
        issue_id: IssueId,
        sequence: u64,
        author: User,
        body: impl Into<String>,
        created_at: i64,
    ) -> Self {
        Self {
            id: CommentId::new(issue_id, sequence),
            author,
            body: body.into(),
            created_at,
        }
    }
}

/// Returns the sequence number the next comment on an issue should use.
///
/// `None` when the highest sequence is already `u64::MAX`.
pub fn next_comment_sequence(comments: &[Comment]) -> Option<u64> {
    match comments.iter().filter_map(|comment| comment.id.sequence()).max() {
        Some(max) => max.checked_add(1),
        None => Some(1),
    }
}

#[cfg(test)]
mod tests {
    use super::{next_comment_sequence, Comment, CommentId};
    use crate::model::user::User;

    fn author() -> User {
        User::new("user-2", "Grace Hopper", "grace", "https://example.com/grace")
    }

    #[test]
    fn comment_id_round_trips_parts() {
        let id = CommentId::new(12, 3);
        assert_eq!(id.as_str(), "comment-12-3");
        assert_eq!(id.parts(), Some((12, 3)));
    }

    #[test]
    fn malformed_comment_id_has_no_sequence() {
        let id: CommentId = serde_json::from_str("\"7\"").unwrap();
        assert_eq!(id.sequence(), None);
        let id: CommentId = serde_json::from_str("\"comment-1-x\"").unwrap();
        assert_eq!(id.parts(), None);
    }

    #[test]
    fn next_sequence_starts_at_one_and_skips_gaps() {
        assert_eq!(next_comment_sequence(&[]), Some(1));

        let comments = vec![
            Comment::new(4, 1, author(), "a", 1),
            Comment::new(4, 5, author(), "b", 2),
        ];
        assert_eq!(next_comment_sequence(&comments), Some(6));
    }

    #[test]
    fn next_sequence_is_none_at_ceiling() {
        let comments = vec![Comment::new(4, u64::MAX, author(), "last", 1)];
        assert_eq!(comments[0].id.sequence(), Some(u64::MAX));
        assert_eq!(next_comment_sequence(&comments), None);
    }
}

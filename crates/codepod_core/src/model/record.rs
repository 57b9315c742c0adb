//! Repository record: the unit of persistence for one repository key.
//!
//! # Responsibility
//! - Hold issues, comments, files and commits for one repository.
//! - Provide pure read helpers and in-place mutation primitives.
//! - Check structural invariants before save and after load.
//!
//! # Invariants
//! - Issue ids are unique; new ids are `max + 1` (or 1 when empty).
//! - `issues` and `commits` are ordered most-recent first.
//! - Every `comments_by_issue` key names an existing issue and every comment
//!   id in a sequence names that issue with a unique, increasing sequence.
//! - `Issue::comments_count` equals the length of its comment sequence.
//! - Every file entry's `path` equals its map key.

use crate::model::comment::{next_comment_sequence, Comment, CommentId};
use crate::model::commit::Commit;
use crate::model::file::FileContent;
use crate::model::issue::{Issue, IssueId};
use crate::model::tree::{build_file_tree, FileNode};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Version of the persisted record shape written by this binary.
pub const RECORD_VERSION: u32 = 1;

/// Structural invariant violation found in a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValidationError {
    DuplicateIssueId(IssueId),
    CommentsForUnknownIssue(IssueId),
    ForeignCommentId {
        issue_id: IssueId,
        comment_id: CommentId,
    },
    CommentIdsNotIncreasing {
        issue_id: IssueId,
        comment_id: CommentId,
    },
    CommentsCountMismatch {
        issue_id: IssueId,
        stored: u32,
        actual: usize,
    },
    FilePathMismatch {
        key: String,
        path: String,
    },
}

impl Display for RecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateIssueId(id) => write!(f, "duplicate issue id {id}"),
            Self::CommentsForUnknownIssue(id) => {
                write!(f, "comments stored for unknown issue {id}")
            }
            Self::ForeignCommentId {
                issue_id,
                comment_id,
            } => write!(f, "comment `{comment_id}` does not belong to issue {issue_id}"),
            Self::CommentIdsNotIncreasing {
                issue_id,
                comment_id,
            } => write!(
                f,
                "comment `{comment_id}` breaks increasing order on issue {issue_id}"
            ),
            Self::CommentsCountMismatch {
                issue_id,
                stored,
                actual,
            } => write!(
                f,
                "issue {issue_id} reports {stored} comments but has {actual}"
            ),
            Self::FilePathMismatch { key, path } => {
                write!(f, "file stored under `{key}` reports path `{path}`")
            }
        }
    }
}

impl Error for RecordValidationError {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RepoRecord {
    /// Most-recently-created first.
    pub issues: Vec<Issue>,
    /// Insertion order per issue.
    pub comments_by_issue: BTreeMap<IssueId, Vec<Comment>>,
    pub files: BTreeMap<String, FileContent>,
    /// Most-recent first; append-only from the caller's point of view.
    pub commits: Vec<Commit>,
}

impl RepoRecord {
    /// Returns the identifier the next created issue receives.
    ///
    /// `None` when the highest stored id leaves no room for a successor.
    pub fn next_issue_id(&self) -> Option<IssueId> {
        match self.issues.iter().map(|issue| issue.id).max() {
            Some(max) => max.checked_add(1),
            None => Some(1),
        }
    }

    pub fn issue(&self, issue_id: IssueId) -> Option<&Issue> {
        self.issues.iter().find(|issue| issue.id == issue_id)
    }

    /// Comments of one issue; empty for unknown issues.
    pub fn comments(&self, issue_id: IssueId) -> &[Comment] {
        self.comments_by_issue
            .get(&issue_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn file(&self, path: &str) -> Option<&FileContent> {
        self.files.get(path)
    }

    /// All file paths in lexicographic order.
    pub fn file_paths(&self) -> Vec<String> {
        self.files.keys().cloned().collect()
    }

    /// File paths arranged as a directory tree.
    pub fn file_tree(&self) -> Vec<FileNode> {
        build_file_tree(self.files.keys().map(String::as_str))
    }

    /// Inserts a new issue at the head of the sequence.
    pub fn push_issue(&mut self, issue: Issue) {
        self.issues.insert(0, issue);
    }

    /// Sequence number for the next comment on `issue_id`.
    ///
    /// `None` when the highest stored sequence leaves no room for a successor.
    pub fn next_comment_sequence(&self, issue_id: IssueId) -> Option<u64> {
        next_comment_sequence(self.comments(issue_id))
    }

    /// Appends a comment to an existing issue and refreshes its counter.
    ///
    /// Returns `false` without touching the record when the issue is unknown.
    pub fn push_comment(&mut self, issue_id: IssueId, comment: Comment) -> bool {
        let Some(issue) = self.issues.iter_mut().find(|issue| issue.id == issue_id) else {
            return false;
        };
        let comments = self.comments_by_issue.entry(issue_id).or_default();
        comments.push(comment);
        issue.comments_count = count_to_u32(comments.len());
        true
    }

    /// Overwrites the content of an existing file.
    ///
    /// Returns `false` without touching the record when the path is unknown.
    pub fn overwrite_file(&mut self, path: &str, content: impl Into<String>) -> bool {
        match self.files.get_mut(path) {
            Some(file) => {
                file.content = content.into();
                true
            }
            None => false,
        }
    }

    /// Prepends a commit to the history.
    pub fn push_commit(&mut self, commit: Commit) {
        self.commits.insert(0, commit);
    }

    /// Recomputes every issue's `comments_count` from the comment sequences.
    pub fn sync_comment_counts(&mut self) {
        for issue in &mut self.issues {
            let count = self
                .comments_by_issue
                .get(&issue.id)
                .map_or(0, Vec::len);
            issue.comments_count = count_to_u32(count);
        }
    }

    /// Checks all structural invariants of the record.
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        let mut issue_ids = HashSet::with_capacity(self.issues.len());
        for issue in &self.issues {
            if !issue_ids.insert(issue.id) {
                return Err(RecordValidationError::DuplicateIssueId(issue.id));
            }
            let actual = self.comments(issue.id).len();
            if issue.comments_count as usize != actual {
                return Err(RecordValidationError::CommentsCountMismatch {
                    issue_id: issue.id,
                    stored: issue.comments_count,
                    actual,
                });
            }
        }

        for (issue_id, comments) in &self.comments_by_issue {
            if !issue_ids.contains(issue_id) {
                return Err(RecordValidationError::CommentsForUnknownIssue(*issue_id));
            }
            let mut previous = 0;
            for comment in comments {
                match comment.id.parts() {
                    Some((owner, sequence)) if owner == *issue_id => {
                        if sequence <= previous {
                            return Err(RecordValidationError::CommentIdsNotIncreasing {
                                issue_id: *issue_id,
                                comment_id: comment.id.clone(),
                            });
                        }
                        previous = sequence;
                    }
                    _ => {
                        return Err(RecordValidationError::ForeignCommentId {
                            issue_id: *issue_id,
                            comment_id: comment.id.clone(),
                        });
                    }
                }
            }
        }

        for (key, file) in &self.files {
            if key != &file.path {
                return Err(RecordValidationError::FilePathMismatch {
                    key: key.clone(),
                    path: file.path.clone(),
                });
            }
        }

        Ok(())
    }
}

fn count_to_u32(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::{RecordValidationError, RepoRecord};
    use crate::model::comment::{Comment, CommentId};
    use crate::model::file::FileContent;
    use crate::model::issue::Issue;
    use crate::model::user::User;

    fn ada() -> User {
        User::new("user-1", "Ada Lovelace", "ada", "https://example.com/ada")
    }

    fn record_with_issues(ids: &[u64]) -> RepoRecord {
        let mut record = RepoRecord::default();
        for id in ids {
            record.push_issue(Issue::open(*id, "t", "b", ada(), 0));
        }
        record
    }

    #[test]
    fn next_issue_id_uses_max_plus_one() {
        assert_eq!(RepoRecord::default().next_issue_id(), Some(1));
        assert_eq!(record_with_issues(&[2, 9, 4]).next_issue_id(), Some(10));
    }

    #[test]
    fn next_issue_id_is_none_at_id_ceiling() {
        assert_eq!(record_with_issues(&[3, u64::MAX]).next_issue_id(), None);
    }

    #[test]
    fn push_comment_updates_counter_and_ignores_unknown_issue() {
        let mut record = record_with_issues(&[1]);

        let seq = record.next_comment_sequence(1).unwrap();
        assert!(record.push_comment(1, Comment::new(1, seq, ada(), "hi", 0)));
        assert_eq!(record.comments(1)[0].id.as_str(), "comment-1-1");
        assert_eq!(record.issue(1).unwrap().comments_count, 1);
        assert_eq!(record.next_comment_sequence(1), Some(2));

        let before = record.clone();
        assert!(!record.push_comment(2, Comment::new(2, 1, ada(), "x", 0)));
        assert_eq!(record, before);
        record.validate().unwrap();
    }

    #[test]
    fn overwrite_file_only_touches_existing_paths() {
        let mut record = RepoRecord::default();
        record
            .files
            .insert("a.txt".to_string(), FileContent::new("a.txt", "old"));

        assert!(record.overwrite_file("a.txt", "new"));
        assert!(!record.overwrite_file("b.txt", "new"));
        assert_eq!(record.file("a.txt").unwrap().content, "new");
        assert!(record.file("b.txt").is_none());
    }

    #[test]
    fn validate_rejects_count_mismatch_and_duplicates() {
        let mut record = record_with_issues(&[1]);
        record.issues[0].comments_count = 2;
        assert!(matches!(
            record.validate(),
            Err(RecordValidationError::CommentsCountMismatch { issue_id: 1, .. })
        ));

        record.sync_comment_counts();
        record.validate().unwrap();

        record.push_issue(Issue::open(1, "dup", "b", ada(), 0));
        assert_eq!(
            record.validate(),
            Err(RecordValidationError::DuplicateIssueId(1))
        );
    }

    #[test]
    fn validate_rejects_foreign_and_unordered_comment_ids() {
        let mut record = record_with_issues(&[1]);
        record
            .comments_by_issue
            .insert(1, vec![Comment::new(2, 1, ada(), "x", 0)]);
        record.sync_comment_counts();
        assert!(matches!(
            record.validate(),
            Err(RecordValidationError::ForeignCommentId { .. })
        ));

        record.comments_by_issue.insert(
            1,
            vec![
                Comment::new(1, 2, ada(), "x", 0),
                Comment::new(1, 1, ada(), "y", 0),
            ],
        );
        record.sync_comment_counts();
        assert_eq!(
            record.validate(),
            Err(RecordValidationError::CommentIdsNotIncreasing {
                issue_id: 1,
                comment_id: CommentId::new(1, 1),
            })
        );
    }

    #[test]
    fn validate_rejects_comments_for_missing_issue_and_path_mismatch() {
        let mut record = RepoRecord::default();
        record.comments_by_issue.insert(5, Vec::new());
        assert_eq!(
            record.validate(),
            Err(RecordValidationError::CommentsForUnknownIssue(5))
        );

        let mut record = RepoRecord::default();
        record
            .files
            .insert("a.txt".to_string(), FileContent::new("b.txt", ""));
        assert!(matches!(
            record.validate(),
            Err(RecordValidationError::FilePathMismatch { .. })
        ));
    }
}

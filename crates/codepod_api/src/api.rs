//! Route-level façade over the repository actor registry.
//!
//! # Responsibility
//! - Validate transport input before it reaches an actor.
//! - Derive the repository key from `owner` + `repo` path segments.
//! - Wrap actor results in the response envelope with a status code.
//!
//! # Invariants
//! - Methods never panic; every failure becomes an error envelope.
//! - Validation failures never reach (or seed) a repository actor.
//! - Text fields are stored exactly as sent; trimming only decides blankness.

use crate::envelope::{ApiError, ApiReply, ApiResponse, STATUS_CREATED, STATUS_OK};
use codepod_core::db::{open_db, DbError};
use codepod_core::{
    Comment, Commit, CoreConfig, FileContent, FileNode, Issue, IssueId, PullRequest, RepoHandle,
    RepoKey, RepoRegistry, Repository, RepositoryCatalog, SqliteRecordRepository, StaticCatalog,
    StaticUserDirectory,
};
use log::warn;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;

/// Body of `POST .../issues`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIssueRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub author_id: Option<String>,
}

/// Body of `POST .../issues/:id/comments`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCommentRequest {
    pub body: Option<String>,
    pub author_id: Option<String>,
}

/// Body of `POST .../contents/:path`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFileRequest {
    /// May be empty, but must be present.
    pub content: Option<String>,
    pub message: Option<String>,
    pub author_id: Option<String>,
}

/// Façade entry point; one instance per process.
pub struct CodepodApi {
    registry: RepoRegistry,
    catalog: Arc<dyn RepositoryCatalog>,
}

impl CodepodApi {
    /// Serves records from `registry` and listings from the seeded catalog.
    pub fn new(registry: RepoRegistry) -> Self {
        Self {
            registry,
            catalog: Arc::new(StaticCatalog::seeded()),
        }
    }

    pub fn with_catalog(mut self, catalog: Arc<dyn RepositoryCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    /// Opens the configured database with the seeded user directory.
    pub fn open(config: &CoreConfig) -> Result<Self, DbError> {
        let store = SqliteRecordRepository::new(open_db(&config.db_path)?);
        Ok(Self::new(RepoRegistry::new(
            Arc::new(store),
            Arc::new(StaticUserDirectory::seeded()),
        )))
    }

    pub fn registry(&self) -> &RepoRegistry {
        &self.registry
    }

    /// `GET /user/repos`
    pub fn list_repositories(&self) -> ApiReply<Vec<Repository>> {
        respond("list_repositories", STATUS_OK, || Ok(self.catalog.repositories()))
    }

    /// `GET /repos/:owner/:repo`
    pub fn get_repository(&self, owner: &str, repo: &str) -> ApiReply<Repository> {
        respond("get_repository", STATUS_OK, || {
            RepoKey::from_owner_and_name(owner, repo)?;
            self.catalog
                .repository(owner, repo)
                .ok_or(ApiError::NotFound("Repository not found"))
        })
    }

    /// `GET /repos/:owner/:repo/pulls`
    pub fn get_pull_requests(&self, owner: &str, repo: &str) -> ApiReply<Vec<PullRequest>> {
        respond("get_pull_requests", STATUS_OK, || {
            let key = RepoKey::from_owner_and_name(owner, repo)?;
            Ok(self.catalog.pull_requests(&key))
        })
    }

    /// `GET /repos/:owner/:repo/issues`
    pub fn get_issues(&self, owner: &str, repo: &str) -> ApiReply<Vec<Issue>> {
        respond("get_issues", STATUS_OK, || {
            Ok(self.repo(owner, repo)?.get_issues()?)
        })
    }

    /// `POST /repos/:owner/:repo/issues`
    pub fn create_issue(
        &self,
        owner: &str,
        repo: &str,
        request: &CreateIssueRequest,
    ) -> ApiReply<Issue> {
        respond("create_issue", STATUS_CREATED, || {
            let title = required_text(&request.title, "Title and body are required")?;
            let body = required_text(&request.body, "Title and body are required")?;
            let author_id = required_text(&request.author_id, "Author is required")?;
            Ok(self.repo(owner, repo)?.create_issue(title, body, author_id)?)
        })
    }

    /// `GET /repos/:owner/:repo/issues/:id`
    pub fn get_issue(&self, owner: &str, repo: &str, issue_id: &str) -> ApiReply<Issue> {
        respond("get_issue", STATUS_OK, || {
            let issue_id = parse_issue_id(issue_id)?;
            self.repo(owner, repo)?
                .get_issue(issue_id)?
                .ok_or(ApiError::NotFound("Issue not found"))
        })
    }

    /// `GET /repos/:owner/:repo/issues/:id/comments`
    pub fn get_comments(&self, owner: &str, repo: &str, issue_id: &str) -> ApiReply<Vec<Comment>> {
        respond("get_comments", STATUS_OK, || {
            let issue_id = parse_issue_id(issue_id)?;
            Ok(self.repo(owner, repo)?.get_comments(issue_id)?)
        })
    }

    /// `POST /repos/:owner/:repo/issues/:id/comments`
    pub fn add_comment(
        &self,
        owner: &str,
        repo: &str,
        issue_id: &str,
        request: &AddCommentRequest,
    ) -> ApiReply<Comment> {
        respond("add_comment", STATUS_CREATED, || {
            let issue_id = parse_issue_id(issue_id)?;
            let body = required_text(&request.body, "Comment body is required")?;
            let author_id = required_text(&request.author_id, "Author is required")?;
            Ok(self
                .repo(owner, repo)?
                .add_comment(issue_id, body, author_id)?)
        })
    }

    /// `GET /repos/:owner/:repo/contents/:path`
    pub fn get_file_content(&self, owner: &str, repo: &str, path: &str) -> ApiReply<FileContent> {
        respond("get_file_content", STATUS_OK, || {
            let path = required_path(path)?;
            self.repo(owner, repo)?
                .get_file_content(path)?
                .ok_or(ApiError::NotFound("File not found"))
        })
    }

    /// `POST /repos/:owner/:repo/contents/:path`
    pub fn update_file_content(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        request: &UpdateFileRequest,
    ) -> ApiReply<Commit> {
        respond("update_file_content", STATUS_CREATED, || {
            let path = required_path(path)?;
            let content = request
                .content
                .as_deref()
                .ok_or_else(|| ApiError::Validation("Content and message are required".into()))?;
            let message = required_text(&request.message, "Content and message are required")?;
            let author_id = required_text(&request.author_id, "Author is required")?;
            Ok(self
                .repo(owner, repo)?
                .update_file_content(path, content, message, author_id)?)
        })
    }

    /// `GET /repos/:owner/:repo/commits`
    pub fn get_commits(&self, owner: &str, repo: &str) -> ApiReply<Vec<Commit>> {
        respond("get_commits", STATUS_OK, || {
            Ok(self.repo(owner, repo)?.get_commits()?)
        })
    }

    /// `GET /repos/:owner/:repo/tree`
    pub fn get_tree(&self, owner: &str, repo: &str) -> ApiReply<Vec<FileNode>> {
        respond("get_tree", STATUS_OK, || {
            Ok(self.repo(owner, repo)?.get_file_tree()?)
        })
    }

    fn repo(&self, owner: &str, repo: &str) -> Result<RepoHandle, ApiError> {
        let key = RepoKey::from_owner_and_name(owner, repo)?;
        Ok(self.registry.handle(&key)?)
    }
}

fn respond<T>(
    route: &'static str,
    success_status: u16,
    f: impl FnOnce() -> Result<T, ApiError>,
) -> ApiReply<T> {
    let started_at = Instant::now();
    match f() {
        Ok(data) => ApiReply {
            status: success_status,
            body: ApiResponse::ok(data),
        },
        Err(err) => {
            warn!(
                "event=api_request module=api status=error route={} http_status={} duration_ms={} error_code={} error={}",
                route,
                err.status(),
                started_at.elapsed().as_millis(),
                err.code(),
                err
            );
            ApiReply {
                status: err.status(),
                body: ApiResponse::failure(err.client_message()),
            }
        }
    }
}

fn required_text<'a>(value: &'a Option<String>, message: &str) -> Result<&'a str, ApiError> {
    match value.as_deref() {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(ApiError::Validation(message.to_string())),
    }
}

fn required_path(path: &str) -> Result<&str, ApiError> {
    let trimmed = path.trim().trim_start_matches('/');
    if trimmed.is_empty() {
        return Err(ApiError::Validation("File path is required".to_string()));
    }
    Ok(trimmed)
}

fn parse_issue_id(raw: &str) -> Result<IssueId, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::Validation(format!("invalid issue id `{raw}`")))
}

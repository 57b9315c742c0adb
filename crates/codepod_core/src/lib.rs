//! Core domain logic for CodePod repositories.
//! This crate is the single source of truth for repository record invariants.

pub mod catalog;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod seed;
pub mod service;
pub mod users;

pub use catalog::{RepositoryCatalog, StaticCatalog};
pub use config::CoreConfig;
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::comment::{Comment, CommentId};
pub use model::commit::{Commit, CommitId};
pub use model::file::FileContent;
pub use model::issue::{Issue, IssueId, IssueStatus, Label};
pub use model::key::{RepoKey, RepoKeyError};
pub use model::pull::{PullRequest, PullRequestStatus};
pub use model::record::{RecordValidationError, RepoRecord, RECORD_VERSION};
pub use model::repository::Repository;
pub use model::tree::{build_file_tree, FileNode, FileNodeKind};
pub use model::user::User;
pub use repo::record_repo::{
    LoadedRecord, RecordRepository, RepoError, RepoResult, SqliteRecordRepository,
};
pub use service::registry::RepoRegistry;
pub use service::repo_actor::{ActorError, ActorResult, RepoHandle};
pub use users::{StaticUserDirectory, UserDirectory};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

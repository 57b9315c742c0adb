//! Read-only repository listings and pull requests.
//!
//! Unlike repository records, this reference data is not seeded per key and
//! never changes through an actor operation.

use crate::model::key::RepoKey;
use crate::model::pull::PullRequest;
use crate::model::repository::Repository;

/// Source of repository metadata and pull request listings.
pub trait RepositoryCatalog: Send + Sync {
    /// Every listed repository.
    fn repositories(&self) -> Vec<Repository>;

    /// The repository whose owner username and name match.
    fn repository(&self, owner: &str, name: &str) -> Option<Repository> {
        self.repositories()
            .into_iter()
            .find(|repo| repo.is_addressed_by(owner, name))
    }

    /// Pull requests for one repository key.
    fn pull_requests(&self, key: &RepoKey) -> Vec<PullRequest>;
}

/// Fixed catalog; every key lists the same pull requests.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    repositories: Vec<Repository>,
    pull_requests: Vec<PullRequest>,
}

impl StaticCatalog {
    pub fn new(repositories: Vec<Repository>, pull_requests: Vec<PullRequest>) -> Self {
        Self {
            repositories,
            pull_requests,
        }
    }

    pub fn seeded() -> Self {
        Self::new(
            crate::seed::seed_repositories(),
            crate::seed::seed_pull_requests(),
        )
    }
}

impl RepositoryCatalog for StaticCatalog {
    fn repositories(&self) -> Vec<Repository> {
        self.repositories.clone()
    }

    fn pull_requests(&self, _key: &RepoKey) -> Vec<PullRequest> {
        self.pull_requests.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::{RepositoryCatalog, StaticCatalog};
    use crate::model::key::RepoKey;

    #[test]
    fn seeded_catalog_finds_repository_by_owner_and_name() {
        let catalog = StaticCatalog::seeded();
        assert_eq!(catalog.repositories().len(), 3);
        assert_eq!(
            catalog.repository("ada", "dotfiles").map(|repo| repo.id),
            Some("repo-3".to_string())
        );
        assert!(catalog.repository("grace", "dotfiles").is_none());
    }

    #[test]
    fn empty_catalog_lists_nothing() {
        let catalog = StaticCatalog::default();
        let key = RepoKey::new("ada/codepod").unwrap();
        assert!(catalog.repositories().is_empty());
        assert!(catalog.pull_requests(&key).is_empty());
    }
}

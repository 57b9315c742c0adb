//! Static seed content for fresh repository records.
//!
//! # Responsibility
//! - Build the default record materialized on first access to a key.
//! - Provide the default user table for `StaticUserDirectory::seeded()`.
//! - Provide the repository and pull request listings for
//!   `StaticCatalog::seeded()`.
//!
//! # Invariants
//! - `seed_record()` always passes `RepoRecord::validate()`.
//! - The seeded commit history is empty.

use crate::model::comment::Comment;
use crate::model::file::FileContent;
use crate::model::issue::{Issue, IssueStatus, Label};
use crate::model::pull::{PullRequest, PullRequestStatus};
use crate::model::record::RepoRecord;
use crate::model::repository::Repository;
use crate::model::user::User;

const AVATAR_BASE_URL: &str = "https://i.pravatar.cc/150?u=";

const SEED_FILES: &[(&str, &str)] = &[
    (
        "README.md",
        "# CodePod\n\nA full-featured, collaborative Git platform for modern development, built on the Cloudflare edge.",
    ),
    (
        "package.json",
        "{\n  \"name\": \"codepod\",\n  \"version\": \"0.0.1\",\n  \"dependencies\": {\n    \"react\": \"^18.3.1\"\n  }\n}",
    ),
    (
        "src/App.tsx",
        "import React from 'react';\n\nfunction App() {\n  return <h1>Hello, CodePod!</h1>;\n}\n\nexport default App;",
    ),
    (
        "src/components/Button.tsx",
        "import React from 'react';\n\nexport const Button = () => <button>Click me</button>;",
    ),
    (
        "src/components/Card.tsx",
        "import React from 'react';\n\nexport const Card = ({ children }) => <div>{children}</div>;",
    ),
    ("src/index.css", "body { margin: 0; }"),
];

fn seed_user(id: &str, name: &str, username: &str) -> User {
    User::new(id, name, username, format!("{AVATAR_BASE_URL}{username}"))
}

fn ada() -> User {
    seed_user("user-1", "Ada Lovelace", "ada")
}

fn grace() -> User {
    seed_user("user-2", "Grace Hopper", "grace")
}

fn alan() -> User {
    seed_user("user-3", "Alan Turing", "alan")
}

/// Default users: Ada (`user-1`), Grace (`user-2`) and Alan (`user-3`).
pub fn seed_users() -> Vec<User> {
    vec![ada(), grace(), alan()]
}

/// Repositories owned by Ada, most recently updated first.
pub fn seed_repositories() -> Vec<Repository> {
    let listing = [
        (
            "repo-1",
            "codepod",
            "A full-featured, collaborative Git platform for modern development, built on the Cloudflare edge.",
            1024,
            256,
            1_723_716_000_000,
            false,
        ),
        (
            "repo-2",
            "edge-runtime",
            "A high-performance runtime for serverless applications.",
            512,
            64,
            1_723_638_600_000,
            false,
        ),
        (
            "repo-3",
            "dotfiles",
            "My personal configuration files.",
            128,
            16,
            1_723_449_600_000,
            true,
        ),
    ];

    listing
        .into_iter()
        .map(
            |(id, name, description, stars, forks, updated_at, is_private)| Repository {
                id: id.to_string(),
                name: name.to_string(),
                owner: ada(),
                description: description.to_string(),
                stars,
                forks,
                updated_at,
                is_private,
            },
        )
        .collect()
}

/// Pull requests listed for every repository.
pub fn seed_pull_requests() -> Vec<PullRequest> {
    vec![
        PullRequest {
            id: 1,
            title: "feat: Add user authentication".to_string(),
            author: grace(),
            status: PullRequestStatus::Open,
            created_at: 1_723_744_800_000,
            branch: "feat/auth".to_string(),
        },
        PullRequest {
            id: 2,
            title: "fix: Correct responsive layout issues".to_string(),
            author: alan(),
            status: PullRequestStatus::Merged,
            created_at: 1_723_629_600_000,
            branch: "fix/responsive".to_string(),
        },
    ]
}

/// Builds the default record for a repository key seen for the first time.
pub fn seed_record() -> RepoRecord {
    let (ada, grace, alan) = (ada(), grace(), alan());

    let bug = Label::new("label-1", "bug", "bg-red-500");
    let feature = Label::new("label-2", "feature", "bg-blue-500");
    let docs = Label::new("label-3", "documentation", "bg-green-500");

    let issues = vec![
        Issue {
            labels: vec![bug],
            ..Issue::open(
                1,
                "Fix button alignment on mobile",
                "The main action button is misaligned on screen widths below 480px. It should be centered.",
                grace.clone(),
                1_723_719_600_000,
            )
        },
        Issue {
            status: IssueStatus::InProgress,
            labels: vec![feature],
            ..Issue::open(
                2,
                "Implement dark mode",
                "Add a theme toggle to switch between light and dark modes. The theme should be persisted in local storage.",
                alan,
                1_723_627_200_000,
            )
        },
        Issue {
            status: IssueStatus::Closed,
            labels: vec![docs],
            ..Issue::open(
                3,
                "Update README with setup instructions",
                "The README.md file is missing instructions on how to set up the project locally.",
                ada.clone(),
                1_723_474_800_000,
            )
        },
    ];

    let issue_one_comments = vec![
        Comment::new(1, 1, ada.clone(), "I can take a look at this.", 1_723_719_900_000),
        Comment::new(
            1,
            2,
            grace,
            "Thanks @ada! Let me know if you need any help.",
            1_723_720_200_000,
        ),
        Comment::new(
            1,
            3,
            ada,
            "I have a fix ready. Will open a PR shortly.",
            1_723_730_400_000,
        ),
    ];

    let mut record = RepoRecord {
        issues,
        comments_by_issue: [(1, issue_one_comments)].into_iter().collect(),
        files: SEED_FILES
            .iter()
            .map(|(path, content)| (path.to_string(), FileContent::new(*path, *content)))
            .collect(),
        commits: Vec::new(),
    };
    record.sync_comment_counts();
    record
}

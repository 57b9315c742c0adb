use codepod_core::db::open_db;
use codepod_core::{RepoKey, RepoRegistry, SqliteRecordRepository, StaticUserDirectory};
use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

fn registry_at(path: &std::path::Path) -> Arc<RepoRegistry> {
    let store = SqliteRecordRepository::new(open_db(path).unwrap());
    Arc::new(RepoRegistry::new(
        Arc::new(store),
        Arc::new(StaticUserDirectory::seeded()),
    ))
}

#[test]
fn concurrent_first_access_seeds_once() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry_at(&dir.path().join("codepod.db"));
    let key = RepoKey::new("ada/demo").unwrap();
    let barrier = Arc::new(Barrier::new(8));

    let workers: Vec<_> = (0..8)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let key = key.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                registry.handle(&key).unwrap().get_issues().unwrap()
            })
        })
        .collect();

    let results: Vec<_> = workers
        .into_iter()
        .map(|worker| worker.join().unwrap())
        .collect();
    assert!(results.iter().all(|issues| issues == &results[0]));
    assert_eq!(results[0].len(), 3);
    assert_eq!(registry.len(), 1);
}

#[test]
fn concurrent_creates_on_one_key_never_collide() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry_at(&dir.path().join("codepod.db"));
    let key = RepoKey::new("ada/demo").unwrap();
    let barrier = Arc::new(Barrier::new(6));

    let workers: Vec<_> = (0..6)
        .map(|worker| {
            let registry = Arc::clone(&registry);
            let key = key.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let repo = registry.handle(&key).unwrap();
                barrier.wait();
                (0..5)
                    .map(|round| {
                        repo.create_issue(format!("w{worker} r{round}"), "b", "user-1")
                            .unwrap()
                            .id
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut ids = HashSet::new();
    for worker in workers {
        let created = worker.join().unwrap();
        // Each caller observes its own issues in increasing id order.
        assert!(created.windows(2).all(|pair| pair[0] < pair[1]));
        ids.extend(created);
    }
    assert_eq!(ids.len(), 30);
    assert_eq!(ids, (4..=33).collect::<HashSet<u64>>());

    let repo = registry.handle(&key).unwrap();
    let listed: Vec<u64> = repo.get_issues().unwrap().iter().map(|i| i.id).collect();
    let mut expected: Vec<u64> = (4..=33).rev().collect();
    expected.extend([1, 2, 3]);
    assert_eq!(listed, expected);
}

#[test]
fn concurrent_comments_keep_count_consistent() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry_at(&dir.path().join("codepod.db"));
    let key = RepoKey::new("ada/demo").unwrap();

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let repo = registry.handle(&key).unwrap();
            thread::spawn(move || {
                for _ in 0..10 {
                    repo.add_comment(3, "ack", "user-3").unwrap();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let repo = registry.handle(&key).unwrap();
    let comments = repo.get_comments(3).unwrap();
    assert_eq!(comments.len(), 40);
    assert_eq!(repo.get_issue(3).unwrap().unwrap().comments_count, 40);
    let unique: HashSet<_> = comments.iter().map(|c| c.id.clone()).collect();
    assert_eq!(unique.len(), 40);
}

#[test]
fn registry_reopened_on_same_database_sees_prior_writes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("codepod.db");
    let key = RepoKey::new("ada/demo").unwrap();

    {
        let registry = registry_at(&path);
        let repo = registry.handle(&key).unwrap();
        repo.create_issue("persisted", "b", "user-2").unwrap();
        repo.update_file_content("README.md", "# v2", "Update readme", "user-2")
            .unwrap();
    }

    let registry = registry_at(&path);
    let repo = registry.handle(&key).unwrap();
    assert_eq!(repo.get_issues().unwrap()[0].title, "persisted");
    assert_eq!(repo.get_commits().unwrap().len(), 1);
    assert_eq!(
        repo.get_file_content("README.md").unwrap().unwrap().content,
        "# v2"
    );
}

use codepod_core::db::open_db_in_memory;
use codepod_core::{RepoKey, RepoRegistry, SqliteRecordRepository, StaticUserDirectory};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn registry(idle_timeout: Duration) -> Arc<RepoRegistry> {
    let store = SqliteRecordRepository::new(open_db_in_memory().unwrap());
    Arc::new(
        RepoRegistry::new(Arc::new(store), Arc::new(StaticUserDirectory::seeded()))
            .with_idle_timeout(idle_timeout),
    )
}

fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..500 {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    false
}

#[test]
fn idle_actor_is_reaped_and_respawned_with_same_record() {
    let registry = registry(Duration::from_millis(20));
    let key = RepoKey::from_owner_and_name("ada", "codepod").unwrap();

    let created = registry
        .handle(&key)
        .unwrap()
        .create_issue("kept across restarts", "b", "user-1")
        .unwrap();

    assert!(eventually(|| registry.running() == 0));
    assert_eq!(registry.reap_idle(), 1);
    assert!(registry.is_empty());

    let repo = registry.handle(&key).unwrap();
    assert_eq!(registry.len(), 1);
    let issues = repo.get_issues().unwrap();
    assert_eq!(issues[0], created);
    assert_eq!(issues.len(), 4);
}

#[test]
fn many_idle_keys_leave_no_workers_behind() {
    let registry = registry(Duration::from_millis(20));

    for n in 0..50 {
        let key = RepoKey::from_owner_and_name("ada", &format!("repo-{n}")).unwrap();
        registry.handle(&key).unwrap().get_commits().unwrap();
    }

    assert!(eventually(|| registry.running() == 0));
    registry.reap_idle();
    assert!(registry.is_empty());
    assert_eq!(registry.persisted_keys().unwrap().len(), 50);
}

#[test]
fn held_handle_restarts_its_worker_after_idle() {
    let registry = registry(Duration::from_millis(20));
    let key = RepoKey::new("demo").unwrap();
    let repo = registry.handle(&key).unwrap();

    assert_eq!(repo.add_comment(1, "first", "user-2").unwrap().id.as_str(), "comment-1-4");
    assert!(eventually(|| registry.running() == 0));

    // A live handle keeps the mailbox registered.
    assert_eq!(registry.reap_idle(), 0);
    assert_eq!(registry.len(), 1);

    let comment = repo.add_comment(1, "second", "user-2").unwrap();
    assert_eq!(comment.id.as_str(), "comment-1-5");
    let other = registry.handle(&key).unwrap();
    assert_eq!(other.get_comments(1).unwrap().len(), 5);
    assert_eq!(registry.len(), 1);
}

#[test]
fn writes_stay_serialized_while_workers_retire() {
    let registry = registry(Duration::from_millis(1));
    let key = RepoKey::new("ada/churn").unwrap();

    let workers: Vec<_> = (0..4)
        .map(|worker| {
            let registry = Arc::clone(&registry);
            let key = key.clone();
            thread::spawn(move || {
                (0..20)
                    .map(|round| {
                        if round % 5 == 0 {
                            thread::sleep(Duration::from_millis(3));
                        }
                        registry
                            .handle(&key)
                            .unwrap()
                            .create_issue(format!("w{worker} r{round}"), "b", "user-3")
                            .unwrap()
                            .id
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut ids = HashSet::new();
    for worker in workers {
        ids.extend(worker.join().unwrap());
    }
    assert_eq!(ids, (4..=83).collect::<HashSet<u64>>());

    let repo = registry.handle(&key).unwrap();
    assert_eq!(repo.get_issues().unwrap().len(), 83);
}

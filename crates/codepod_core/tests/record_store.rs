use codepod_core::db::open_db;
use codepod_core::seed::seed_record;
use codepod_core::{
    RecordRepository, RepoError, RepoKey, RepoRecord, SqliteRecordRepository, RECORD_VERSION,
};
use rusqlite::params;
use std::path::Path;
use std::sync::{Arc, Barrier};
use std::thread;

fn open_store(path: &Path) -> SqliteRecordRepository {
    SqliteRecordRepository::new(open_db(path).unwrap())
}

fn demo_key() -> RepoKey {
    RepoKey::from_owner_and_name("ada", "demo").unwrap()
}

#[test]
fn record_survives_reopening_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("codepod.db");
    let key = demo_key();

    let store = open_store(&path);
    let mut record = store.load_or_seed(&key, &seed_record).unwrap().record;
    record.overwrite_file("README.md", "# Renamed");
    store.save(&key, &record).unwrap();
    drop(store);

    let reopened = open_store(&path);
    let loaded = reopened.load(&key).unwrap().unwrap();
    assert_eq!(loaded.file("README.md").unwrap().content, "# Renamed");
    assert_eq!(reopened.list_keys().unwrap(), vec![key]);
}

#[test]
fn load_returns_none_for_unknown_key() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir.path().join("codepod.db"));
    assert!(store.load(&demo_key()).unwrap().is_none());
    assert!(store.list_keys().unwrap().is_empty());
}

#[test]
fn unknown_record_version_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("codepod.db");
    let key = demo_key();

    let store = open_store(&path);
    store.load_or_seed(&key, &seed_record).unwrap();

    let raw = open_db(&path).unwrap();
    raw.execute(
        "UPDATE repo_records SET record_version = ?1 WHERE repo_key = ?2;",
        params![RECORD_VERSION + 1, key.as_str()],
    )
    .unwrap();

    let err = store.load(&key).unwrap_err();
    match err {
        RepoError::UnsupportedRecordVersion { found, supported } => {
            assert_eq!(found, RECORD_VERSION + 1);
            assert_eq!(supported, RECORD_VERSION);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn payload_with_unrecognized_fields_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("codepod.db");
    let key = demo_key();

    let raw = open_db(&path).unwrap();
    raw.execute(
        "INSERT INTO repo_records (repo_key, record_version, payload) VALUES (?1, ?2, ?3);",
        params![
            key.as_str(),
            RECORD_VERSION,
            r#"{"issues":[],"comments":{},"files":{},"commits":[]}"#
        ],
    )
    .unwrap();

    let store = open_store(&path);
    let err = store.load(&key).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
    let err = store.load_or_seed(&key, &seed_record).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn payload_violating_invariants_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("codepod.db");
    let key = demo_key();

    let mut record = seed_record();
    record.issues[0].comments_count = 7;
    let payload = serde_json::to_string(&record).unwrap();

    let raw = open_db(&path).unwrap();
    raw.execute(
        "INSERT INTO repo_records (repo_key, record_version, payload) VALUES (?1, ?2, ?3);",
        params![key.as_str(), RECORD_VERSION, payload],
    )
    .unwrap();

    let err = open_store(&path).load(&key).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
}

#[test]
fn concurrent_seeding_across_connections_produces_one_record() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("codepod.db");
    open_db(&path).unwrap();

    let key = demo_key();
    let barrier = Arc::new(Barrier::new(4));
    let workers: Vec<_> = (0..4)
        .map(|index| {
            let path = path.clone();
            let key = key.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let store = open_store(&path);
                barrier.wait();
                // Each worker tags its seed so the winner is identifiable.
                let seed = move || {
                    let mut record = RepoRecord::default();
                    record.files.insert(
                        "owner.txt".to_string(),
                        codepod_core::FileContent::new("owner.txt", index.to_string()),
                    );
                    record
                };
                store.load_or_seed(&key, &seed).unwrap()
            })
        })
        .collect();

    let results: Vec<_> = workers
        .into_iter()
        .map(|worker| worker.join().unwrap())
        .collect();

    assert_eq!(results.iter().filter(|loaded| loaded.seeded).count(), 1);
    let first = &results[0].record;
    assert!(results.iter().all(|loaded| &loaded.record == first));
}

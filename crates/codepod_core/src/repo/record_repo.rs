//! Repository record store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist one serialized `RepoRecord` per repository key.
//! - Seed a missing record exactly once, even across connections.
//! - Reject persisted shapes this binary does not understand.
//!
//! # Invariants
//! - Write paths call `RepoRecord::validate()` before SQL mutations.
//! - Read paths reject unknown `record_version` values, undecodable payloads
//!   and invariant violations instead of masking them.
//! - A record is always written as a whole; there are no partial updates.

use crate::db::DbError;
use crate::model::key::RepoKey;
use crate::model::record::{RecordValidationError, RepoRecord, RECORD_VERSION};
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, MutexGuard, PoisonError};

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence error for record load/save operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Validation(RecordValidationError),
    NotFound(RepoKey),
    InvalidData(String),
    UnsupportedRecordVersion { found: u32, supported: u32 },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "invalid repository record: {err}"),
            Self::NotFound(key) => write!(f, "repository record not found: {key}"),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted repository record: {message}")
            }
            Self::UnsupportedRecordVersion { found, supported } => write!(
                f,
                "repository record version {found} is not supported (expected {supported})"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
            Self::InvalidData(_) => None,
            Self::UnsupportedRecordVersion { .. } => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<RecordValidationError> for RepoError {
    fn from(value: RecordValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Result of `RecordRepository::load_or_seed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedRecord {
    pub record: RepoRecord,
    /// `true` when this call inserted the seed record.
    pub seeded: bool,
}

/// Storage contract for repository records.
///
/// Shared by every repository actor, so implementations must be usable from
/// multiple threads.
pub trait RecordRepository: Send + Sync {
    /// Loads the record for `key`, if one was persisted.
    fn load(&self, key: &RepoKey) -> RepoResult<Option<RepoRecord>>;

    /// Loads the record for `key`, persisting `seed()` first when absent.
    ///
    /// At most one caller ever observes `seeded == true` for a key.
    fn load_or_seed(
        &self,
        key: &RepoKey,
        seed: &dyn Fn() -> RepoRecord,
    ) -> RepoResult<LoadedRecord>;

    /// Replaces the persisted record for an existing key.
    fn save(&self, key: &RepoKey, record: &RepoRecord) -> RepoResult<()>;

    /// Lists keys that have a persisted record, sorted ascending.
    fn list_keys(&self) -> RepoResult<Vec<RepoKey>>;
}

/// SQLite-backed record repository.
///
/// Owns one connection; the mutex is held for a single statement or
/// transaction at a time.
pub struct SqliteRecordRepository {
    conn: Mutex<Connection>,
}

impl SqliteRecordRepository {
    /// Wraps a migrated connection (see `db::open_db`).
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RecordRepository for SqliteRecordRepository {
    fn load(&self, key: &RepoKey) -> RepoResult<Option<RepoRecord>> {
        let conn = self.conn();
        let row = conn
            .query_row(
                "SELECT record_version, payload FROM repo_records WHERE repo_key = ?1;",
                [key.as_str()],
                |row| Ok((row.get::<_, u32>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;

        match row {
            Some((version, payload)) => decode_record(key, version, &payload).map(Some),
            None => Ok(None),
        }
    }

    fn load_or_seed(
        &self,
        key: &RepoKey,
        seed: &dyn Fn() -> RepoRecord,
    ) -> RepoResult<LoadedRecord> {
        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let existing = tx
            .query_row(
                "SELECT record_version, payload FROM repo_records WHERE repo_key = ?1;",
                [key.as_str()],
                |row| Ok((row.get::<_, u32>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;

        if let Some((version, payload)) = existing {
            tx.commit()?;
            return Ok(LoadedRecord {
                record: decode_record(key, version, &payload)?,
                seeded: false,
            });
        }

        let record = seed();
        let payload = encode_record(&record)?;
        tx.execute(
            "INSERT INTO repo_records (repo_key, record_version, payload)
             VALUES (?1, ?2, ?3);",
            params![key.as_str(), RECORD_VERSION, payload],
        )?;
        tx.commit()?;

        info!(
            "event=record_seed module=repo status=ok repo={} issues={} files={}",
            key,
            record.issues.len(),
            record.files.len()
        );
        Ok(LoadedRecord {
            record,
            seeded: true,
        })
    }

    fn save(&self, key: &RepoKey, record: &RepoRecord) -> RepoResult<()> {
        let payload = encode_record(record)?;
        let changed = self.conn().execute(
            "UPDATE repo_records
             SET
                record_version = ?2,
                payload = ?3,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE repo_key = ?1;",
            params![key.as_str(), RECORD_VERSION, payload],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(key.clone()));
        }

        Ok(())
    }

    fn list_keys(&self) -> RepoResult<Vec<RepoKey>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT repo_key FROM repo_records ORDER BY repo_key ASC;")?;
        let mut rows = stmt.query([])?;
        let mut keys = Vec::new();
        while let Some(row) = rows.next()? {
            let raw: String = row.get(0)?;
            let key = RepoKey::new(raw.as_str()).map_err(|_| {
                RepoError::InvalidData(format!("invalid repo_key value `{raw}`"))
            })?;
            keys.push(key);
        }
        Ok(keys)
    }
}

fn encode_record(record: &RepoRecord) -> RepoResult<String> {
    record.validate()?;
    serde_json::to_string(record)
        .map_err(|err| RepoError::InvalidData(format!("failed to encode record: {err}")))
}

fn decode_record(key: &RepoKey, version: u32, payload: &str) -> RepoResult<RepoRecord> {
    if version != RECORD_VERSION {
        error!(
            "event=record_load module=repo status=error repo={} error_code=unsupported_version version={}",
            key, version
        );
        return Err(RepoError::UnsupportedRecordVersion {
            found: version,
            supported: RECORD_VERSION,
        });
    }

    let record: RepoRecord = serde_json::from_str(payload).map_err(|err| {
        error!(
            "event=record_load module=repo status=error repo={} error_code=decode_failed",
            key
        );
        RepoError::InvalidData(format!("payload for `{key}` does not decode: {err}"))
    })?;
    record.validate()?;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::{RecordRepository, RepoError, SqliteRecordRepository};
    use crate::db::open_db_in_memory;
    use crate::model::key::RepoKey;
    use crate::model::record::RepoRecord;
    use crate::seed::seed_record;

    fn repo() -> SqliteRecordRepository {
        SqliteRecordRepository::new(open_db_in_memory().unwrap())
    }

    #[test]
    fn load_or_seed_seeds_once() {
        let repo = repo();
        let key = RepoKey::new("ada/demo").unwrap();

        let first = repo.load_or_seed(&key, &seed_record).unwrap();
        assert!(first.seeded);

        let second = repo
            .load_or_seed(&key, &|| -> RepoRecord { panic!("seed must not run twice") })
            .unwrap();
        assert!(!second.seeded);
        assert_eq!(second.record, first.record);
    }

    #[test]
    fn save_requires_existing_row() {
        let repo = repo();
        let key = RepoKey::new("ada/missing").unwrap();
        let err = repo.save(&key, &seed_record()).unwrap_err();
        assert!(matches!(err, RepoError::NotFound(found) if found == key));
    }

    #[test]
    fn save_rejects_invalid_record() {
        let repo = repo();
        let key = RepoKey::new("ada/demo").unwrap();
        let mut record = repo.load_or_seed(&key, &seed_record).unwrap().record;
        record.issues[0].comments_count = 42;

        let err = repo.save(&key, &record).unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
        assert_eq!(repo.load(&key).unwrap().unwrap(), seed_record());
    }
}

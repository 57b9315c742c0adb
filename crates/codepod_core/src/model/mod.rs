//! Repository record domain model.
//!
//! # Responsibility
//! - Define the typed record persisted once per repository key.
//! - Keep identifier schemes and derived counters in one place.
//!
//! # Invariants
//! - Every type here serializes with camelCase field names.
//! - `RepoRecord::validate()` is the single check for structural invariants.

pub mod comment;
pub mod commit;
pub mod file;
pub mod issue;
pub mod key;
pub mod pull;
pub mod record;
pub mod repository;
pub mod tree;
pub mod user;

/// Returns the current wall-clock time in Unix epoch milliseconds.
///
/// Clamps to `0` if the system clock reports a time before the epoch.
pub fn now_epoch_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

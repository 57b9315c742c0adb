//! Keyed registry of repository actors.
//!
//! # Responsibility
//! - Map repository keys to actor mailboxes.
//! - Start an actor the first time a key is addressed.
//! - Forget keys whose worker retired and that nobody holds a handle to.
//!
//! # Invariants
//! - At most one mailbox exists per key at any time, so a key never has two
//!   workers writing its record.
//! - The registry lock guards mailbox lookup, creation and reaping only; it
//!   is released before any actor operation runs.

use crate::model::key::RepoKey;
use crate::model::record::RepoRecord;
use crate::repo::record_repo::RecordRepository;
use crate::seed::seed_record;
use crate::service::repo_actor::{
    ActorDeps, ActorError, ActorResult, ActorSlot, RepoHandle, DEFAULT_IDLE_TIMEOUT,
};
use crate::users::UserDirectory;
use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Registry handing out one actor handle per repository key.
pub struct RepoRegistry {
    deps: ActorDeps,
    actors: Mutex<HashMap<RepoKey, Arc<ActorSlot>>>,
}

impl RepoRegistry {
    /// Creates a registry seeding new records with `seed::seed_record`.
    pub fn new(store: Arc<dyn RecordRepository>, users: Arc<dyn UserDirectory>) -> Self {
        Self {
            deps: ActorDeps {
                store,
                users,
                seed: seed_record,
                idle_timeout: DEFAULT_IDLE_TIMEOUT,
            },
            actors: Mutex::new(HashMap::new()),
        }
    }

    /// Replaces the seed used for keys without a persisted record.
    pub fn with_seed(mut self, seed: fn() -> RepoRecord) -> Self {
        self.deps.seed = seed;
        self
    }

    /// Sets how long a worker waits for work before it retires.
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.deps.idle_timeout = idle_timeout;
        self
    }

    /// Returns the actor handle for `key`, starting a worker if none runs.
    ///
    /// # Errors
    /// - `ActorError::Spawn` when the worker thread cannot be started.
    pub fn handle(&self, key: &RepoKey) -> ActorResult<RepoHandle> {
        let mut actors = self.actors();
        reap(&mut actors);

        let slot = actors
            .entry(key.clone())
            .or_insert_with(|| ActorSlot::new(key.clone(), self.deps.clone()));
        slot.ensure_running()?;
        Ok(RepoHandle::new(Arc::clone(slot)))
    }

    /// Drops mailboxes whose worker retired and that no handle references.
    ///
    /// Returns the number of keys forgotten. `handle` does this on every
    /// call; this entry point lets an owner sweep without addressing a key.
    pub fn reap_idle(&self) -> usize {
        reap(&mut self.actors())
    }

    /// Keys with a persisted record, including ones without a live actor.
    pub fn persisted_keys(&self) -> ActorResult<Vec<RepoKey>> {
        self.deps.store.list_keys().map_err(ActorError::from)
    }

    /// Number of tracked mailboxes.
    pub fn len(&self) -> usize {
        self.actors().len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors().is_empty()
    }

    /// Number of mailboxes with an attached worker thread.
    pub fn running(&self) -> usize {
        self.actors()
            .values()
            .filter(|slot| slot.is_running())
            .count()
    }

    fn actors(&self) -> MutexGuard<'_, HashMap<RepoKey, Arc<ActorSlot>>> {
        self.actors.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// New references to a slot only come from this map under its lock or from
// cloning an existing handle, so a strong count of 1 here cannot grow.
fn reap(actors: &mut HashMap<RepoKey, Arc<ActorSlot>>) -> usize {
    let before = actors.len();
    actors.retain(|_, slot| Arc::strong_count(slot) > 1 || slot.is_running());
    let reaped = before - actors.len();
    if reaped > 0 {
        debug!(
            "event=actor_reap module=registry status=ok reaped={} remaining={}",
            reaped,
            actors.len()
        );
    }
    reaped
}

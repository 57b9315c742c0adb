//! Author resolution capability.
//!
//! # Responsibility
//! - Define the seam through which the actor resolves author identifiers.
//! - Provide a fixed-table implementation for seeded/demo deployments.
//!
//! # Invariants
//! - Resolution is read-only; the actor never creates users.

use crate::model::user::User;
use std::collections::BTreeMap;

/// Resolves user identifiers to user reference data.
///
/// Implementations are shared by every repository actor and must be safe to
/// call from multiple threads.
pub trait UserDirectory: Send + Sync {
    fn resolve(&self, user_id: &str) -> Option<User>;
}

/// Fixed in-memory user table keyed by user id.
#[derive(Debug, Clone, Default)]
pub struct StaticUserDirectory {
    users: BTreeMap<String, User>,
}

impl StaticUserDirectory {
    pub fn new(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            users: users
                .into_iter()
                .map(|user| (user.id.clone(), user))
                .collect(),
        }
    }

    /// Directory containing the default seed users.
    pub fn seeded() -> Self {
        Self::new(crate::seed::seed_users())
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl UserDirectory for StaticUserDirectory {
    fn resolve(&self, user_id: &str) -> Option<User> {
        self.users.get(user_id.trim()).cloned()
    }
}

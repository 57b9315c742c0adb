//! Persistence layer for repository records.
//!
//! # Responsibility
//! - Define the storage contract the repository actor depends on.
//! - Keep SQL and payload encoding details out of the actor.
//!
//! # Invariants
//! - Records are validated on every write and every read.
//! - Storage APIs return semantic errors (`NotFound`, unsupported versions)
//!   in addition to DB transport errors.

pub mod record_repo;

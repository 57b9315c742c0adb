//! Repository actor services.
//!
//! # Responsibility
//! - Serialize every operation on one repository record through its actor.
//! - Keep façade layers decoupled from storage details.

pub mod registry;
pub mod repo_actor;

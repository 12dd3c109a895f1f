//! Journal domain model: entries, tags and their validation rules.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep validation next to the data it guards.
//!
//! # Invariants
//! - Every record is identified by a store-assigned integer id.
//! - Entry -> tag links live only on the entry side (`Entry::tag_ids`).
//! - Deletion is a hard delete; there are no tombstones.

pub mod entry;
pub mod tag;

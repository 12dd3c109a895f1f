//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Stamp timestamps, validate input and publish change events.
//!
//! # Invariants
//! - Services never bypass repository contracts.
//! - A change event is published only after the write it describes
//!   succeeded.

use chrono::{DateTime, SubsecRound, Utc};

pub mod entry_service;
pub mod tag_service;

/// Current instant at storage precision (milliseconds), so values read back
/// from the store compare equal to the ones that were written.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

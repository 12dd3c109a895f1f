//! Core domain logic for the NBA journal.
//! This crate is the single source of truth for entry/tag invariants and
//! query semantics.

pub mod config;
pub mod db;
pub mod live;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod seed;
pub mod service;
pub mod state;

pub use config::JournalConfig;
pub use live::{Change, ChangeFeed, ChangeKind, Collection, LiveQuery, Subscription};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel};
pub use model::entry::{
    Entry, EntryId, EntryPatch, EntryValidationError, NewEntry, DEFAULT_ENTRY_TYPE, ENTRY_TYPES,
};
pub use model::tag::{NewTag, Tag, TagCategory, TagId, TagPatch, TagValidationError};
pub use query::{body_preview, DateRange, EntryFilter, SortOrder, TagMatch, ALL_TYPES};
pub use repo::entry_repo::{EntryRepository, SqliteEntryRepository};
pub use repo::tag_repo::{SqliteTagRepository, TagRepository};
pub use repo::{RecordRef, RepoError, RepoResult};
pub use seed::{ensure_seeded, open_seeded_db, SeedOutcome};
pub use service::entry_service::{EntryService, EntryServiceError};
pub use service::tag_service::{tag_categories, TagService, TagServiceError};
pub use state::SelectionState;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

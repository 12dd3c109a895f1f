//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the storage contracts for the `entries` and `tags` collections.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Update/delete of a missing id returns `RepoError::NotFound`, never a
//!   silent no-op.
//! - Read paths reject undecodable persisted state instead of masking it.
//! - Repositories enforce no uniqueness beyond the generated id.

use crate::db::DbError;
use crate::model::entry::EntryId;
use crate::model::tag::TagId;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod entry_repo;
pub mod tag_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Identifies the record an operation could not find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordRef {
    Entry(EntryId),
    Tag(TagId),
}

impl Display for RecordRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Entry(id) => write!(f, "entry {id}"),
            Self::Tag(id) => write!(f, "tag {id}"),
        }
    }
}

/// Storage-layer error shared by both repositories.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(RecordRef),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(record) => write!(f, "{record} not found"),
            Self::InvalidData(message) => write!(f, "invalid persisted journal data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
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

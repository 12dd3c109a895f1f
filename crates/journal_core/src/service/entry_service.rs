//! Entry use-case service.
//!
//! # Responsibility
//! - Provide entry create/update/delete/read APIs.
//! - Stamp `date_created` (when absent) and `date_modified`.
//! - Route every filtered read through the shared query engine.
//!
//! # Invariants
//! - A caller-supplied `date_created` is authoritative and never overwritten.
//! - Every successful update refreshes `date_modified`.
//! - Entry operations never create, update or delete tags.

use crate::live::{Change, ChangeFeed, ChangeKind, Collection};
use crate::model::entry::{Entry, EntryId, EntryPatch, EntryValidationError, NewEntry};
use crate::query::{apply_filter, EntryFilter, SortOrder, TagMatch};
use crate::repo::entry_repo::{DateOrder, EntryListQuery, EntryRepository, EntryRow};
use crate::repo::{RecordRef, RepoError};
use crate::service::now;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Default size of the "recent entries" list.
pub const RECENT_ENTRIES_DEFAULT_LIMIT: u32 = 10;

/// Service error for entry use-cases.
#[derive(Debug)]
pub enum EntryServiceError {
    /// Input rejected before reaching the store.
    Validation(EntryValidationError),
    /// Target entry does not exist.
    NotFound(EntryId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for EntryServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "entry not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EntryServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::NotFound(_) => None,
        }
    }
}

impl From<EntryValidationError> for EntryServiceError {
    fn from(value: EntryValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for EntryServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(RecordRef::Entry(id)) => Self::NotFound(id),
            other => Self::Repo(other),
        }
    }
}

pub type EntryServiceResult<T> = Result<T, EntryServiceError>;

/// Entry service facade over repository implementations.
pub struct EntryService<R: EntryRepository> {
    repo: R,
    feed: ChangeFeed,
}

impl<R: EntryRepository> EntryService<R> {
    /// Creates a service with its own, unobserved change feed.
    pub fn new(repo: R) -> Self {
        Self::with_feed(repo, ChangeFeed::new())
    }

    /// Creates a service publishing writes to `feed`.
    pub fn with_feed(repo: R, feed: ChangeFeed) -> Self {
        Self { repo, feed }
    }

    pub fn feed(&self) -> &ChangeFeed {
        &self.feed
    }

    /// Creates one entry and returns its store-assigned id.
    ///
    /// `date_created` falls back to the save instant only when the input has
    /// none; `date_modified` is always the save instant.
    pub fn create_entry(&self, input: NewEntry) -> EntryServiceResult<EntryId> {
        if let Err(err) = input.validate() {
            warn!("event=entry_create module=entry_service status=rejected reason={err}");
            return Err(err.into());
        }

        let saved_at = now();
        let row = EntryRow {
            date_created: input.date_created.unwrap_or(saved_at),
            date_modified: saved_at,
            title: input.title,
            body: input.body,
            kind: input.kind,
            tag_ids: input.tag_ids,
        };

        let id = self.repo.insert_entry(&row)?;
        info!(
            "event=entry_create module=entry_service status=ok entry_id={id} tag_count={}",
            row.tag_ids.len()
        );
        self.feed
            .publish(Change::new(Collection::Entries, ChangeKind::Created));
        Ok(id)
    }

    pub fn get_entry_by_id(&self, id: EntryId) -> EntryServiceResult<Option<Entry>> {
        Ok(self.repo.get_entry(id)?)
    }

    /// All entries, newest journal date first.
    pub fn get_all_entries(&self) -> EntryServiceResult<Vec<Entry>> {
        Ok(self.repo.list_entries(&EntryListQuery::default())?)
    }

    /// Applies a partial update and returns the stored result.
    ///
    /// Fields absent from `patch` keep their value; `date_modified` is always
    /// refreshed, overriding any value carried by the patch.
    pub fn update_entry(&self, id: EntryId, patch: EntryPatch) -> EntryServiceResult<Entry> {
        patch.validate()?;

        let stamped = EntryPatch {
            date_modified: Some(now()),
            ..patch
        };
        if let Err(err) = self.repo.update_entry(id, &stamped) {
            warn!("event=entry_update module=entry_service status=error entry_id={id} error={err}");
            return Err(err.into());
        }

        info!("event=entry_update module=entry_service status=ok entry_id={id}");
        self.feed
            .publish(Change::new(Collection::Entries, ChangeKind::Updated));
        self.repo
            .get_entry(id)?
            .ok_or(EntryServiceError::NotFound(id))
    }

    /// Hard-deletes one entry. Tags are left untouched.
    pub fn delete_entry(&self, id: EntryId) -> EntryServiceResult<()> {
        self.repo.delete_entry(id)?;
        info!("event=entry_delete module=entry_service status=ok entry_id={id}");
        self.feed
            .publish(Change::new(Collection::Entries, ChangeKind::Deleted));
        Ok(())
    }

    /// Newest entries by journal date. `None` means
    /// [`RECENT_ENTRIES_DEFAULT_LIMIT`].
    pub fn get_recent_entries(&self, limit: Option<u32>) -> EntryServiceResult<Vec<Entry>> {
        let query = EntryListQuery {
            kind: None,
            order: DateOrder::NewestFirst,
            limit: Some(limit.unwrap_or(RECENT_ENTRIES_DEFAULT_LIMIT)),
        };
        Ok(self.repo.list_entries(&query)?)
    }

    /// Service-level filtered query: entries must carry ALL requested tags;
    /// results are newest first.
    pub fn get_filtered_entries(&self, filter: &EntryFilter) -> EntryServiceResult<Vec<Entry>> {
        let query = EntryListQuery {
            kind: filter.effective_kind().map(str::to_string),
            ..EntryListQuery::default()
        };
        let entries = self.repo.list_entries(&query)?;
        Ok(apply_filter(
            entries,
            filter,
            TagMatch::All,
            SortOrder::DateNewest,
        ))
    }

    /// List/grid browsing: entries must carry ANY requested tag; results use
    /// the caller's sort order.
    pub fn browse_entries(
        &self,
        filter: &EntryFilter,
        order: SortOrder,
    ) -> EntryServiceResult<Vec<Entry>> {
        let entries = self.repo.list_entries(&EntryListQuery::default())?;
        Ok(apply_filter(entries, filter, TagMatch::Any, order))
    }
}

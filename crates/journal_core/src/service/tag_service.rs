//! Tag use-case service.
//!
//! # Responsibility
//! - Provide tag create/update/delete/read APIs.
//! - Keep tag names logically unique without a storage constraint.
//! - Clean deleted tag ids out of every entry that references them.
//!
//! # Invariants
//! - `create_tag` is idempotent per exact name.
//! - `delete_tag` removes the tag record only after every referencing entry
//!   was rewritten; the first failed rewrite aborts with the tag kept.
//! - Dedup and cascade are read-then-write without a cross-step lock; a
//!   second concurrent writer can race them.

use crate::live::{Change, ChangeFeed, ChangeKind, Collection};
use crate::model::entry::{Entry, EntryId, EntryPatch};
use crate::model::tag::{NewTag, Tag, TagCategory, TagId, TagPatch, TagValidationError};
use crate::repo::entry_repo::{EntryListQuery, EntryRepository};
use crate::repo::tag_repo::TagRepository;
use crate::repo::{RecordRef, RepoError};
use log::{debug, error, info, warn};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for tag use-cases.
#[derive(Debug)]
pub enum TagServiceError {
    Validation(TagValidationError),
    NotFound(TagId),
    /// Rename target is already used by another tag.
    DuplicateName(String),
    /// Cascade cleanup could not rewrite `entry_id`; the tag was kept.
    CascadeFailed {
        tag_id: TagId,
        entry_id: EntryId,
        source: RepoError,
    },
    Repo(RepoError),
}

impl Display for TagServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "tag not found: {id}"),
            Self::DuplicateName(name) => write!(f, "tag name already in use: `{name}`"),
            Self::CascadeFailed {
                tag_id,
                entry_id,
                source,
            } => write!(
                f,
                "failed to remove tag {tag_id} from entry {entry_id}: {source}"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TagServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::CascadeFailed { source, .. } => Some(source),
            Self::Repo(err) => Some(err),
            Self::NotFound(_) | Self::DuplicateName(_) => None,
        }
    }
}

impl From<TagValidationError> for TagServiceError {
    fn from(value: TagValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for TagServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(RecordRef::Tag(id)) => Self::NotFound(id),
            other => Self::Repo(other),
        }
    }
}

pub type TagServiceResult<T> = Result<T, TagServiceError>;

/// The closed category set, in display order. Not stored data.
pub fn tag_categories() -> [TagCategory; 3] {
    TagCategory::ALL
}

/// Tag service facade. Needs entry access for cascade cleanup and reverse
/// lookups.
pub struct TagService<T: TagRepository, E: EntryRepository> {
    tags: T,
    entries: E,
    feed: ChangeFeed,
}

impl<T: TagRepository, E: EntryRepository> TagService<T, E> {
    pub fn new(tags: T, entries: E) -> Self {
        Self::with_feed(tags, entries, ChangeFeed::new())
    }

    pub fn with_feed(tags: T, entries: E, feed: ChangeFeed) -> Self {
        Self {
            tags,
            entries,
            feed,
        }
    }

    pub fn feed(&self) -> &ChangeFeed {
        &self.feed
    }

    /// Returns the id of the tag named exactly `name`, creating it first when
    /// missing. `category` defaults to `Custom` and is ignored for an
    /// existing tag.
    pub fn create_tag(&self, name: &str, category: Option<TagCategory>) -> TagServiceResult<TagId> {
        let new_tag = NewTag::new(name, category.unwrap_or_default());
        new_tag.validate()?;

        if let Some(existing) = self.tags.find_tag_by_name(name)? {
            info!(
                "event=tag_create module=tag_service status=exists tag_id={}",
                existing.id
            );
            return Ok(existing.id);
        }

        let id = self.tags.insert_tag(&new_tag)?;
        info!(
            "event=tag_create module=tag_service status=ok tag_id={id} category={}",
            new_tag.category
        );
        self.feed
            .publish(Change::new(Collection::Tags, ChangeKind::Created));
        Ok(id)
    }

    pub fn get_tag(&self, id: TagId) -> TagServiceResult<Option<Tag>> {
        Ok(self.tags.get_tag(id)?)
    }

    pub fn get_all_tags(&self) -> TagServiceResult<Vec<Tag>> {
        Ok(self.tags.list_tags()?)
    }

    pub fn get_tags_by_category(&self, category: TagCategory) -> TagServiceResult<Vec<Tag>> {
        Ok(self.tags.list_tags_by_category(category)?)
    }

    /// Resolves ids to tags. An empty id list never touches the store.
    pub fn get_tags_by_ids(&self, ids: &[TagId]) -> TagServiceResult<Vec<Tag>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.tags.get_tags_by_ids(ids)?)
    }

    /// Every category with its tags; categories without tags map to an
    /// empty list.
    pub fn tags_grouped_by_category(&self) -> TagServiceResult<BTreeMap<TagCategory, Vec<Tag>>> {
        let mut grouped: BTreeMap<TagCategory, Vec<Tag>> = TagCategory::ALL
            .into_iter()
            .map(|category| (category, Vec::new()))
            .collect();
        for tag in self.tags.list_tags()? {
            grouped.entry(tag.category).or_default().push(tag);
        }
        Ok(grouped)
    }

    /// Entries whose tag list contains `id`, found by scanning.
    pub fn entries_using_tag(&self, id: TagId) -> TagServiceResult<Vec<Entry>> {
        let entries = self.entries.list_entries(&EntryListQuery::default())?;
        Ok(entries.into_iter().filter(|entry| entry.has_tag(id)).collect())
    }

    /// Partially updates a tag and returns the stored result. An empty patch
    /// writes nothing.
    pub fn update_tag(&self, id: TagId, patch: TagPatch) -> TagServiceResult<Tag> {
        patch.validate()?;
        if patch.is_empty() {
            return self.tags.get_tag(id)?.ok_or(TagServiceError::NotFound(id));
        }

        if let Some(name) = patch.name.as_deref() {
            if let Some(other) = self.tags.find_tag_by_name(name)? {
                if other.id != id {
                    warn!(
                        "event=tag_update module=tag_service status=rejected tag_id={id} conflicting_tag_id={}",
                        other.id
                    );
                    return Err(TagServiceError::DuplicateName(name.to_string()));
                }
            }
        }

        self.tags.update_tag(id, &patch)?;
        info!("event=tag_update module=tag_service status=ok tag_id={id}");
        self.feed
            .publish(Change::new(Collection::Tags, ChangeKind::Updated));
        self.tags.get_tag(id)?.ok_or(TagServiceError::NotFound(id))
    }

    /// Deletes a tag after stripping its id from every referencing entry.
    ///
    /// Returns the number of entries rewritten. Entry rewrites are
    /// independent updates and leave `date_modified` untouched. The first
    /// failed rewrite aborts with [`TagServiceError::CascadeFailed`] and the
    /// tag record stays in place.
    pub fn delete_tag(&self, id: TagId) -> TagServiceResult<usize> {
        if self.tags.get_tag(id)?.is_none() {
            return Err(TagServiceError::NotFound(id));
        }

        let referencing = self.entries_using_tag(id)?;
        let mut rewritten = 0usize;
        for entry in &referencing {
            let remaining: Vec<TagId> = entry
                .tag_ids
                .iter()
                .copied()
                .filter(|tag_id| *tag_id != id)
                .collect();
            if let Err(source) = self
                .entries
                .update_entry(entry.id, &EntryPatch::tag_ids(remaining))
            {
                error!(
                    "event=tag_delete module=tag_service status=error tag_id={id} entry_id={} rewritten={rewritten} error={source}",
                    entry.id
                );
                self.publish_cascade(rewritten);
                return Err(TagServiceError::CascadeFailed {
                    tag_id: id,
                    entry_id: entry.id,
                    source,
                });
            }
            debug!(
                "event=tag_delete_cascade module=tag_service status=ok tag_id={id} entry_id={}",
                entry.id
            );
            rewritten += 1;
        }
        self.publish_cascade(rewritten);

        self.tags.delete_tag(id)?;
        info!("event=tag_delete module=tag_service status=ok tag_id={id} rewritten={rewritten}");
        self.feed
            .publish(Change::new(Collection::Tags, ChangeKind::Deleted));
        Ok(rewritten)
    }

    fn publish_cascade(&self, rewritten: usize) {
        if rewritten > 0 {
            self.feed
                .publish(Change::new(Collection::Entries, ChangeKind::Updated));
        }
    }
}

//! Entry domain model.
//!
//! # Responsibility
//! - Define the journal entry record and its create/update inputs.
//! - Validate caller input before it reaches storage.
//!
//! # Invariants
//! - `title` is never blank once persisted.
//! - `kind` is a free-form label matched exactly; it is not a closed enum.
//! - `date_modified >= date_created` is NOT guaranteed: the journal date is
//!   caller-settable independently of the save instant.

use crate::model::tag::TagId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned entry identifier.
pub type EntryId = i64;

/// Entry type assigned when the caller does not pick one.
pub const DEFAULT_ENTRY_TYPE: &str = "Commentary";

/// Entry types offered to pickers. Other values are still accepted.
pub const ENTRY_TYPES: &[&str] = &[DEFAULT_ENTRY_TYPE];

/// Persisted journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: EntryId,
    pub title: String,
    /// Rich-text markup produced by the editor. Opaque to the core.
    pub body: String,
    /// Serialized as `type` to match external schema naming.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub tag_ids: Vec<TagId>,
    /// Journal date. Chosen by the author, not the physical save time.
    pub date_created: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
}

impl Entry {
    /// Returns whether this entry references `tag_id`.
    pub fn has_tag(&self, tag_id: TagId) -> bool {
        self.tag_ids.contains(&tag_id)
    }
}

/// Input for creating an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEntry {
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    #[serde(default)]
    pub tag_ids: Vec<TagId>,
    /// Caller-authoritative journal date. `None` means "now".
    #[serde(default)]
    pub date_created: Option<DateTime<Utc>>,
}

impl NewEntry {
    /// Creates an input with the default type, no tags and no journal date.
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            kind: default_kind(),
            tag_ids: Vec::new(),
            date_created: None,
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn with_tag_ids(mut self, tag_ids: Vec<TagId>) -> Self {
        self.tag_ids = tag_ids;
        self
    }

    pub fn with_date_created(mut self, date_created: DateTime<Utc>) -> Self {
        self.date_created = Some(date_created);
        self
    }

    /// Validates caller input.
    ///
    /// # Errors
    /// - `EntryValidationError::EmptyTitle` when the title is blank.
    pub fn validate(&self) -> Result<(), EntryValidationError> {
        validate_title(&self.title)
    }
}

/// Partial update for an entry. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub tag_ids: Option<Vec<TagId>>,
    #[serde(default)]
    pub date_created: Option<DateTime<Utc>>,
    /// Stamped by the entry service; callers normally leave this unset.
    #[serde(default)]
    pub date_modified: Option<DateTime<Utc>>,
}

impl EntryPatch {
    /// Patch that only replaces the tag list.
    pub fn tag_ids(tag_ids: Vec<TagId>) -> Self {
        Self {
            tag_ids: Some(tag_ids),
            ..Self::default()
        }
    }

    /// Returns whether the patch would change no column.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.body.is_none()
            && self.kind.is_none()
            && self.tag_ids.is_none()
            && self.date_created.is_none()
            && self.date_modified.is_none()
    }

    /// Validates supplied fields only.
    pub fn validate(&self) -> Result<(), EntryValidationError> {
        match self.title.as_deref() {
            Some(title) => validate_title(title),
            None => Ok(()),
        }
    }
}

/// Input rejected before it reaches storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryValidationError {
    EmptyTitle,
}

impl Display for EntryValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "entry title cannot be empty"),
        }
    }
}

impl Error for EntryValidationError {}

fn validate_title(title: &str) -> Result<(), EntryValidationError> {
    if title.trim().is_empty() {
        return Err(EntryValidationError::EmptyTitle);
    }
    Ok(())
}

fn default_kind() -> String {
    DEFAULT_ENTRY_TYPE.to_string()
}

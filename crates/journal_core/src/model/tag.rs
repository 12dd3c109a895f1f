//! Tag domain model.
//!
//! # Responsibility
//! - Define tags and the closed set of tag categories.
//!
//! # Invariants
//! - `name` is stored exactly as given (case-sensitive).
//! - Name uniqueness is a service-level rule, not a storage constraint.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Store-assigned tag identifier.
pub type TagId = i64;

/// Closed grouping for tags. Display-only; never used for matching.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum TagCategory {
    Team,
    Player,
    #[default]
    Custom,
}

impl TagCategory {
    /// All categories in display order.
    pub const ALL: [TagCategory; 3] = [Self::Team, Self::Player, Self::Custom];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Team => "Team",
            Self::Player => "Player",
            Self::Custom => "Custom",
        }
    }
}

impl Display for TagCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TagCategory {
    type Err = UnknownTagCategory;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Team" => Ok(Self::Team),
            "Player" => Ok(Self::Player),
            "Custom" => Ok(Self::Custom),
            other => Err(UnknownTagCategory(other.to_string())),
        }
    }
}

/// Parse failure for [`TagCategory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTagCategory(pub String);

impl Display for UnknownTagCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown tag category `{}`", self.0)
    }
}

impl Error for UnknownTagCategory {}

/// Persisted tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    pub category: TagCategory,
}

/// Input for inserting a tag record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTag {
    pub name: String,
    #[serde(default)]
    pub category: TagCategory,
}

impl NewTag {
    pub fn new(name: impl Into<String>, category: TagCategory) -> Self {
        Self {
            name: name.into(),
            category,
        }
    }

    pub fn validate(&self) -> Result<(), TagValidationError> {
        validate_name(&self.name)
    }
}

/// Partial update for a tag. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<TagCategory>,
}

impl TagPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.category.is_none()
    }

    pub fn validate(&self) -> Result<(), TagValidationError> {
        match self.name.as_deref() {
            Some(name) => validate_name(name),
            None => Ok(()),
        }
    }
}

/// Input rejected before it reaches storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValidationError {
    EmptyName,
}

impl Display for TagValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "tag name cannot be empty"),
        }
    }
}

impl Error for TagValidationError {}

fn validate_name(name: &str) -> Result<(), TagValidationError> {
    if name.trim().is_empty() {
        return Err(TagValidationError::EmptyName);
    }
    Ok(())
}

//! Query/filter engine over the entry collection.
//!
//! # Responsibility
//! - Compose type, date-range, tag and free-text predicates with one sort.
//! - Own the markup stripping shared by search and previews.
//!
//! # Invariants
//! - Filters AND together; an absent/empty parameter disables its filter.
//! - Sorting runs once, after every filter.
//! - Every consumer goes through [`apply_filter`]; there is no second copy of
//!   the predicate chain.

pub mod filter;
pub mod text;

pub use filter::{
    apply_filter, end_of_day, matches_all_tags, matches_any_tag, matches_date_range,
    matches_search, matches_type, sort_entries, DateRange, EntryFilter, SortOrder, TagMatch,
    UnknownSortOrder, ALL_TYPES,
};
pub use text::{body_preview, collapse_whitespace, plain_text, strip_markup, PREVIEW_MAX_CHARS};

//! Entry predicates, filter composition and sort orders.
//!
//! # Invariants
//! - Type matching is exact and case-sensitive; `"All Types"` disables it.
//! - The date range applies only when both ends are set; its end is widened
//!   to 23:59:59.999 of its UTC calendar day.
//! - Tag matching comes in two named flavors, [`TagMatch::Any`] for list/grid
//!   browsing and [`TagMatch::All`] for the service-level filtered query.
//! - Search is a case-insensitive substring match on the title or on the
//!   markup-stripped body. Whitespace runs count as one space on both sides.

use crate::model::entry::Entry;
use crate::model::tag::TagId;
use crate::query::text::{collapse_whitespace, plain_text};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Sentinel type value meaning "no type filter".
pub const ALL_TYPES: &str = "All Types";

/// Inclusive journal-date window.
///
/// A picker mid-selection sends one end as `null`; the window stays inactive
/// until both ends are set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    /// Any instant on the last included day.
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Returns whether both ends are set.
    pub fn is_active(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    /// Returns whether `instant` lies in `[start, end_of_day(end)]`. A
    /// half-set or empty window accepts everything.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        match (self.start, self.end) {
            (Some(start), Some(end)) => instant >= start && instant <= end_of_day(end),
            _ => true,
        }
    }
}

/// Last representable millisecond of the UTC calendar day of `instant`.
pub fn end_of_day(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant
        .date_naive()
        .and_hms_milli_opt(23, 59, 59, 999)
        .map_or(instant, |naive| naive.and_utc())
}

/// How the filter's tag set is compared with an entry's tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TagMatch {
    /// Entry carries at least one of the requested tags.
    Any,
    /// Entry carries every requested tag.
    All,
}

/// Filter parameters supplied by the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryFilter {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub date_range: Option<DateRange>,
    #[serde(default)]
    pub tag_ids: Vec<TagId>,
    #[serde(default)]
    pub search_text: Option<String>,
}

impl EntryFilter {
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    pub fn with_tag_ids(mut self, tag_ids: Vec<TagId>) -> Self {
        self.tag_ids = tag_ids;
        self
    }

    pub fn with_search_text(mut self, search_text: impl Into<String>) -> Self {
        self.search_text = Some(search_text.into());
        self
    }

    /// Returns the effective type filter, `None` when unset or `"All Types"`.
    pub fn effective_kind(&self) -> Option<&str> {
        self.kind.as_deref().filter(|kind| *kind != ALL_TYPES)
    }

    /// Returns whether `entry` passes every active filter.
    pub fn matches(&self, entry: &Entry, tag_match: TagMatch) -> bool {
        let tags_ok = match tag_match {
            TagMatch::Any => matches_any_tag(entry, &self.tag_ids),
            TagMatch::All => matches_all_tags(entry, &self.tag_ids),
        };

        matches_type(entry, self.kind.as_deref())
            && matches_date_range(entry, self.date_range.as_ref())
            && tags_ok
            && matches_search(entry, self.search_text.as_deref())
    }
}

/// Exact type match; `None` and `"All Types"` accept everything.
pub fn matches_type(entry: &Entry, kind: Option<&str>) -> bool {
    match kind {
        None | Some(ALL_TYPES) => true,
        Some(kind) => entry.kind == kind,
    }
}

/// Inclusive journal-date match; absent or half-set ranges accept everything.
pub fn matches_date_range(entry: &Entry, range: Option<&DateRange>) -> bool {
    range
        .filter(|range| range.is_active())
        .map_or(true, |range| range.contains(entry.date_created))
}

/// ANY-match: an empty request accepts everything.
pub fn matches_any_tag(entry: &Entry, tag_ids: &[TagId]) -> bool {
    tag_ids.is_empty() || tag_ids.iter().any(|tag_id| entry.has_tag(*tag_id))
}

/// ALL-match: an empty request accepts everything.
pub fn matches_all_tags(entry: &Entry, tag_ids: &[TagId]) -> bool {
    tag_ids.iter().all(|tag_id| entry.has_tag(*tag_id))
}

/// Case-insensitive substring match on title or markup-stripped body.
///
/// Blank search text accepts everything.
pub fn matches_search(entry: &Entry, search_text: Option<&str>) -> bool {
    let Some(needle) = normalize_search_text(search_text) else {
        return true;
    };
    contains_needle(entry, &needle)
}

// Folded like `plain_text` so "kevin  durant" or "game\n7" still hit.
fn normalize_search_text(search_text: Option<&str>) -> Option<String> {
    search_text
        .map(collapse_whitespace)
        .filter(|text| !text.is_empty())
        .map(|text| text.to_lowercase())
}

fn contains_needle(entry: &Entry, needle: &str) -> bool {
    entry.title.to_lowercase().contains(needle)
        || plain_text(&entry.body).to_lowercase().contains(needle)
}

/// Result ordering offered to list views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    #[serde(rename = "Date Newest")]
    DateNewest,
    #[serde(rename = "Date Oldest")]
    DateOldest,
    #[serde(rename = "Title A-Z")]
    TitleAsc,
    #[serde(rename = "Title Z-A")]
    TitleDesc,
}

impl SortOrder {
    pub const ALL: [SortOrder; 4] = [
        Self::DateNewest,
        Self::DateOldest,
        Self::TitleAsc,
        Self::TitleDesc,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::DateNewest => "Date Newest",
            Self::DateOldest => "Date Oldest",
            Self::TitleAsc => "Title A-Z",
            Self::TitleDesc => "Title Z-A",
        }
    }

    fn compare(self, a: &Entry, b: &Entry) -> Ordering {
        match self {
            Self::DateNewest => by_date(b, a),
            Self::DateOldest => by_date(a, b),
            Self::TitleAsc => by_title(a, b),
            Self::TitleDesc => by_title(b, a),
        }
    }
}

impl Display for SortOrder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SortOrder {
    type Err = UnknownSortOrder;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|order| order.label() == value)
            .ok_or_else(|| UnknownSortOrder(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSortOrder(pub String);

impl Display for UnknownSortOrder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown sort order `{}`", self.0)
    }
}

impl Error for UnknownSortOrder {}

fn by_date(a: &Entry, b: &Entry) -> Ordering {
    a.date_created
        .cmp(&b.date_created)
        .then_with(|| a.id.cmp(&b.id))
}

// Case-folded first so "celtics" and "Celtics" sort together.
fn by_title(a: &Entry, b: &Entry) -> Ordering {
    a.title
        .to_lowercase()
        .cmp(&b.title.to_lowercase())
        .then_with(|| a.title.cmp(&b.title))
        .then_with(|| a.id.cmp(&b.id))
}

/// Sorts in place. Ties fall back to id so output is deterministic.
pub fn sort_entries(entries: &mut [Entry], order: SortOrder) {
    entries.sort_by(|a, b| order.compare(a, b));
}

/// Runs the full predicate chain, then sorts the survivors.
pub fn apply_filter(
    entries: Vec<Entry>,
    filter: &EntryFilter,
    tag_match: TagMatch,
    order: SortOrder,
) -> Vec<Entry> {
    let mut matched: Vec<Entry> = entries
        .into_iter()
        .filter(|entry| filter.matches(entry, tag_match))
        .collect();

    sort_entries(&mut matched, order);
    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn entry(id: i64, title: &str, body: &str, tag_ids: Vec<TagId>, created: DateTime<Utc>) -> Entry {
        Entry {
            id,
            title: title.to_string(),
            body: body.to_string(),
            kind: "Commentary".to_string(),
            tag_ids,
            date_created: created,
            date_modified: created,
        }
    }

    fn ids(entries: &[Entry]) -> Vec<i64> {
        entries.iter().map(|entry| entry.id).collect()
    }

    fn sample() -> Vec<Entry> {
        vec![
            entry(1, "Lakers recap", "<p>LeBron</p>", vec![1, 2], at(2025, 4, 10, 9, 0)),
            entry(2, "bucks notes", "<p>Giannis</p>", vec![4], at(2025, 4, 12, 18, 30)),
            entry(3, "Celtics defense", "<p>Tatum <b>Durant</b></p>", vec![2], at(2025, 4, 11, 7, 15)),
        ]
    }

    #[test]
    fn empty_filter_returns_everything_newest_first() {
        let result = apply_filter(sample(), &EntryFilter::default(), TagMatch::All, SortOrder::default());
        assert_eq!(ids(&result), vec![2, 3, 1]);
    }

    #[test]
    fn all_types_sentinel_disables_type_filter() {
        let filter = EntryFilter::default().with_kind(ALL_TYPES);
        let result = apply_filter(sample(), &filter, TagMatch::Any, SortOrder::DateNewest);
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn type_filter_is_case_sensitive() {
        let mut entries = sample();
        entries[0].kind = "Recap".to_string();
        let exact = apply_filter(entries.clone(), &EntryFilter::default().with_kind("Recap"), TagMatch::Any, SortOrder::DateNewest);
        assert_eq!(ids(&exact), vec![1]);
        let lower = apply_filter(entries, &EntryFilter::default().with_kind("recap"), TagMatch::Any, SortOrder::DateNewest);
        assert!(lower.is_empty());
    }

    #[test]
    fn date_range_end_covers_whole_calendar_day() {
        let range = DateRange::new(at(2025, 4, 1, 0, 0), at(2025, 4, 11, 0, 0));
        assert!(range.contains(at(2025, 4, 11, 23, 59)));
        assert!(!range.contains(at(2025, 4, 12, 0, 1)));
        assert!(!range.contains(at(2025, 3, 31, 23, 59)));
    }

    #[test]
    fn end_of_day_is_last_millisecond() {
        let end = end_of_day(at(2025, 1, 1, 8, 0));
        assert_eq!(end.to_rfc3339(), "2025-01-01T23:59:59.999+00:00");
    }

    #[test]
    fn any_and_all_tag_matching_differ() {
        let filter = EntryFilter::default().with_tag_ids(vec![1, 2]);
        let any = apply_filter(sample(), &filter, TagMatch::Any, SortOrder::DateOldest);
        assert_eq!(ids(&any), vec![1, 3]);
        let all = apply_filter(sample(), &filter, TagMatch::All, SortOrder::DateOldest);
        assert_eq!(ids(&all), vec![1]);
    }

    #[test]
    fn search_matches_stripped_body_case_insensitively() {
        let filter = EntryFilter::default().with_search_text("durant");
        let result = apply_filter(sample(), &filter, TagMatch::Any, SortOrder::DateNewest);
        assert_eq!(ids(&result), vec![3]);
    }

    #[test]
    fn search_does_not_match_markup_itself() {
        let filter = EntryFilter::default().with_search_text("<b>");
        let result = apply_filter(sample(), &filter, TagMatch::Any, SortOrder::DateNewest);
        assert!(result.is_empty());
    }

    #[test]
    fn blank_search_is_a_no_op() {
        let filter = EntryFilter::default().with_search_text("   ");
        let result = apply_filter(sample(), &filter, TagMatch::Any, SortOrder::DateNewest);
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn title_sorts_ignore_case() {
        let asc = apply_filter(sample(), &EntryFilter::default(), TagMatch::Any, SortOrder::TitleAsc);
        assert_eq!(ids(&asc), vec![2, 3, 1]);
        let desc = apply_filter(sample(), &EntryFilter::default(), TagMatch::Any, SortOrder::TitleDesc);
        assert_eq!(ids(&desc), vec![1, 3, 2]);
    }

    #[test]
    fn filters_compose_with_and() {
        let filter = EntryFilter::default()
            .with_tag_ids(vec![2])
            .with_search_text("lebron");
        let result = apply_filter(sample(), &filter, TagMatch::Any, SortOrder::DateNewest);
        assert_eq!(ids(&result), vec![1]);
    }

    #[test]
    fn matches_agrees_with_apply_filter() {
        let filter = EntryFilter::default().with_tag_ids(vec![2]).with_search_text("TATUM");
        let entries = sample();
        let direct: Vec<i64> = entries
            .iter()
            .filter(|entry| filter.matches(entry, TagMatch::Any))
            .map(|entry| entry.id)
            .collect();
        assert_eq!(direct, vec![3]);
        let chained = apply_filter(entries, &filter, TagMatch::Any, SortOrder::DateNewest);
        assert_eq!(ids(&chained), direct);
    }

    #[test]
    fn sort_order_parses_ui_labels() {
        for order in SortOrder::ALL {
            assert_eq!(order.label().parse::<SortOrder>(), Ok(order));
        }
        assert!("Newest".parse::<SortOrder>().is_err());
    }

    #[test]
    fn filter_deserializes_from_ui_shape() {
        let filter: EntryFilter = serde_json::from_str(
            r#"{"type":"Commentary","dateRange":{"start":"2025-04-01T00:00:00Z","end":"2025-04-30T00:00:00Z"},"tagIds":[1],"searchText":"lakers"}"#,
        )
        .unwrap();
        assert_eq!(filter.kind.as_deref(), Some("Commentary"));
        assert_eq!(filter.tag_ids, vec![1]);
        assert!(filter.date_range.is_some());
    }

    #[test]
    fn half_set_date_range_deserializes_and_accepts_everything() {
        let half: EntryFilter = serde_json::from_str(
            r#"{"dateRange":{"start":"2025-04-11T00:00:00Z","end":null}}"#,
        )
        .unwrap();
        let range = half.date_range.unwrap();
        assert_eq!(range.start, Some(at(2025, 4, 11, 0, 0)));
        assert!(!range.is_active());
        let result = apply_filter(sample(), &half, TagMatch::Any, SortOrder::DateNewest);
        assert_eq!(result.len(), 3);

        let empty: EntryFilter =
            serde_json::from_str(r#"{"dateRange":{"start":null,"end":null}}"#).unwrap();
        assert_eq!(empty.date_range, Some(DateRange::default()));
        let result = apply_filter(sample(), &empty, TagMatch::Any, SortOrder::DateNewest);
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn search_text_whitespace_runs_match_body_spacing() {
        let entries = vec![
            entry(1, "Milestone", "<p>Kevin  Durant scored</p>", vec![], at(2025, 4, 18, 10, 32)),
            entry(2, "Series", "<p>Game\n7 recap</p>", vec![], at(2025, 4, 19, 10, 0)),
        ];
        assert!(matches_search(&entries[0], Some("kevin  durant")));
        assert!(matches_search(&entries[1], Some("game\n7")));

        let filter = EntryFilter::default().with_search_text("game\t 7");
        let result = apply_filter(entries, &filter, TagMatch::Any, SortOrder::DateNewest);
        assert_eq!(ids(&result), vec![2]);
    }
}

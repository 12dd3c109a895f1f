//! Application-level selection state shared by list views.
//!
//! Owned by the caller and passed by reference; nothing here is global.

use crate::model::tag::TagId;
use crate::query::EntryFilter;

/// Currently selected tags and search text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    selected_tag_ids: Vec<TagId>,
    search_text: String,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_tag_ids(&self) -> &[TagId] {
        &self.selected_tag_ids
    }

    pub fn is_selected(&self, tag_id: TagId) -> bool {
        self.selected_tag_ids.contains(&tag_id)
    }

    /// Selects `tag_id` if it was not selected, deselects it otherwise.
    /// Returns whether the tag is selected afterwards.
    pub fn toggle_tag(&mut self, tag_id: TagId) -> bool {
        if self.is_selected(tag_id) {
            self.selected_tag_ids.retain(|id| *id != tag_id);
            false
        } else {
            self.selected_tag_ids.push(tag_id);
            true
        }
    }

    pub fn clear_selected_tags(&mut self) {
        self.selected_tag_ids.clear();
    }

    /// Drops a deleted tag from the selection.
    pub fn forget_tag(&mut self, tag_id: TagId) {
        self.selected_tag_ids.retain(|id| *id != tag_id);
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
    }

    pub fn clear_search(&mut self) {
        self.search_text.clear();
    }

    /// Filter carrying the selected tags and search text; type and date
    /// range stay unset.
    pub fn to_filter(&self) -> EntryFilter {
        EntryFilter {
            tag_ids: self.selected_tag_ids.clone(),
            search_text: Some(self.search_text.clone()).filter(|text| !text.is_empty()),
            ..EntryFilter::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SelectionState;

    #[test]
    fn toggle_selects_then_deselects() {
        let mut state = SelectionState::new();
        assert!(state.toggle_tag(3));
        assert!(state.toggle_tag(5));
        assert_eq!(state.selected_tag_ids(), &[3, 5]);
        assert!(!state.toggle_tag(3));
        assert_eq!(state.selected_tag_ids(), &[5]);
    }

    #[test]
    fn forget_tag_removes_deleted_selection() {
        let mut state = SelectionState::new();
        state.toggle_tag(1);
        state.toggle_tag(2);
        state.forget_tag(1);
        assert_eq!(state.selected_tag_ids(), &[2]);
    }

    #[test]
    fn filter_reflects_selection_and_search() {
        let mut state = SelectionState::new();
        assert_eq!(state.to_filter().search_text, None);

        state.toggle_tag(9);
        state.set_search_text("durant");
        let filter = state.to_filter();
        assert_eq!(filter.tag_ids, vec![9]);
        assert_eq!(filter.search_text.as_deref(), Some("durant"));

        state.clear_search();
        state.clear_selected_tags();
        assert_eq!(state.to_filter(), Default::default());
    }
}

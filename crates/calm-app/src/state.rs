//! Observable application state snapshots.

use std::collections::BTreeSet;

use calm_core::{Note, NoteId, NotePreview};

/// Progress of an asynchronous load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadState<T> {
    Idle,
    Loading,
    Loaded(T),
    Error(String),
}

impl<T> Default for LoadState<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> LoadState<T> {
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub const fn value(&self) -> Option<&T> {
        match self {
            Self::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Everything the list and editor views render from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppState {
    /// Note list, newest first
    pub notes: LoadState<Vec<NotePreview>>,
    /// Note open in the editor
    pub current_note: LoadState<Note>,
    /// Set when the open note was saved but `notes` was not reloaded.
    ///
    /// Autosave skips list reloads so the editor keeps focus; the list is
    /// refreshed when the editor closes.
    pub list_stale: bool,
    /// Notes picked for bulk deletion
    pub selected_notes: BTreeSet<NoteId>,
    /// Active search text, empty when showing every note
    pub search_query: String,
    /// Last operation failure, for transient alerts
    pub last_error: Option<String>,
}

impl AppState {
    pub fn is_selection_mode(&self) -> bool {
        !self.selected_notes.is_empty()
    }

    pub const fn is_loading(&self) -> bool {
        self.notes.is_loading() || self.current_note.is_loading()
    }

    /// Previews currently on screen (empty unless loaded).
    pub fn note_previews(&self) -> &[NotePreview] {
        self.notes
            .value()
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn open_note(&self) -> Option<&Note> {
        self.current_note.value()
    }

    pub fn is_open(&self, id: &NoteId) -> bool {
        self.open_note().is_some_and(|note| &note.id == id)
    }

    /// Add or remove a note from the selection.
    pub fn toggle_selection(&mut self, id: &NoteId) {
        if !self.selected_notes.remove(id) {
            self.selected_notes.insert(id.clone());
        }
    }

    /// Start selection mode with exactly one note (long press).
    pub fn select_only(&mut self, id: &NoteId) {
        self.selected_notes.clear();
        self.selected_notes.insert(id.clone());
    }

    pub fn clear_selection(&mut self) {
        self.selected_notes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> NoteId {
        raw.parse().unwrap()
    }

    #[test]
    fn selection_mode_follows_selection() {
        let mut state = AppState::default();
        assert!(!state.is_selection_mode());

        state.select_only(&id("a"));
        state.toggle_selection(&id("b"));
        assert_eq!(
            state.selected_notes,
            BTreeSet::from([id("a"), id("b")])
        );
        assert!(state.is_selection_mode());

        state.toggle_selection(&id("a"));
        state.toggle_selection(&id("b"));
        assert!(state.selected_notes.is_empty());
        assert!(!state.is_selection_mode());
    }

    #[test]
    fn select_only_replaces_selection() {
        let mut state = AppState::default();
        state.toggle_selection(&id("a"));
        state.toggle_selection(&id("b"));

        state.select_only(&id("c"));
        assert_eq!(state.selected_notes, BTreeSet::from([id("c")]));

        state.clear_selection();
        assert!(!state.is_selection_mode());
    }

    #[test]
    fn load_state_accessors() {
        let loaded: LoadState<u8> = LoadState::Loaded(3);
        assert_eq!(loaded.value(), Some(&3));
        assert!(!loaded.is_loading());

        let failed: LoadState<u8> = LoadState::Error("boom".into());
        assert_eq!(failed.error(), Some("boom"));
        assert_eq!(failed.value(), None);

        assert_eq!(LoadState::<u8>::default(), LoadState::Idle);
    }

    #[test]
    fn note_previews_empty_until_loaded() {
        let mut state = AppState::default();
        assert!(state.note_previews().is_empty());

        state.notes = LoadState::Loading;
        assert!(state.is_loading());
        assert!(state.note_previews().is_empty());
    }
}

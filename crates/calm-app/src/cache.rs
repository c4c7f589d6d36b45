//! Observable note cache sitting between the views and the note store.
//!
//! Every mutation goes through [`NotesCache`] and is republished as a fresh
//! [`AppState`] snapshot on a `watch` channel. Views either poll
//! [`NotesCache::snapshot`] or await changes on a [`NotesCache::subscribe`]
//! receiver.

use std::sync::Arc;
use std::time::Duration;

use calm_core::{Note, NoteId, NotePreview, NoteStore, StoreConfig};
use tokio::sync::{watch, Mutex};
use tokio::time::Instant;

use crate::autosave::Autosaver;
use crate::error::{AppError, AppResult};
use crate::state::{AppState, LoadState};

/// Notes removed by the last bulk delete, kept in full so they can be
/// re-inserted.
struct DeletedBatch {
    notes: Vec<Note>,
    deleted_at: Instant,
}

/// Shared handle to the application state. Clones share the same state.
#[derive(Clone)]
pub struct NotesCache {
    store: NoteStore,
    state: Arc<watch::Sender<AppState>>,
    undo: Arc<Mutex<Option<DeletedBatch>>>,
    undo_window: Duration,
    autosave_debounce: Duration,
}

impl NotesCache {
    pub fn new(store: NoteStore, config: &StoreConfig) -> Self {
        let (state, _) = watch::channel(AppState::default());
        Self {
            store,
            state: Arc::new(state),
            undo: Arc::new(Mutex::new(None)),
            undo_window: config.undo_window(),
            autosave_debounce: config.autosave_debounce(),
        }
    }

    /// Cache over the store the config points at.
    pub fn from_config(config: &StoreConfig) -> AppResult<Self> {
        Ok(Self::new(NoteStore::from_config(config)?, config))
    }

    pub const fn store(&self) -> &NoteStore {
        &self.store
    }

    /// Current state.
    pub fn snapshot(&self) -> AppState {
        self.state.borrow().clone()
    }

    /// Receiver that is notified after every state change.
    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.state.subscribe()
    }

    pub fn is_selection_mode(&self) -> bool {
        self.state.borrow().is_selection_mode()
    }

    /// Debounced writer for the note being edited.
    pub fn autosaver(&self, note_id: NoteId) -> Autosaver {
        Autosaver::new(self.clone(), note_id, self.autosave_debounce)
    }

    fn update(&self, modify: impl FnOnce(&mut AppState)) {
        self.state.send_modify(modify);
    }

    fn notes_state(&self) -> LoadState<Vec<NotePreview>> {
        self.state.borrow().notes.clone()
    }

    /// Put the list back the way it was and report the failure.
    fn fail_list_write(&self, previous: LoadState<Vec<NotePreview>>, error: &calm_core::Error) {
        tracing::error!("Note operation failed: {}", error);
        let message = error.to_string();
        self.update(|state| {
            state.notes = previous;
            state.last_error = Some(message);
        });
    }

    fn report_error(&self, error: &calm_core::Error) {
        let message = error.to_string();
        self.update(|state| state.last_error = Some(message));
    }

    /// Reload every preview. Callable from any state, including `Error`.
    pub async fn load_notes(&self) -> AppResult<()> {
        self.update(|state| state.notes = LoadState::Loading);
        self.refresh_list().await
    }

    async fn refresh_list(&self) -> AppResult<()> {
        match self.store.get_all_notes().await {
            Ok(notes) => {
                tracing::debug!("Loaded {} note previews", notes.len());
                self.update(|state| {
                    state.notes = LoadState::Loaded(notes);
                    state.search_query.clear();
                    state.list_stale = false;
                });
                Ok(())
            }
            Err(error) => {
                tracing::error!("Failed to load notes: {}", error);
                let message = error.to_string();
                self.update(|state| state.notes = LoadState::Error(message));
                Err(error.into())
            }
        }
    }

    /// Reload after a write that already succeeded. A failed reload stays
    /// visible in `notes`.
    async fn reload_after_write(&self) {
        if self.refresh_list().await.is_err() {
            tracing::debug!("List reload after write left the list in an error state");
        }
    }

    /// Create an empty note, make it the open note, and return its id.
    pub async fn create_note(&self) -> AppResult<NoteId> {
        let previous = self.notes_state();
        self.update(|state| state.notes = LoadState::Loading);

        let note = match self.store.create_note(None).await {
            Ok(note) => note,
            Err(error) => {
                self.fail_list_write(previous, &error);
                return Err(error.into());
            }
        };

        let id = note.id.clone();
        self.update(|state| state.current_note = LoadState::Loaded(note));
        self.reload_after_write().await;
        Ok(id)
    }

    /// Open a note for editing.
    pub async fn load_note(&self, id: &NoteId) -> AppResult<Note> {
        self.update(|state| state.current_note = LoadState::Loading);

        match self.store.get_note(id).await {
            Ok(Some(note)) => {
                let loaded = note.clone();
                self.update(|state| state.current_note = LoadState::Loaded(loaded));
                Ok(note)
            }
            Ok(None) => {
                let error = AppError::NoteNotFound(id.clone());
                let message = error.to_string();
                self.update(|state| state.current_note = LoadState::Error(message));
                Err(error)
            }
            Err(error) => {
                tracing::error!("Failed to load note {}: {}", id, error);
                let message = error.to_string();
                self.update(|state| state.current_note = LoadState::Error(message));
                Err(error.into())
            }
        }
    }

    /// Save new content for a note without reloading the list.
    ///
    /// The open note is patched in place and `list_stale` is raised; the list
    /// catches up in [`NotesCache::close_note`]. Returns `false` when the
    /// note no longer exists.
    pub async fn update_note(&self, id: &NoteId, content: &str) -> AppResult<bool> {
        let updated_at = match self.store.update_note_timestamp(id, content).await {
            Ok(updated_at) => updated_at,
            Err(error) => {
                tracing::error!("Failed to save note {}: {}", id, error);
                self.report_error(&error);
                return Err(error.into());
            }
        };

        let Some(updated_at) = updated_at else {
            tracing::warn!("Note {} vanished while being edited", id);
            return Ok(false);
        };

        self.update(|state| {
            if let LoadState::Loaded(note) = &mut state.current_note {
                if &note.id == id {
                    content.clone_into(&mut note.content);
                    note.updated_at = updated_at;
                }
            }
            state.list_stale = true;
        });
        Ok(true)
    }

    /// Filter the list by raw content. Never enters `Loading`.
    pub async fn search_notes(&self, query: &str) -> AppResult<()> {
        if query.trim().is_empty() {
            return self.load_notes().await;
        }

        match self.store.search_notes(query).await {
            Ok(notes) => {
                let query = query.to_string();
                self.update(|state| {
                    state.notes = LoadState::Loaded(notes);
                    state.search_query = query;
                    state.list_stale = false;
                });
                Ok(())
            }
            Err(error) => {
                tracing::error!("Search failed: {}", error);
                self.report_error(&error);
                Err(error.into())
            }
        }
    }

    /// Delete one note. Returns whether it existed.
    pub async fn delete_note(&self, id: &NoteId) -> AppResult<bool> {
        let previous = self.notes_state();
        self.update(|state| state.notes = LoadState::Loading);

        let existed = match self.store.delete_note(id).await {
            Ok(existed) => existed,
            Err(error) => {
                self.fail_list_write(previous, &error);
                return Err(error.into());
            }
        };

        self.update(|state| {
            if state.is_open(id) {
                state.current_note = LoadState::Idle;
            }
            state.selected_notes.remove(id);
        });
        self.reload_after_write().await;
        Ok(existed)
    }

    pub fn toggle_note_selection(&self, id: &NoteId) {
        self.update(|state| state.toggle_selection(id));
    }

    /// Enter selection mode with only `id` selected.
    pub fn select_note(&self, id: &NoteId) {
        self.update(|state| state.select_only(id));
    }

    pub fn clear_selection(&self) {
        self.update(AppState::clear_selection);
    }

    /// Delete every selected note in one transaction.
    ///
    /// The copies kept for undo are read inside that transaction, so an
    /// autosave racing the delete cannot leave them older than the rows
    /// that were removed.
    ///
    /// The deleted notes are kept for [`NotesCache::undo_delete`] until the
    /// undo window closes or the next bulk delete replaces them. Returns the
    /// number of notes deleted.
    pub async fn delete_selected_notes(&self) -> AppResult<usize> {
        let ids: Vec<NoteId> = self.state.borrow().selected_notes.iter().cloned().collect();
        if ids.is_empty() {
            return Ok(0);
        }

        let previous = self.notes_state();
        self.update(|state| state.notes = LoadState::Loading);

        let notes = match self.store.take_notes(&ids).await {
            Ok(notes) => notes,
            Err(error) => {
                self.fail_list_write(previous, &error);
                return Err(error.into());
            }
        };
        let deleted = notes.len();

        *self.undo.lock().await = Some(DeletedBatch {
            notes,
            deleted_at: Instant::now(),
        });
        tracing::info!("Deleted {} selected notes", deleted);

        self.update(|state| {
            if state
                .open_note()
                .is_some_and(|note| ids.contains(&note.id))
            {
                state.current_note = LoadState::Idle;
            }
            state.clear_selection();
        });
        self.reload_after_write().await;
        Ok(deleted)
    }

    /// Re-insert notes from the last bulk delete, keeping their original ids
    /// and timestamps.
    ///
    /// Ids that were not part of that delete are ignored. Notes of the batch
    /// that were not requested stay undoable until the window closes.
    pub async fn undo_delete(&self, ids: &[NoteId]) -> AppResult<usize> {
        let mut undo = self.undo.lock().await;
        let Some(batch) = undo.take() else {
            return Err(AppError::NothingToUndo);
        };
        if batch.deleted_at.elapsed() > self.undo_window {
            tracing::debug!("Discarding expired undo batch of {} notes", batch.notes.len());
            return Err(AppError::UndoExpired);
        }

        let deleted_at = batch.deleted_at;
        let (restore, keep): (Vec<Note>, Vec<Note>) = batch
            .notes
            .into_iter()
            .partition(|note| ids.contains(&note.id));
        if restore.is_empty() {
            *undo = Some(DeletedBatch {
                notes: keep,
                deleted_at,
            });
            return Ok(0);
        }

        let restored = match self.store.restore_notes(&restore).await {
            Ok(restored) => restored,
            Err(error) => {
                tracing::error!("Failed to restore deleted notes: {}", error);
                let mut notes = restore;
                notes.extend(keep);
                *undo = Some(DeletedBatch { notes, deleted_at });
                drop(undo);
                self.report_error(&error);
                return Err(error.into());
            }
        };

        if !keep.is_empty() {
            *undo = Some(DeletedBatch {
                notes: keep,
                deleted_at,
            });
        }
        drop(undo);

        tracing::info!("Restored {} deleted notes", restored);
        self.reload_after_write().await;
        Ok(restored)
    }

    /// Whether the last bulk delete can still be undone.
    pub async fn has_pending_undo(&self) -> bool {
        self.undo
            .lock()
            .await
            .as_ref()
            .is_some_and(|batch| batch.deleted_at.elapsed() <= self.undo_window)
    }

    /// Forget the last bulk delete (the undo prompt was dismissed).
    pub async fn discard_undo(&self) {
        self.undo.lock().await.take();
    }

    /// Leave the editor. Refreshes the list if saves made it stale.
    pub async fn close_note(&self) -> AppResult<()> {
        let mut stale = false;
        let mut query = String::new();
        self.update(|state| {
            state.current_note = LoadState::Idle;
            stale = state.list_stale;
            query.clone_from(&state.search_query);
        });

        if !stale {
            return Ok(());
        }
        if query.is_empty() {
            self.refresh_list().await
        } else {
            self.search_notes(&query).await
        }
    }

    pub fn clear_error(&self) {
        self.update(|state| state.last_error = None);
    }
}

//! Shared note store service used by application state.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard, OnceCell};

use crate::config::StoreConfig;
use crate::db::{
    Database, LibSqlNoteRepository, LibSqlSettingsRepository, NoteRepository, SettingsRepository,
};
use crate::models::{Note, NoteId, NotePreview, Settings};
use crate::Result;

/// Thread-safe, lazily opened store for notes and settings.
///
/// The database is opened by the first operation (or an explicit
/// [`NoteStore::init`]). A failed open is not remembered, so the next call
/// tries again.
#[derive(Clone)]
pub struct NoteStore {
    db: Arc<OnceCell<Mutex<Database>>>,
    db_path: Option<PathBuf>,
}

impl NoteStore {
    /// Store backed by a database file at `db_path`.
    pub fn open_path(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db: Arc::new(OnceCell::new()),
            db_path: Some(db_path.into()),
        }
    }

    /// Store at the configured (or platform default) location.
    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        Ok(Self::open_path(config.resolved_database_path()?))
    }

    /// In-memory store (primarily for tests).
    pub fn in_memory() -> Self {
        Self {
            db: Arc::new(OnceCell::new()),
            db_path: None,
        }
    }

    /// Open the database and run migrations. Later calls are no-ops.
    pub async fn init(&self) -> Result<()> {
        self.database().await.map(|_| ())
    }

    async fn database(&self) -> Result<MutexGuard<'_, Database>> {
        let db = self.db.get_or_try_init(|| self.open_database()).await?;
        Ok(db.lock().await)
    }

    async fn open_database(&self) -> Result<Mutex<Database>> {
        let db = match &self.db_path {
            Some(db_path) => {
                if let Some(parent) = db_path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                Database::open(db_path).await?
            }
            None => {
                tracing::debug!("Opening in-memory notes database");
                Database::open_in_memory().await?
            }
        };
        Ok(Mutex::new(db))
    }

    /// Create a note. Empty or missing content becomes an empty document.
    pub async fn create_note(&self, content: Option<&str>) -> Result<Note> {
        let db = self.database().await?;
        let repo = LibSqlNoteRepository::new(db.connection());
        repo.create(content.unwrap_or_default()).await
    }

    /// Replace a note's content. Returns `false` when the note no longer exists.
    pub async fn update_note(&self, id: &NoteId, content: &str) -> Result<bool> {
        Ok(self.update_note_timestamp(id, content).await?.is_some())
    }

    /// Replace a note's content, returning its new `updated_at`.
    pub async fn update_note_timestamp(&self, id: &NoteId, content: &str) -> Result<Option<i64>> {
        let db = self.database().await?;
        let repo = LibSqlNoteRepository::new(db.connection());
        let updated_at = repo.update(id, content).await?;
        if updated_at.is_none() {
            tracing::debug!("Skipped update for missing note {}", id);
        }
        Ok(updated_at)
    }

    /// Fetch a note by id.
    pub async fn get_note(&self, id: &NoteId) -> Result<Option<Note>> {
        let db = self.database().await?;
        let repo = LibSqlNoteRepository::new(db.connection());
        repo.get(id).await
    }

    /// Fetch full notes for a batch of ids, skipping missing ones.
    pub async fn get_notes(&self, ids: &[NoteId]) -> Result<Vec<Note>> {
        let db = self.database().await?;
        let repo = LibSqlNoteRepository::new(db.connection());
        repo.get_many(ids).await
    }

    /// Previews of every note, most recently updated first.
    pub async fn get_all_notes(&self) -> Result<Vec<NotePreview>> {
        let db = self.database().await?;
        let repo = LibSqlNoteRepository::new(db.connection());
        Ok(repo.list().await?.into_iter().map(NotePreview::from).collect())
    }

    /// Hard delete a note. Returns whether it existed.
    pub async fn delete_note(&self, id: &NoteId) -> Result<bool> {
        let db = self.database().await?;
        let repo = LibSqlNoteRepository::new(db.connection());
        repo.delete(id).await
    }

    /// Hard delete a batch of notes atomically.
    pub async fn delete_notes(&self, ids: &[NoteId]) -> Result<usize> {
        let db = self.database().await?;
        let repo = LibSqlNoteRepository::new(db.connection());
        let deleted = repo.delete_many(ids).await?;
        tracing::debug!("Deleted {} of {} requested notes", deleted, ids.len());
        Ok(deleted)
    }

    /// Delete a batch of notes atomically and return them as they were.
    ///
    /// Reading and deleting happen under one lock and one transaction, so a
    /// concurrent update either lands before the read or finds the note gone.
    pub async fn take_notes(&self, ids: &[NoteId]) -> Result<Vec<Note>> {
        let db = self.database().await?;
        let repo = LibSqlNoteRepository::new(db.connection());
        let notes = repo.take_many(ids).await?;
        tracing::debug!("Took {} of {} requested notes", notes.len(), ids.len());
        Ok(notes)
    }

    /// Re-insert deleted notes with their original ids and timestamps.
    pub async fn restore_notes(&self, notes: &[Note]) -> Result<usize> {
        let db = self.database().await?;
        let repo = LibSqlNoteRepository::new(db.connection());
        repo.restore(notes).await
    }

    /// Case-sensitive substring search over raw content. Blank queries list everything.
    pub async fn search_notes(&self, query: &str) -> Result<Vec<NotePreview>> {
        let db = self.database().await?;
        let repo = LibSqlNoteRepository::new(db.connection());
        Ok(repo
            .search(query)
            .await?
            .into_iter()
            .map(NotePreview::from)
            .collect())
    }

    /// Load settings.
    pub async fn load_settings(&self) -> Result<Settings> {
        let db = self.database().await?;
        let repo = LibSqlSettingsRepository::new(db.connection());
        repo.load().await
    }

    /// Save settings.
    pub async fn save_settings(&self, settings: &Settings) -> Result<()> {
        let db = self.database().await?;
        let repo = LibSqlSettingsRepository::new(db.connection());
        repo.save(settings).await
    }
}

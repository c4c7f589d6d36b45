//! Debounced persistence for the note open in the editor.

use std::sync::{Arc, MutexGuard, PoisonError};
use std::time::Duration;

use calm_core::NoteId;

use crate::cache::NotesCache;
use crate::error::AppResult;

/// The single pending write. `version` increases on every edit so a timer
/// can tell whether its edit has been superseded.
#[derive(Default)]
struct Slot {
    content: Option<String>,
    version: u64,
}

struct Inner {
    cache: NotesCache,
    note_id: NoteId,
    debounce: Duration,
    slot: std::sync::Mutex<Slot>,
    write_lock: tokio::sync::Mutex<()>,
}

/// Collapses bursts of edits into one write after a quiet period.
///
/// Each [`Autosaver::schedule`] replaces the pending content and restarts the
/// quiet period; only the latest content is ever written. Call
/// [`Autosaver::close`] (or at least [`Autosaver::flush`]) when the editor
/// goes away so a pending edit is not lost.
#[derive(Clone)]
pub struct Autosaver {
    inner: Arc<Inner>,
}

impl Autosaver {
    pub fn new(cache: NotesCache, note_id: NoteId, debounce: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                cache,
                note_id,
                debounce,
                slot: std::sync::Mutex::new(Slot::default()),
                write_lock: tokio::sync::Mutex::new(()),
            }),
        }
    }

    pub fn note_id(&self) -> &NoteId {
        &self.inner.note_id
    }

    /// Whether an edit is waiting to be written.
    pub fn has_pending(&self) -> bool {
        self.inner.slot().content.is_some()
    }

    /// Queue `content` to be written once edits stop for the debounce period.
    pub fn schedule(&self, content: impl Into<String>) {
        let version = {
            let mut slot = self.inner.slot();
            slot.version += 1;
            slot.content = Some(content.into());
            slot.version
        };

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(inner.debounce).await;
            if let Err(error) = inner.save_if_current(version).await {
                tracing::error!("Autosave failed for note {}: {}", inner.note_id, error);
            }
        });
    }

    /// Write any pending edit now. Waits for a write already in flight.
    ///
    /// Returns whether anything was written. On failure the edit stays
    /// pending unless a newer one arrived meanwhile.
    pub async fn flush(&self) -> AppResult<bool> {
        let _write = self.inner.write_lock.lock().await;
        let Some(content) = self.inner.slot().content.take() else {
            return Ok(false);
        };
        self.inner.write(content).await?;
        Ok(true)
    }

    /// Flush, then close the note in the cache.
    pub async fn close(self) -> AppResult<()> {
        self.flush().await?;
        self.inner.cache.close_note().await
    }
}

impl Inner {
    fn slot(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn save_if_current(&self, version: u64) -> AppResult<()> {
        let _write = self.write_lock.lock().await;
        let content = {
            let mut slot = self.slot();
            if slot.version != version {
                return Ok(());
            }
            slot.content.take()
        };
        match content {
            Some(content) => self.write(content).await,
            None => Ok(()),
        }
    }

    async fn write(&self, content: String) -> AppResult<()> {
        match self.cache.update_note(&self.note_id, &content).await {
            Ok(_) => {
                tracing::debug!("Autosaved note {}", self.note_id);
                Ok(())
            }
            Err(error) => {
                let mut slot = self.slot();
                if slot.content.is_none() {
                    slot.content = Some(content);
                }
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::LoadState;
    use calm_core::{NoteStore, StoreConfig};
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;
    use tokio::time::sleep;

    fn doc(text: &str) -> String {
        serde_json::json!({
            "type": "doc",
            "content": [{"type": "paragraph", "content": [{"type": "text", "text": text}]}]
        })
        .to_string()
    }

    async fn open_note(cache: &NotesCache, text: &str) -> NoteId {
        let note = cache.store().create_note(Some(&doc(text))).await.unwrap();
        cache.load_notes().await.unwrap();
        cache.load_note(&note.id).await.unwrap();
        note.id
    }

    async fn stored_content(cache: &NotesCache, id: &NoteId) -> String {
        cache.store().get_note(id).await.unwrap().unwrap().content
    }

    fn cache() -> NotesCache {
        NotesCache::new(NoteStore::in_memory(), &StoreConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn later_edit_supersedes_pending_one() {
        let cache = cache();
        let id = open_note(&cache, "v0").await;
        let saver = cache.autosaver(id.clone());

        saver.schedule(doc("v1"));
        sleep(Duration::from_millis(300)).await;
        saver.schedule(doc("v2"));
        sleep(Duration::from_millis(600)).await;

        // The first timer fired at 750ms but its edit had been replaced.
        assert_eq!(stored_content(&cache, &id).await, doc("v0"));
        assert!(saver.has_pending());

        sleep(Duration::from_millis(500)).await;
        assert_eq!(stored_content(&cache, &id).await, doc("v2"));
        assert!(!saver.has_pending());
        assert!(cache.snapshot().list_stale);
    }

    #[tokio::test(start_paused = true)]
    async fn close_flushes_pending_edit() {
        let cache = cache();
        let id = open_note(&cache, "v0").await;
        let saver = cache.autosaver(id.clone());

        saver.schedule(doc("typed just before leaving"));
        saver.close().await.unwrap();

        assert_eq!(
            stored_content(&cache, &id).await,
            doc("typed just before leaving")
        );
        let state = cache.snapshot();
        assert_eq!(state.current_note, LoadState::Idle);
        assert_eq!(
            state.note_previews()[0].preview,
            "typed just before leaving"
        );

        // The timer still fires later but finds nothing to write.
        sleep(Duration::from_secs(1)).await;
        assert_eq!(
            stored_content(&cache, &id).await,
            doc("typed just before leaving")
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn flush_without_edits_writes_nothing() {
        let cache = cache();
        let id = open_note(&cache, "v0").await;
        let saver = cache.autosaver(id);

        assert!(!saver.flush().await.unwrap());
        assert!(!cache.snapshot().list_stale);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn flush_to_deleted_note_is_harmless() {
        let cache = cache();
        let id = open_note(&cache, "v0").await;
        let saver = cache.autosaver(id.clone());
        cache.delete_note(&id).await.unwrap();

        saver.schedule(doc("orphaned"));
        assert!(saver.flush().await.unwrap());
        assert!(cache.store().get_note(&id).await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn failed_flush_keeps_edit_pending() {
        let tmp = tempdir().unwrap();
        let cache = NotesCache::new(NoteStore::open_path(tmp.path()), &StoreConfig::default());
        let saver = cache.autosaver(NoteId::new());

        saver.schedule(doc("unsaved"));
        assert!(saver.flush().await.is_err());
        assert!(saver.has_pending());
        assert!(cache.snapshot().last_error.is_some());
    }
}

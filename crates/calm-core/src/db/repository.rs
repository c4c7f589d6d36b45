//! Note repository implementation

use crate::error::Result;
use crate::models::{Note, NoteId};
use crate::util::unix_timestamp_millis;
use libsql::{params, Connection};

const NOTE_COLUMNS: &str = "id, content_json, created_at, updated_at";

/// Trait for note storage operations (async)
#[allow(async_fn_in_trait)]
pub trait NoteRepository {
    /// Create a new note
    async fn create(&self, content: &str) -> Result<Note>;

    /// Get a note by ID
    async fn get(&self, id: &NoteId) -> Result<Option<Note>>;

    /// Get the notes for the given IDs, skipping missing ones
    async fn get_many(&self, ids: &[NoteId]) -> Result<Vec<Note>>;

    /// List all notes, most recently updated first
    async fn list(&self) -> Result<Vec<Note>>;

    /// Replace a note's content.
    ///
    /// Returns the new `updated_at`, or `None` when no such note exists.
    async fn update(&self, id: &NoteId, content: &str) -> Result<Option<i64>>;

    /// Hard delete a note. Returns whether a row was removed.
    async fn delete(&self, id: &NoteId) -> Result<bool>;

    /// Hard delete several notes in one transaction
    async fn delete_many(&self, ids: &[NoteId]) -> Result<usize>;

    /// Delete several notes in one transaction, returning the rows exactly
    /// as they were when deleted. Missing IDs are skipped.
    async fn take_many(&self, ids: &[NoteId]) -> Result<Vec<Note>>;

    /// Re-insert previously deleted notes verbatim in one transaction.
    ///
    /// Notes whose ID is already present are left untouched.
    async fn restore(&self, notes: &[Note]) -> Result<usize>;

    /// Case-sensitive substring search over the raw content
    async fn search(&self, query: &str) -> Result<Vec<Note>>;
}

/// libSQL implementation of `NoteRepository`
pub struct LibSqlNoteRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlNoteRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Parse a note from a database row
    fn parse_note(row: &libsql::Row) -> Result<Note> {
        let id: String = row.get(0)?;
        Ok(Note {
            id: id.parse()?,
            content: row.get(1)?,
            created_at: row.get(2)?,
            updated_at: row.get(3)?,
        })
    }

    async fn collect_notes(mut rows: libsql::Rows) -> Result<Vec<Note>> {
        let mut notes = Vec::new();
        while let Some(row) = rows.next().await? {
            notes.push(Self::parse_note(&row)?);
        }
        Ok(notes)
    }

    async fn insert(&self, note: &Note) -> Result<u64> {
        let rows = self
            .conn
            .execute(
                "INSERT OR IGNORE INTO notes (id, content_json, created_at, updated_at) VALUES (?, ?, ?, ?)",
                params![
                    note.id.as_str(),
                    note.content.as_str(),
                    note.created_at,
                    note.updated_at
                ],
            )
            .await?;
        Ok(rows)
    }

    /// Commit on success, roll back on failure.
    async fn finish<T>(&self, outcome: Result<T>) -> Result<T> {
        match outcome {
            Ok(value) => {
                if let Err(e) = self.conn.execute("COMMIT", ()).await {
                    self.conn.execute("ROLLBACK", ()).await.ok();
                    return Err(e.into());
                }
                Ok(value)
            }
            Err(e) => {
                self.conn.execute("ROLLBACK", ()).await.ok();
                Err(e)
            }
        }
    }

    async fn delete_each(&self, ids: &[NoteId]) -> Result<usize> {
        let mut deleted = 0;
        for id in ids {
            if self.delete(id).await? {
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    async fn take_each(&self, ids: &[NoteId]) -> Result<Vec<Note>> {
        let notes = self.get_many(ids).await?;
        for note in &notes {
            self.delete(&note.id).await?;
        }
        Ok(notes)
    }

    async fn insert_each(&self, notes: &[Note]) -> Result<usize> {
        let mut inserted = 0;
        for note in notes {
            if self.insert(note).await? > 0 {
                inserted += 1;
            }
        }
        Ok(inserted)
    }
}

impl NoteRepository for LibSqlNoteRepository<'_> {
    async fn create(&self, content: &str) -> Result<Note> {
        let note = Note::new(content);
        self.insert(&note).await?;
        tracing::debug!("Created note {}", note.id);
        Ok(note)
    }

    async fn get(&self, id: &NoteId) -> Result<Option<Note>> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = ?"),
                [id.as_str()],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::parse_note(&row)?)),
            None => Ok(None),
        }
    }

    async fn get_many(&self, ids: &[NoteId]) -> Result<Vec<Note>> {
        let mut notes = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(note) = self.get(id).await? {
                notes.push(note);
            }
        }
        Ok(notes)
    }

    async fn list(&self) -> Result<Vec<Note>> {
        let rows = self
            .conn
            .query(
                &format!(
                    "SELECT {NOTE_COLUMNS} FROM notes ORDER BY updated_at DESC, created_at DESC"
                ),
                (),
            )
            .await?;

        Self::collect_notes(rows).await
    }

    async fn update(&self, id: &NoteId, content: &str) -> Result<Option<i64>> {
        let now = unix_timestamp_millis();

        // Two writes in the same millisecond must still move updated_at forward.
        let rows = self
            .conn
            .execute(
                "UPDATE notes SET content_json = ?, updated_at = MAX(?, updated_at + 1) WHERE id = ?",
                params![content, now, id.as_str()],
            )
            .await?;

        if rows == 0 {
            return Ok(None);
        }

        Ok(self.get(id).await?.map(|note| note.updated_at))
    }

    async fn delete(&self, id: &NoteId) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM notes WHERE id = ?", [id.as_str()])
            .await?;
        Ok(rows > 0)
    }

    async fn delete_many(&self, ids: &[NoteId]) -> Result<usize> {
        self.conn.execute("BEGIN TRANSACTION", ()).await?;
        let outcome = self.delete_each(ids).await;
        self.finish(outcome).await
    }

    async fn take_many(&self, ids: &[NoteId]) -> Result<Vec<Note>> {
        self.conn.execute("BEGIN TRANSACTION", ()).await?;
        let outcome = self.take_each(ids).await;
        self.finish(outcome).await
    }

    async fn restore(&self, notes: &[Note]) -> Result<usize> {
        self.conn.execute("BEGIN TRANSACTION", ()).await?;
        let outcome = self.insert_each(notes).await;
        self.finish(outcome).await
    }

    async fn search(&self, query: &str) -> Result<Vec<Note>> {
        if query.trim().is_empty() {
            return self.list().await;
        }

        // instr() instead of LIKE: LIKE folds ASCII case and treats % and _ as wildcards.
        let rows = self
            .conn
            .query(
                &format!(
                    "SELECT {NOTE_COLUMNS} FROM notes
                     WHERE instr(content_json, ?) > 0
                     ORDER BY updated_at DESC, created_at DESC"
                ),
                [query],
            )
            .await?;

        Self::collect_notes(rows).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::EMPTY_DOCUMENT;
    use std::time::Duration;
    use tokio::time::sleep;

    async fn setup() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    fn doc(text: &str) -> String {
        serde_json::json!({
            "type": "doc",
            "content": [{"type": "paragraph", "content": [{"type": "text", "text": text}]}]
        })
        .to_string()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_create_and_get() {
        let db = setup().await;
        let repo = LibSqlNoteRepository::new(db.connection());

        let content = doc("Hello world");
        let note = repo.create(&content).await.unwrap();
        assert_eq!(note.content, content);

        let fetched = repo.get(&note.id).await.unwrap().unwrap();
        assert_eq!(fetched, note);
        assert_eq!(fetched.created_at, fetched.updated_at);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_create_empty_uses_empty_document() {
        let db = setup().await;
        let repo = LibSqlNoteRepository::new(db.connection());

        let note = repo.create("").await.unwrap();
        let fetched = repo.get(&note.id).await.unwrap().unwrap();
        assert_eq!(fetched.content, EMPTY_DOCUMENT);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_list_most_recently_updated_first() {
        let db = setup().await;
        let repo = LibSqlNoteRepository::new(db.connection());

        let first = repo.create(&doc("first")).await.unwrap();
        let second = repo.create(&doc("second")).await.unwrap();
        sleep(Duration::from_millis(2)).await;
        repo.update(&first.id, &doc("first, edited")).await.unwrap();

        let notes = repo.list().await.unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].id, first.id);
        assert_eq!(notes[1].id, second.id);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_update_strictly_increases_updated_at() {
        let db = setup().await;
        let repo = LibSqlNoteRepository::new(db.connection());

        let note = repo.create(&doc("Original")).await.unwrap();
        let first = repo.update(&note.id, &doc("Updated")).await.unwrap().unwrap();
        let second = repo.update(&note.id, &doc("Again")).await.unwrap().unwrap();

        assert!(first > note.updated_at);
        assert!(second > first);

        let fetched = repo.get(&note.id).await.unwrap().unwrap();
        assert_eq!(fetched.content, doc("Again"));
        assert_eq!(fetched.created_at, note.created_at);
        assert_eq!(fetched.updated_at, second);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_update_missing_is_noop() {
        let db = setup().await;
        let repo = LibSqlNoteRepository::new(db.connection());

        let result = repo.update(&NoteId::new(), &doc("ghost")).await.unwrap();
        assert_eq!(result, None);
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_delete() {
        let db = setup().await;
        let repo = LibSqlNoteRepository::new(db.connection());

        let note = repo.create(&doc("To delete")).await.unwrap();
        assert!(repo.delete(&note.id).await.unwrap());
        assert!(!repo.delete(&note.id).await.unwrap());

        assert!(repo.get(&note.id).await.unwrap().is_none());
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_delete_many_and_restore() {
        let db = setup().await;
        let repo = LibSqlNoteRepository::new(db.connection());

        let a = repo.create(&doc("A")).await.unwrap();
        let b = repo.create(&doc("B")).await.unwrap();
        let c = repo.create(&doc("C")).await.unwrap();

        let doomed = repo.get_many(&[a.id.clone(), c.id.clone()]).await.unwrap();
        let deleted = repo
            .delete_many(&[a.id.clone(), c.id.clone(), NoteId::new()])
            .await
            .unwrap();
        assert_eq!(deleted, 2);

        let remaining = repo.list().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, b.id);

        assert_eq!(repo.restore(&doomed).await.unwrap(), 2);
        assert_eq!(repo.get(&a.id).await.unwrap().unwrap(), a);
        assert_eq!(repo.get(&c.id).await.unwrap().unwrap(), c);

        // Restoring again does not duplicate or overwrite
        assert_eq!(repo.restore(&doomed).await.unwrap(), 0);
        assert_eq!(repo.list().await.unwrap().len(), 3);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_take_many_returns_latest_rows() {
        let db = setup().await;
        let repo = LibSqlNoteRepository::new(db.connection());

        let a = repo.create(&doc("A")).await.unwrap();
        let b = repo.create(&doc("B")).await.unwrap();
        repo.update(&a.id, &doc("A, edited")).await.unwrap();

        let taken = repo
            .take_many(&[a.id.clone(), NoteId::new()])
            .await
            .unwrap();
        assert_eq!(taken.len(), 1);
        assert_eq!(taken[0].id, a.id);
        assert_eq!(taken[0].content, doc("A, edited"));
        assert!(repo.get(&a.id).await.unwrap().is_none());
        assert_eq!(repo.list().await.unwrap()[0].id, b.id);

        assert_eq!(repo.restore(&taken).await.unwrap(), 1);
        assert_eq!(repo.get(&a.id).await.unwrap().unwrap(), taken[0]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_search_is_case_sensitive_substring() {
        let db = setup().await;
        let repo = LibSqlNoteRepository::new(db.connection());

        let hello = repo.create(&doc("Hello world")).await.unwrap();
        repo.create(&doc("Goodbye World")).await.unwrap();
        repo.create(&doc("100% done_ish")).await.unwrap();

        let results = repo.search("world").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, hello.id);

        // Wildcard characters are matched literally
        assert_eq!(repo.search("0%").await.unwrap().len(), 1);
        assert_eq!(repo.search("e_i").await.unwrap().len(), 1);
        assert!(repo.search("zzz").await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_search_matches_raw_json() {
        let db = setup().await;
        let repo = LibSqlNoteRepository::new(db.connection());

        repo.create(&doc("plain")).await.unwrap();
        assert_eq!(repo.search("paragraph").await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_blank_search_lists_everything() {
        let db = setup().await;
        let repo = LibSqlNoteRepository::new(db.connection());

        repo.create(&doc("one")).await.unwrap();
        repo.create(&doc("two")).await.unwrap();

        assert_eq!(repo.search("   ").await.unwrap().len(), 2);
    }
}

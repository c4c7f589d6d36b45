//! Note model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::Error;
use crate::preview::extract_preview;
use crate::util::unix_timestamp_millis;

/// Canonical content of a note created without any content.
pub const EMPTY_DOCUMENT: &str = r#"{"type":"doc","content":[{"type":"paragraph","content":[]}]}"#;

/// An opaque, unique identifier for a note.
///
/// Fresh ids are random UUID v4 strings. Ids read back from storage are kept
/// verbatim, so rows written by older clients with other id shapes still
/// round-trip.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    /// Create a new unique note ID
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for NoteId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for NoteId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidInput("Note ID cannot be empty".into()));
        }
        Ok(Self(s.to_string()))
    }
}

impl From<NoteId> for String {
    fn from(id: NoteId) -> Self {
        id.0
    }
}

/// A note in the system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Unique identifier
    pub id: NoteId,
    /// Serialized rich document (JSON)
    pub content: String,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
    /// Last update timestamp (Unix ms)
    pub updated_at: i64,
}

impl Note {
    /// Create a new note with the given content.
    ///
    /// Empty content is replaced by [`EMPTY_DOCUMENT`]; anything else,
    /// whitespace included, is stored as given.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        let content = content.into();
        let content = if content.is_empty() {
            EMPTY_DOCUMENT.to_string()
        } else {
            content
        };
        let now = unix_timestamp_millis();
        Self {
            id: NoteId::new(),
            content,
            created_at: now,
            updated_at: now,
        }
    }

    /// Human readable preview of the content
    #[must_use]
    pub fn preview(&self) -> String {
        extract_preview(&self.content)
    }
}

/// List-view projection of a note. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotePreview {
    pub id: NoteId,
    /// Plain text summary, at most 100 characters
    pub preview: String,
    pub updated_at: i64,
    pub created_at: i64,
}

impl From<&Note> for NotePreview {
    fn from(note: &Note) -> Self {
        Self {
            id: note.id.clone(),
            preview: note.preview(),
            updated_at: note.updated_at,
            created_at: note.created_at,
        }
    }
}

impl From<Note> for NotePreview {
    fn from(note: Note) -> Self {
        Self {
            preview: note.preview(),
            id: note.id,
            updated_at: note.updated_at,
            created_at: note.created_at,
        }
    }
}

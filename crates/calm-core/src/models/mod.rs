//! Data models for Calm Notes

mod note;
mod settings;

pub use note::{Note, NoteId, NotePreview, EMPTY_DOCUMENT};
pub use settings::{clamp_font_size, ColorScheme, Settings, MAX_FONT_SIZE, MIN_FONT_SIZE};

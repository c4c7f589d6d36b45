//! calm-app - Headless application state for Calm Notes
//!
//! Views drive everything through [`NotesCache`] (note list, open note,
//! selection, undo) and [`SettingsController`] (theme and font size). The
//! editor hands its changes to an [`Autosaver`], which debounces writes and
//! flushes them when the editor closes.

pub mod autosave;
pub mod cache;
pub mod error;
pub mod settings;
pub mod state;

pub use autosave::Autosaver;
pub use cache::NotesCache;
pub use error::{AppError, AppResult};
pub use settings::SettingsController;
pub use state::{AppState, LoadState};

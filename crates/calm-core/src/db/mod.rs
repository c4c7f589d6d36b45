//! Database layer for Calm Notes

mod connection;
mod migrations;
mod repository;
mod settings_repository;

pub use connection::Database;
pub use repository::{LibSqlNoteRepository, NoteRepository};
pub use settings_repository::{LibSqlSettingsRepository, SettingsRepository};

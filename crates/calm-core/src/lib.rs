//! calm-core - Core library for Calm Notes
//!
//! This crate contains the note models, the libSQL persistence layer, preview
//! extraction for stored rich documents, and settings persistence used by the
//! application state in `calm-app`.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod preview;
pub mod services;
pub mod util;

pub use config::StoreConfig;
pub use error::{Error, Result};
pub use models::{Note, NoteId, NotePreview, Settings};
pub use preview::{extract_preview, UNTITLED_NOTE};
pub use services::NoteStore;

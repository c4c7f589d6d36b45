//! Service layer shared by client applications.

mod note_store;

pub use note_store::NoteStore;

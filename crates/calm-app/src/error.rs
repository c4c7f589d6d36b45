use calm_core::NoteId;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] calm_core::Error),
    #[error("Note not found")]
    NoteNotFound(NoteId),
    #[error("Nothing to undo")]
    NothingToUndo,
    #[error("Undo window has expired")]
    UndoExpired,
}

//! Error types for the Plotnotes core library.

use thiserror::Error;

/// All errors that can occur within the Plotnotes core library.
///
/// Undo/redo on an exhausted direction, obsolete commands and dropped
/// records are not errors; those paths degrade silently and are logged.
#[derive(Debug, Error)]
pub enum PlotnotesError {
    /// A SQLite operation failed.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A note ID was requested that does not exist in the document.
    #[error("Note not found: {0}")]
    NoteNotFound(String),

    /// A note collection ID was requested that does not exist in the document.
    #[error("Note collection not found: {0}")]
    CollectionNotFound(String),

    /// A story element ID was requested that does not exist in the document.
    #[error("Owner not found: {0}")]
    OwnerNotFound(String),

    /// A history stack ID is not registered with the history group.
    #[error("History stack not found: {0}")]
    StackNotFound(String),

    /// A property was addressed on an entity that does not have it.
    #[error("Unknown property: {0}")]
    UnknownProperty(String),

    /// A stored document ID does not exist in the document store.
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// A serialized record could not be turned into a note.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// A color string could not be parsed.
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// The opened file is not a valid Plotnotes document store.
    #[error("Invalid document store: {0}")]
    InvalidDocument(String),

    /// An I/O operation on the filesystem failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored document data could not be (de)serialized from JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias that pins the error type to [`PlotnotesError`].
pub type Result<T> = std::result::Result<T, PlotnotesError>;

impl PlotnotesError {
    /// Returns a short, human-readable message suitable for display to the end user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Database(e) => format!("Failed to save: {e}"),
            Self::NoteNotFound(_) => "Note no longer exists".to_string(),
            Self::CollectionNotFound(_) => "Notes no longer exist".to_string(),
            Self::OwnerNotFound(_) => "Story element no longer exists".to_string(),
            Self::StackNotFound(_) => "Edit history is unavailable".to_string(),
            Self::UnknownProperty(name) => format!("Cannot edit {name}"),
            Self::DocumentNotFound(_) => "Document no longer exists".to_string(),
            Self::InvalidRecord(msg) => format!("Data format error: {msg}"),
            Self::InvalidColor(value) => format!("Not a color: {value}"),
            Self::InvalidDocument(_) => "Could not open document file".to_string(),
            Self::Io(e) => format!("File error: {e}"),
            Self::Json(e) => format!("Data format error: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_not_found_message() {
        let e = PlotnotesError::NoteNotFound("abc".to_string());
        assert_eq!(e.to_string(), "Note not found: abc");
        assert_eq!(e.user_message(), "Note no longer exists");
    }

    #[test]
    fn test_json_error_converts() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let e: PlotnotesError = err.into();
        assert!(e.user_message().starts_with("Data format error"));
    }
}

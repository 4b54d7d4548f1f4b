//! Core library for Plotnotes, a story planner built from scenes, characters
//! and other story elements, each carrying a collection of notes.
//!
//! The primary entry point is [`Document`], which owns the entity graph and
//! its undo/redo history. All undoable mutations go through `Document`
//! methods; [`Storage`] persists documents in a SQLite file.
//!
//! Types are re-exported from their respective sub-modules for convenience;
//! consumers should import from the crate root rather than the `core` module.

pub mod core;

// Re-export commonly used types.
#[doc(inline)]
pub use core::{
    color::Color,
    command::ChangeCommand,
    document::{Document, DocumentRecord, OwnerRecord, DOCUMENT_FORMAT_VERSION},
    error::{PlotnotesError, Result},
    graph::{NoteGraph, Notification},
    history::{HistoryStack, StepOutcome, DEFAULT_UNDO_LIMIT},
    history_group::HistoryGroup,
    id::{CollectionId, NoteId, OwnerId, StackId},
    note::{Note, NoteType},
    notes::NoteCollection,
    owner::{Owner, OwnerKind},
    property::{EntityRef, Property, PropertyValue},
    property_command::{PropertyChangeCommand, PropertyLocks},
    removal::{RemovalMarker, RemovalScope},
    serializer::{
        apply_record, collection_to_record, legacy_note, legacy_notes, note_from_record,
        note_to_record, notes_from_records, unique_records, Record, DATA_KEY,
    },
    settings::{load_settings, save_settings, settings_file_path, HistorySettings},
    storage::{Storage, StoredDocument, STORE_FORMAT_VERSION},
    structural_command::{StructuralChange, StructuralChangeCommand},
};

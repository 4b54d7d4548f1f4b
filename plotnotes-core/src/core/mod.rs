//! Internal domain modules for the Plotnotes core library.
//!
//! All public types from these modules are re-exported at the crate root
//! with `#[doc(inline)]`; import from there in preference to this module.

pub mod color;
pub mod command;
pub mod document;
pub mod error;
pub mod graph;
pub mod history;
pub mod history_group;
pub mod id;
pub mod note;
pub mod notes;
pub mod owner;
pub mod property;
pub mod property_command;
pub mod removal;
pub mod serializer;
pub mod settings;
pub mod storage;
pub mod structural_command;

#[doc(inline)]
pub use color::Color;
#[doc(inline)]
pub use command::ChangeCommand;
#[doc(inline)]
pub use document::{Document, DocumentRecord, OwnerRecord, DOCUMENT_FORMAT_VERSION};
#[doc(inline)]
pub use error::{PlotnotesError, Result};
#[doc(inline)]
pub use graph::{NoteGraph, Notification};
#[doc(inline)]
pub use history::{HistoryStack, StepOutcome, DEFAULT_UNDO_LIMIT};
#[doc(inline)]
pub use history_group::HistoryGroup;
#[doc(inline)]
pub use id::{CollectionId, NoteId, OwnerId, StackId};
#[doc(inline)]
pub use note::{Note, NoteType};
#[doc(inline)]
pub use notes::NoteCollection;
#[doc(inline)]
pub use owner::{Owner, OwnerKind};
#[doc(inline)]
pub use property::{EntityRef, Property, PropertyValue};
#[doc(inline)]
pub use property_command::{PropertyChangeCommand, PropertyLocks};
#[doc(inline)]
pub use removal::{RemovalMarker, RemovalScope};
#[doc(inline)]
pub use settings::{load_settings, save_settings, settings_file_path, HistorySettings};
#[doc(inline)]
pub use storage::{Storage, StoredDocument, STORE_FORMAT_VERSION};
#[doc(inline)]
pub use structural_command::{StructuralChange, StructuralChangeCommand};

//! Story elements that own a note collection.
//!
//! An [`Owner`] stands in for the structure, scene, character and other
//! story elements of a screenplay document. Only the parts the notes engine
//! depends on are modelled: an explicit [`OwnerKind`] tag, a color, and the
//! collection of notes the element owns.
//!
//! ## Owner kinds
//!
//! The kind is supplied by whoever creates the element and is copied into the
//! owned [`NoteCollection`](crate::NoteCollection) once, at construction. It
//! never changes afterwards.
//!
//! - [`OwnerKind::Scene`] and [`OwnerKind::Character`] keep their color in
//!   two-way sync with their notes collection.
//! - Every other kind leaves the collection color purely local.
//!
//! ## Serialization
//!
//! `OwnerKind` serializes as a PascalCase string (`"Scene"`, `"Character"`).
//!
//! ```rust
//! use plotnotes_core::OwnerKind;
//!
//! let json = serde_json::to_string(&OwnerKind::Scene).unwrap();
//! assert_eq!(json, r#""Scene""#);
//! assert!(OwnerKind::Scene.syncs_color());
//! assert!(!OwnerKind::Structure.syncs_color());
//! ```

use crate::{CollectionId, Color, OwnerId};
use serde::{Deserialize, Serialize};

/// The kind of story element owning a note collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum OwnerKind {
    /// The story structure canvas.
    Structure,

    /// A scene.
    Scene,

    /// An act, episode or other screenplay break.
    Break,

    /// A character.
    Character,

    /// A relationship between two characters.
    Relationship,

    /// A location.
    Location,

    /// A prop.
    Prop,

    /// No owner, or an owner of no particular kind.
    #[default]
    Other,
}

impl OwnerKind {
    /// Whether a collection owned by this kind mirrors the owner's color.
    #[must_use]
    pub fn syncs_color(&self) -> bool {
        matches!(self, Self::Scene | Self::Character)
    }
}

/// A story element with a color and a notes collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Owner {
    pub(crate) id: OwnerId,
    pub(crate) kind: OwnerKind,
    pub(crate) color: Color,
    pub(crate) notes: CollectionId,
}

impl Owner {
    pub fn id(&self) -> OwnerId {
        self.id
    }

    pub fn kind(&self) -> OwnerKind {
        self.kind
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// The collection holding this element's notes.
    pub fn notes(&self) -> CollectionId {
        self.notes
    }
}

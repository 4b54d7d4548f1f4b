//! Stable identities for document entities and history stacks.
//!
//! Ids wrap a v4 UUID and are never reused, so "is this id still in the
//! arena" is a complete liveness check for anything holding one.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Allocates a fresh, never-before-seen id.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Returns the underlying UUID.
            #[must_use]
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

entity_id!(
    /// Identity of a [`Note`](super::note::Note).
    NoteId
);
entity_id!(
    /// Identity of a [`NoteCollection`](super::notes::NoteCollection).
    CollectionId
);
entity_id!(
    /// Identity of a story element ([`Owner`](super::owner::Owner)).
    OwnerId
);
entity_id!(
    /// Identity of a [`HistoryStack`](super::history::HistoryStack) inside a group.
    StackId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(NoteId::new(), NoteId::new());
    }

    #[test]
    fn test_id_serializes_as_plain_uuid() {
        let id = CollectionId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_uuid()));
    }
}

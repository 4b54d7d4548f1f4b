//! The document's entity arena and its low-level mutators.
//!
//! [`NoteGraph`] owns every note, note collection and story element. Its
//! mutators apply changes and queue [`Notification`]s, but never record
//! history: history commands call back into them during undo and redo.
//!
//! Destroyed entities are queued as well; the owning
//! [`Document`](crate::Document) drains that queue and forwards each entry to
//! every history stack so commands can observe the destruction.

use crate::core::note::replace_if_changed;
use crate::{
    CollectionId, Color, EntityRef, Note, NoteCollection, NoteId, Owner, OwnerId, OwnerKind,
    Property, PropertyValue, RemovalMarker,
};
use std::collections::HashMap;

/// A change observers may want to react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    /// A property value actually changed.
    PropertyChanged { target: EntityRef, property: Property },
    /// Some property of the note changed.
    NoteModified(NoteId),
    /// A note in the collection changed, or the note count changed.
    NotesModified(CollectionId),
    NoteCountChanged(CollectionId),
    NoteAboutToDelete(NoteId),
    CollectionAboutToDelete(CollectionId),
    OwnerAboutToDelete(OwnerId),
}

#[derive(Debug, Default)]
pub struct NoteGraph {
    notes: HashMap<NoteId, Note>,
    collections: HashMap<CollectionId, NoteCollection>,
    owners: HashMap<OwnerId, Owner>,
    owner_order: Vec<OwnerId>,
    standalone_order: Vec<CollectionId>,
    notifications: Vec<Notification>,
    destroyed: Vec<EntityRef>,
    removal: RemovalMarker,
}

impl NoteGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Lookups ──────────────────────────────────────────────────

    pub fn note(&self, id: NoteId) -> Option<&Note> {
        self.notes.get(&id)
    }

    pub fn collection(&self, id: CollectionId) -> Option<&NoteCollection> {
        self.collections.get(&id)
    }

    pub fn owner(&self, id: OwnerId) -> Option<&Owner> {
        self.owners.get(&id)
    }

    /// Liveness check for any entity reference.
    pub fn contains(&self, entity: EntityRef) -> bool {
        match entity {
            EntityRef::Note(id) => self.notes.contains_key(&id),
            EntityRef::Collection(id) => self.collections.contains_key(&id),
            EntityRef::Owner(id) => self.owners.contains_key(&id),
        }
    }

    /// Story elements in creation order.
    pub fn owner_ids(&self) -> &[OwnerId] {
        &self.owner_order
    }

    /// Collections without an owner, in creation order.
    pub fn standalone_collection_ids(&self) -> &[CollectionId] {
        &self.standalone_order
    }

    pub fn note_count(&self) -> usize {
        self.notes.len()
    }

    /// Marker consulted by the removal routine; shared with history commands.
    pub fn removal_marker(&self) -> &RemovalMarker {
        &self.removal
    }

    pub(crate) fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    pub(crate) fn take_destroyed(&mut self) -> Vec<EntityRef> {
        std::mem::take(&mut self.destroyed)
    }

    fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    // ── Construction and destruction ─────────────────────────────

    /// Creates a story element together with its notes collection.
    ///
    /// The collection inherits `kind`. For color-synced kinds it also starts
    /// with the element's color.
    pub(crate) fn create_owner(&mut self, kind: OwnerKind, color: Color) -> OwnerId {
        let owner_id = OwnerId::new();
        let notes_color = if kind.syncs_color() { color } else { Color::WHITE };
        let notes = NoteCollection::new(Some((owner_id, kind)), notes_color);
        let notes_id = notes.id;
        self.collections.insert(notes_id, notes);
        self.owners.insert(
            owner_id,
            Owner {
                id: owner_id,
                kind,
                color,
                notes: notes_id,
            },
        );
        self.owner_order.push(owner_id);
        owner_id
    }

    /// Creates a collection with no owner. Its kind is [`OwnerKind::Other`].
    pub(crate) fn create_collection(&mut self) -> CollectionId {
        let notes = NoteCollection::new(None, Color::WHITE);
        let id = notes.id;
        self.collections.insert(id, notes);
        self.standalone_order.push(id);
        id
    }

    /// Destroys an element, its collection and every note in it.
    pub(crate) fn destroy_owner(&mut self, id: OwnerId) -> bool {
        let Some(notes) = self.owners.get(&id).map(|owner| owner.notes) else {
            return false;
        };
        self.notify(Notification::OwnerAboutToDelete(id));
        self.destroy_collection_inner(notes);
        self.owners.remove(&id);
        self.owner_order.retain(|owner| *owner != id);
        self.destroyed.push(EntityRef::Owner(id));
        true
    }

    /// Destroys a collection without an owner and every note in it.
    ///
    /// Owned collections live and die with their owner; this returns `false`
    /// for them.
    pub(crate) fn destroy_collection(&mut self, id: CollectionId) -> bool {
        match self.collections.get(&id) {
            Some(notes) if notes.owner.is_none() => {}
            _ => return false,
        }
        self.destroy_collection_inner(id);
        self.standalone_order.retain(|notes| *notes != id);
        true
    }

    fn destroy_collection_inner(&mut self, id: CollectionId) {
        self.notify(Notification::CollectionAboutToDelete(id));
        let Some(notes) = self.collections.remove(&id) else {
            return;
        };
        for note in notes.notes {
            self.notify(Notification::NoteAboutToDelete(note));
            self.notes.remove(&note);
            self.destroyed.push(EntityRef::Note(note));
        }
        self.destroyed.push(EntityRef::Collection(id));
    }

    // ── Structure ────────────────────────────────────────────────

    /// Inserts `note` into `collection` at `index` (clamped; `None` appends)
    /// and reparents it to the collection.
    ///
    /// Returns `None` without inserting when the collection is gone or the
    /// note id is already present.
    pub(crate) fn insert_note(
        &mut self,
        collection: CollectionId,
        mut note: Note,
        index: Option<usize>,
    ) -> Option<NoteId> {
        if self.notes.contains_key(&note.id) {
            return None;
        }
        let notes = self.collections.get_mut(&collection)?;
        let id = note.id;
        let index = index.map_or(notes.notes.len(), |i| i.min(notes.notes.len()));
        notes.notes.insert(index, id);
        note.collection = collection;
        self.notes.insert(id, note);
        self.notify(Notification::NoteCountChanged(collection));
        self.notify(Notification::NotesModified(collection));
        Some(id)
    }

    /// Populates an empty collection in one step. No-op on a non-empty one.
    pub(crate) fn assign_notes(&mut self, collection: CollectionId, notes: Vec<Note>) -> usize {
        match self.collections.get(&collection) {
            Some(existing) if existing.is_empty() => {}
            _ => return 0,
        }
        let mut added = 0;
        for mut note in notes {
            if self.notes.contains_key(&note.id) {
                continue;
            }
            note.collection = collection;
            let id = note.id;
            self.notes.insert(id, note);
            if let Some(existing) = self.collections.get_mut(&collection) {
                existing.notes.push(id);
            }
            added += 1;
        }
        if added > 0 {
            self.notify(Notification::NoteCountChanged(collection));
            self.notify(Notification::NotesModified(collection));
        }
        added
    }

    /// Detaches `note` from its collection and destroys it.
    ///
    /// Returns the index it occupied and the released note.
    pub(crate) fn remove_note(&mut self, id: NoteId) -> Option<(usize, Note)> {
        let collection = self.notes.get(&id)?.collection;
        let notes = self.collections.get_mut(&collection)?;
        let index = notes.index_of(id)?;
        notes.notes.remove(index);
        self.notify(Notification::NoteCountChanged(collection));
        self.notify(Notification::NotesModified(collection));
        self.notify(Notification::NoteAboutToDelete(id));
        let note = self.notes.remove(&id)?;
        self.destroyed.push(EntityRef::Note(id));
        Some((index, note))
    }

    // ── Properties ───────────────────────────────────────────────

    /// Reads a property. `None` when the target is gone or lacks the property.
    pub fn property(&self, target: EntityRef, property: Property) -> Option<PropertyValue> {
        match (target, property) {
            (EntityRef::Note(id), property) => self.note(id).map(|note| note.property(property)),
            (EntityRef::Collection(id), Property::Color) => {
                self.collection(id).map(|notes| PropertyValue::Color(notes.color))
            }
            (EntityRef::Owner(id), Property::Color) => {
                self.owner(id).map(|owner| PropertyValue::Color(owner.color))
            }
            _ => None,
        }
    }

    /// Writes a property through the entity's normal setter.
    ///
    /// Returns `true` only when the value changed; only then are
    /// notifications emitted.
    pub(crate) fn set_property(
        &mut self,
        target: EntityRef,
        property: Property,
        value: PropertyValue,
    ) -> bool {
        match (target, property, value) {
            (EntityRef::Note(id), property, value) => self.set_note_property(id, property, value),
            (EntityRef::Collection(id), Property::Color, PropertyValue::Color(color)) => {
                self.set_collection_color(id, color)
            }
            (EntityRef::Owner(id), Property::Color, PropertyValue::Color(color)) => {
                self.set_owner_color(id, color)
            }
            (target, property, value) => {
                log::warn!("ignoring {value:?} written to {property} of {target}");
                false
            }
        }
    }

    fn set_note_property(&mut self, id: NoteId, property: Property, value: PropertyValue) -> bool {
        let Some(note) = self.notes.get_mut(&id) else {
            return false;
        };
        if !note.set_property(property, value) {
            return false;
        }
        let collection = note.collection;
        self.notify(Notification::PropertyChanged {
            target: EntityRef::Note(id),
            property,
        });
        self.notify(Notification::NoteModified(id));
        self.notify(Notification::NotesModified(collection));
        true
    }

    /// Sets a collection's color and, for color-synced owner kinds, the
    /// owner's color.
    ///
    /// The write is skipped entirely when the color is unchanged. That check
    /// is what stops the collection ↔ owner sync from looping.
    pub(crate) fn set_collection_color(&mut self, id: CollectionId, color: Color) -> bool {
        let Some(notes) = self.collections.get_mut(&id) else {
            return false;
        };
        if !replace_if_changed(&mut notes.color, color) {
            return false;
        }
        let owner = notes.owner.filter(|_| notes.owner_kind.syncs_color());
        self.notify(Notification::PropertyChanged {
            target: EntityRef::Collection(id),
            property: Property::Color,
        });
        if let Some(owner) = owner {
            self.set_owner_color(owner, color);
        }
        true
    }

    /// Sets an owner's color and mirrors it into a color-synced collection.
    pub(crate) fn set_owner_color(&mut self, id: OwnerId, color: Color) -> bool {
        let Some(owner) = self.owners.get_mut(&id) else {
            return false;
        };
        if !replace_if_changed(&mut owner.color, color) {
            return false;
        }
        let notes = Some(owner.notes).filter(|_| owner.kind.syncs_color());
        self.notify(Notification::PropertyChanged {
            target: EntityRef::Owner(id),
            property: Property::Color,
        });
        if let Some(notes) = notes {
            self.set_collection_color(notes, color);
        }
        true
    }
}

//! High-level, undo-aware editing operations over a Plotnotes document.
//!
//! Every mutation follows the same shape: capture the old state, apply the
//! change to the [`NoteGraph`], then push a command onto the active history
//! stack. Commands are recorded already applied; the stack never re-runs a
//! command on push.

use crate::core::serializer::{
    collection_to_record, legacy_notes, note_to_record, notes_from_records, Record, DATA_KEY,
};
use crate::{
    CollectionId, Color, EntityRef, HistoryGroup, HistorySettings, HistoryStack, Note,
    NoteCollection, NoteGraph, NoteId, NoteType, Notification, Owner, OwnerId, OwnerKind,
    PlotnotesError, Property, PropertyChangeCommand, PropertyLocks, PropertyValue, Result,
    StackId, StepOutcome, StructuralChangeCommand,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Version stamp written into every whole-document record.
pub const DOCUMENT_FORMAT_VERSION: u32 = 1;

/// Serialized form of a whole document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    pub version: u32,
    #[serde(default)]
    pub owners: Vec<OwnerRecord>,
    /// Collections without an owner.
    #[serde(default)]
    pub collections: Vec<Record>,
}

/// Serialized story element together with its notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerRecord {
    pub kind: OwnerKind,
    pub color: Color,
    #[serde(default)]
    pub notes: Record,
}

/// An open Plotnotes document: the entity graph plus its edit history.
///
/// `Document` is the primary interface for all mutations that should be
/// undoable. The graph it wraps can be read freely through
/// [`graph`](Self::graph); writes go through `Document` so they get
/// recorded.
#[derive(Debug, Default)]
pub struct Document {
    graph: NoteGraph,
    history: HistoryGroup,
    locks: PropertyLocks,
    settings: HistorySettings,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: HistorySettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn graph(&self) -> &NoteGraph {
        &self.graph
    }

    pub fn settings(&self) -> &HistorySettings {
        &self.settings
    }

    /// Replaces the settings and re-bounds every existing stack.
    pub fn set_settings(&mut self, settings: HistorySettings) {
        let ids: Vec<StackId> = self.history.stacks().iter().map(HistoryStack::id).collect();
        for id in ids {
            if let Some(stack) = self.history.stack_mut(id) {
                stack.set_undo_limit(settings.undo_limit);
            }
        }
        self.settings = settings;
    }

    /// Drains the change notifications queued since the last call.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.graph.take_notifications()
    }

    /// Tells every history stack about entities destroyed for good since the
    /// last call.
    ///
    /// A note that a recorded structural command can bring back is not gone
    /// for good; commands referring to it stay valid. Owners and collections
    /// are dispatched first so commands depending on a destroyed collection
    /// stop counting as restorers before its notes are judged.
    fn flush_destroyed(&mut self) {
        let (notes, containers): (Vec<EntityRef>, Vec<EntityRef>) = self
            .graph
            .take_destroyed()
            .into_iter()
            .partition(|entity| matches!(entity, EntityRef::Note(_)));
        for entity in containers.into_iter().chain(notes) {
            if self.history.restores(entity) {
                log::debug!("{entity} can be restored by history");
                continue;
            }
            self.history.entity_destroyed(entity);
            self.locks.forget(entity);
        }
    }

    fn recording(&self) -> bool {
        self.history.active().is_some()
    }

    // ── History ──────────────────────────────────────────────────

    /// Registers a new, inactive history stack bounded by the configured
    /// undo limit.
    pub fn add_history_stack(&mut self, name: impl Into<String>) -> StackId {
        let stack = HistoryStack::with_limit(name, self.settings.undo_limit);
        self.history.add_stack(stack)
    }

    /// Drops a history stack and every command it holds.
    pub fn remove_history_stack(&mut self, id: StackId) -> bool {
        self.history.remove_stack(id).is_some()
    }

    /// Routes subsequent edits to `id`, or stops recording with `None`.
    ///
    /// # Errors
    ///
    /// Returns [`PlotnotesError::StackNotFound`] if `id` was never added or
    /// has been removed.
    pub fn set_active_stack(&mut self, id: Option<StackId>) -> Result<()> {
        self.history.set_active(id)
    }

    pub fn active_stack(&self) -> Option<&HistoryStack> {
        self.history.active()
    }

    pub fn history(&self) -> &HistoryGroup {
        &self.history
    }

    /// Reverts the last command of the active stack.
    pub fn undo(&mut self) -> StepOutcome {
        let outcome = self.history.undo(&mut self.graph);
        self.flush_destroyed();
        log::debug!("undo: {outcome:?}");
        outcome
    }

    /// Re-applies the next command of the active stack.
    pub fn redo(&mut self) -> StepOutcome {
        let outcome = self.history.redo(&mut self.graph);
        self.flush_destroyed();
        log::debug!("redo: {outcome:?}");
        outcome
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_text(&self) -> String {
        self.history.undo_text()
    }

    pub fn redo_text(&self) -> String {
        self.history.redo_text()
    }

    /// Marks every stack's current position as saved.
    pub fn set_clean(&mut self) {
        let ids: Vec<StackId> = self.history.stacks().iter().map(HistoryStack::id).collect();
        for id in ids {
            if let Some(stack) = self.history.stack_mut(id) {
                stack.set_clean();
            }
        }
    }

    /// `true` when no stack has moved since the last [`set_clean`](Self::set_clean).
    pub fn is_clean(&self) -> bool {
        self.history.stacks().iter().all(HistoryStack::is_clean)
    }

    // ── Story elements and collections ───────────────────────────

    /// Creates a story element and its notes collection. Not undoable.
    pub fn create_owner(&mut self, kind: OwnerKind, color: Color) -> OwnerId {
        let id = self.graph.create_owner(kind, color);
        log::debug!("created {kind:?} element {id}");
        id
    }

    /// Destroys a story element, its collection and every note in it.
    ///
    /// Commands that refer to any of them become obsolete.
    ///
    /// # Errors
    ///
    /// Returns [`PlotnotesError::OwnerNotFound`] if `id` is not in the document.
    pub fn destroy_owner(&mut self, id: OwnerId) -> Result<()> {
        if !self.graph.destroy_owner(id) {
            return Err(PlotnotesError::OwnerNotFound(id.to_string()));
        }
        self.flush_destroyed();
        Ok(())
    }

    /// Creates a collection with no owner. Not undoable.
    pub fn create_collection(&mut self) -> CollectionId {
        self.graph.create_collection()
    }

    /// Destroys a standalone collection and its notes.
    ///
    /// # Errors
    ///
    /// Returns [`PlotnotesError::CollectionNotFound`] if `id` is not a
    /// standalone collection of this document. Owned collections go away
    /// with their owner.
    pub fn destroy_collection(&mut self, id: CollectionId) -> Result<()> {
        if !self.graph.destroy_collection(id) {
            return Err(PlotnotesError::CollectionNotFound(id.to_string()));
        }
        self.flush_destroyed();
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`PlotnotesError::OwnerNotFound`] if `id` is not in the document.
    pub fn owner(&self, id: OwnerId) -> Result<&Owner> {
        self.graph
            .owner(id)
            .ok_or_else(|| PlotnotesError::OwnerNotFound(id.to_string()))
    }

    /// # Errors
    ///
    /// Returns [`PlotnotesError::CollectionNotFound`] if `id` is not in the
    /// document.
    pub fn collection(&self, id: CollectionId) -> Result<&NoteCollection> {
        self.graph
            .collection(id)
            .ok_or_else(|| PlotnotesError::CollectionNotFound(id.to_string()))
    }

    /// # Errors
    ///
    /// Returns [`PlotnotesError::NoteNotFound`] if `id` is not in the document.
    pub fn note(&self, id: NoteId) -> Result<&Note> {
        self.graph
            .note(id)
            .ok_or_else(|| PlotnotesError::NoteNotFound(id.to_string()))
    }

    /// The notes of a collection, in order.
    ///
    /// # Errors
    ///
    /// Returns [`PlotnotesError::CollectionNotFound`] if `id` is not in the
    /// document.
    pub fn notes(&self, id: CollectionId) -> Result<Vec<&Note>> {
        let collection = self.collection(id)?;
        Ok(collection
            .note_ids()
            .iter()
            .filter_map(|note| self.graph.note(*note))
            .collect())
    }

    // ── Notes ────────────────────────────────────────────────────

    /// Appends an empty text note to `collection`.
    ///
    /// # Errors
    ///
    /// Returns [`PlotnotesError::CollectionNotFound`] if `collection` is not
    /// in the document.
    pub fn add_text_note(&mut self, collection: CollectionId) -> Result<NoteId> {
        self.add_note(collection, Note::new(collection, NoteType::Text))
    }

    /// Appends an empty form note bound to `form_id`.
    ///
    /// # Errors
    ///
    /// Returns [`PlotnotesError::CollectionNotFound`] if `collection` is not
    /// in the document.
    pub fn add_form_note(
        &mut self,
        collection: CollectionId,
        form_id: impl Into<String>,
    ) -> Result<NoteId> {
        let mut note = Note::new(collection, NoteType::Form);
        note.form_id = form_id.into();
        self.add_note(collection, note)
    }

    fn add_note(&mut self, collection: CollectionId, note: Note) -> Result<NoteId> {
        let id = self
            .graph
            .insert_note(collection, note, None)
            .ok_or_else(|| PlotnotesError::CollectionNotFound(collection.to_string()))?;
        if self.settings.record_insertions && self.recording() {
            let index = self
                .graph
                .collection(collection)
                .and_then(|notes| notes.index_of(id))
                .unwrap_or_default();
            self.history
                .push(Box::new(StructuralChangeCommand::inserted(collection, id, index)));
        }
        Ok(id)
    }

    /// Removes and destroys a note, recording an undoable removal.
    ///
    /// Nothing is recorded when the removal is itself being driven by a
    /// history command.
    ///
    /// # Errors
    ///
    /// Returns [`PlotnotesError::NoteNotFound`] if `id` is not in the document.
    pub fn remove_note(&mut self, id: NoteId) -> Result<()> {
        let note = self.note(id)?;
        let collection = note.collection();
        let snapshot = note_to_record(note);
        let (index, _) = self
            .graph
            .remove_note(id)
            .ok_or_else(|| PlotnotesError::NoteNotFound(id.to_string()))?;
        if self.recording() && !self.graph.removal_marker().is_removing(id) {
            self.history.push(Box::new(StructuralChangeCommand::removed(
                collection, id, index, snapshot,
            )));
        }
        self.flush_destroyed();
        Ok(())
    }

    /// Removes every note of a collection, each as its own undoable step.
    ///
    /// # Errors
    ///
    /// Returns [`PlotnotesError::CollectionNotFound`] if `collection` is not
    /// in the document.
    pub fn clear_notes(&mut self, collection: CollectionId) -> Result<usize> {
        let mut removed = 0;
        while let Some(note) = self.collection(collection)?.last_note() {
            self.remove_note(note)?;
            removed += 1;
        }
        Ok(removed)
    }

    // ── Properties ───────────────────────────────────────────────

    /// Writes a property and records the change unless it is locked.
    ///
    /// Returns `false` when the value was already equal; nothing is recorded
    /// then.
    ///
    /// # Errors
    ///
    /// Returns the matching not-found error if `target` is gone, or
    /// [`PlotnotesError::UnknownProperty`] if `target` has no such property.
    pub fn set_property(
        &mut self,
        target: EntityRef,
        property: Property,
        value: PropertyValue,
    ) -> Result<bool> {
        if !self.graph.contains(target) {
            return Err(missing(target));
        }
        let old = self
            .graph
            .property(target, property)
            .ok_or_else(|| PlotnotesError::UnknownProperty(format!("{} {property}", target.noun())))?;
        if old == value {
            return Ok(false);
        }
        if !self.graph.set_property(target, property, value.clone()) {
            return Ok(false);
        }
        if self.recording() && !self.locks.is_locked(target, property) {
            self.history.push(Box::new(PropertyChangeCommand::new(
                target, property, old, value,
            )));
        }
        Ok(true)
    }

    /// # Errors
    ///
    /// See [`set_property`](Self::set_property).
    pub fn set_note_title(&mut self, id: NoteId, title: impl Into<String>) -> Result<bool> {
        self.set_property(EntityRef::Note(id), Property::Title, title.into().into())
    }

    /// Summary is derived display text; writes to it are never recorded.
    ///
    /// # Errors
    ///
    /// See [`set_property`](Self::set_property).
    pub fn set_note_summary(&mut self, id: NoteId, summary: impl Into<String>) -> Result<bool> {
        self.set_property(EntityRef::Note(id), Property::Summary, summary.into().into())
    }

    /// # Errors
    ///
    /// See [`set_property`](Self::set_property).
    pub fn set_note_content(&mut self, id: NoteId, content: Value) -> Result<bool> {
        self.set_property(EntityRef::Note(id), Property::Content, content.into())
    }

    /// # Errors
    ///
    /// See [`set_property`](Self::set_property).
    pub fn set_note_color(&mut self, id: NoteId, color: Color) -> Result<bool> {
        self.set_property(EntityRef::Note(id), Property::Color, color.into())
    }

    /// Replaces a form note's whole data object.
    ///
    /// # Errors
    ///
    /// See [`set_property`](Self::set_property).
    pub fn set_note_form_data(&mut self, id: NoteId, data: Map<String, Value>) -> Result<bool> {
        self.set_property(EntityRef::Note(id), Property::FormData, Value::Object(data).into())
    }

    /// Sets one field of a form note's data as a single undoable step.
    ///
    /// # Errors
    ///
    /// See [`set_property`](Self::set_property).
    pub fn set_form_value(&mut self, id: NoteId, key: &str, value: Value) -> Result<bool> {
        let mut data = self.note(id)?.form_data().clone();
        data.insert(key.to_string(), value);
        self.set_note_form_data(id, data)
    }

    /// Sets a collection's color; a color-synced owner follows.
    ///
    /// # Errors
    ///
    /// See [`set_property`](Self::set_property).
    pub fn set_collection_color(&mut self, id: CollectionId, color: Color) -> Result<bool> {
        self.set_property(EntityRef::Collection(id), Property::Color, color.into())
    }

    /// Sets a story element's color; a color-synced collection follows.
    ///
    /// # Errors
    ///
    /// See [`set_property`](Self::set_property).
    pub fn set_owner_color(&mut self, id: OwnerId, color: Color) -> Result<bool> {
        self.set_property(EntityRef::Owner(id), Property::Color, color.into())
    }

    /// Stops recording writes to `property` of `target`.
    pub fn lock_property(&mut self, target: EntityRef, property: Property) {
        self.locks.lock(target, property);
    }

    pub fn unlock_property(&mut self, target: EntityRef, property: Property) {
        self.locks.unlock(target, property);
    }

    pub fn is_property_locked(&self, target: EntityRef, property: Property) -> bool {
        self.locks.is_locked(target, property)
    }

    // ── Serialization ────────────────────────────────────────────

    /// # Errors
    ///
    /// Returns [`PlotnotesError::NoteNotFound`] if `id` is not in the document.
    pub fn serialize_note(&self, id: NoteId) -> Result<Record> {
        Ok(note_to_record(self.note(id)?))
    }

    /// # Errors
    ///
    /// Returns [`PlotnotesError::CollectionNotFound`] if `id` is not in the
    /// document.
    pub fn serialize_collection(&self, id: CollectionId) -> Result<Record> {
        collection_to_record(&self.graph, id)
            .ok_or_else(|| PlotnotesError::CollectionNotFound(id.to_string()))
    }

    /// Populates an empty collection from its serialized form. Not undoable.
    ///
    /// Accepts either a collection record (`{"color": ..., "#data": [...]}`)
    /// or a legacy flat note array. A collection that already holds notes is
    /// left untouched. The color of a collection whose owner syncs color is
    /// owned by the owner and is not restored from the record.
    ///
    /// Returns the number of notes materialized.
    ///
    /// # Errors
    ///
    /// Returns [`PlotnotesError::CollectionNotFound`] if `id` is not in the
    /// document, or [`PlotnotesError::InvalidRecord`] if `value` is neither
    /// an object nor an array.
    pub fn load_collection(&mut self, id: CollectionId, value: &Value) -> Result<usize> {
        let collection = self.collection(id)?;
        let synced = collection.owner().is_some() && collection.owner_kind().syncs_color();
        let empty = collection.is_empty();
        let record = match value {
            Value::Array(values) => return self.load_legacy_notes(id, values),
            Value::Object(record) => record,
            other => {
                return Err(PlotnotesError::InvalidRecord(format!(
                    "expected notes object, got {other}"
                )))
            }
        };
        if !empty {
            log::warn!("notes {id} already populated; ignoring load");
            return Ok(0);
        }
        if !synced {
            if let Some(color) = record.get(Property::Color.key()).and_then(Value::as_str) {
                match color.parse::<Color>() {
                    Ok(color) => {
                        self.graph.set_collection_color(id, color);
                    }
                    Err(e) => log::warn!("ignoring notes color: {e}"),
                }
            }
        }
        let added = match record.get(DATA_KEY) {
            Some(Value::Array(values)) => {
                let notes = notes_from_records(values, id);
                self.graph.assign_notes(id, notes)
            }
            Some(other) => {
                log::warn!("ignoring non-array {DATA_KEY}: {other}");
                0
            }
            None => 0,
        };
        Ok(added)
    }

    /// Populates an empty collection from a legacy flat note array.
    /// Not undoable, and a no-op on a non-empty collection.
    ///
    /// # Errors
    ///
    /// Returns [`PlotnotesError::CollectionNotFound`] if `id` is not in the
    /// document.
    pub fn load_legacy_notes(&mut self, id: CollectionId, values: &[Value]) -> Result<usize> {
        if !self.collection(id)?.is_empty() {
            log::warn!("notes {id} already populated; ignoring legacy load");
            return Ok(0);
        }
        let notes = legacy_notes(values, id);
        Ok(self.graph.assign_notes(id, notes))
    }

    /// Serializes every story element and standalone collection.
    pub fn to_record(&self) -> DocumentRecord {
        let owners = self
            .graph
            .owner_ids()
            .iter()
            .filter_map(|id| self.graph.owner(*id))
            .map(|owner| OwnerRecord {
                kind: owner.kind(),
                color: owner.color(),
                notes: collection_to_record(&self.graph, owner.notes()).unwrap_or_default(),
            })
            .collect();
        let collections = self
            .graph
            .standalone_collection_ids()
            .iter()
            .filter_map(|id| collection_to_record(&self.graph, *id))
            .collect();
        DocumentRecord {
            version: DOCUMENT_FORMAT_VERSION,
            owners,
            collections,
        }
    }

    /// Rebuilds a document from its record, with empty history.
    ///
    /// Every entity gets a fresh identity.
    ///
    /// # Errors
    ///
    /// Returns [`PlotnotesError::InvalidDocument`] if the record was written
    /// by a newer format version.
    pub fn from_record(record: &DocumentRecord, settings: HistorySettings) -> Result<Self> {
        if record.version > DOCUMENT_FORMAT_VERSION {
            return Err(PlotnotesError::InvalidDocument(format!(
                "format version {} is newer than {DOCUMENT_FORMAT_VERSION}",
                record.version
            )));
        }
        let mut document = Self::with_settings(settings);
        for owner in &record.owners {
            let id = document.create_owner(owner.kind, owner.color);
            let notes = document.owner(id)?.notes();
            document.load_collection(notes, &Value::Object(owner.notes.clone()))?;
        }
        for notes in &record.collections {
            let id = document.create_collection();
            document.load_collection(id, &Value::Object(notes.clone()))?;
        }
        // Loading is not an edit.
        document.graph.take_notifications();
        Ok(document)
    }
}

fn missing(target: EntityRef) -> PlotnotesError {
    match target {
        EntityRef::Note(id) => PlotnotesError::NoteNotFound(id.to_string()),
        EntityRef::Collection(id) => PlotnotesError::CollectionNotFound(id.to_string()),
        EntityRef::Owner(id) => PlotnotesError::OwnerNotFound(id.to_string()),
    }
}

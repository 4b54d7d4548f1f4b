//! Undoable insertion and removal of notes in a collection.
//!
//! The command never keeps a note alive. When the note leaves the collection
//! it is destroyed, and the command keeps a full serialized snapshot taken at
//! that moment. Bringing the note back builds a new note from the snapshot
//! under the note's original id and inserts it at the index it used to
//! occupy, so every other command that refers to the note keeps working.
//!
//! If the collection itself is destroyed the command is permanently
//! obsolete: there is nothing left to restore the note into.

use crate::core::serializer::{note_from_record, note_to_record, Record};
use crate::{ChangeCommand, CollectionId, EntityRef, NoteGraph, NoteId};

/// Direction of the recorded structural change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuralChange {
    Insert,
    Remove,
}

#[derive(Debug, Clone)]
pub struct StructuralChangeCommand {
    change: StructuralChange,
    collection: CollectionId,
    note: NoteId,
    /// Whether the last step left the note in the collection.
    present: bool,
    index: usize,
    snapshot: Record,
    obsolete: bool,
}

impl StructuralChangeCommand {
    /// Records a note that was just inserted at `index`.
    pub fn inserted(collection: CollectionId, note: NoteId, index: usize) -> Self {
        Self {
            change: StructuralChange::Insert,
            collection,
            note,
            present: true,
            index,
            snapshot: Record::new(),
            obsolete: false,
        }
    }

    /// Records a note that was just removed from `index`, given its snapshot
    /// taken before removal.
    pub fn removed(collection: CollectionId, note: NoteId, index: usize, snapshot: Record) -> Self {
        Self {
            change: StructuralChange::Remove,
            collection,
            note,
            present: false,
            index,
            snapshot,
            obsolete: false,
        }
    }

    pub fn change(&self) -> StructuralChange {
        self.change
    }

    pub fn collection(&self) -> CollectionId {
        self.collection
    }

    /// The note this command inserts or removes. Stable across undo and redo.
    pub fn note(&self) -> NoteId {
        self.note
    }

    /// Snapshot → remove. Runs inside a removal scope so the removal routine
    /// recognises it and records nothing.
    fn take_out(&mut self, graph: &mut NoteGraph) {
        let Some(note) = graph.note(self.note) else {
            log::debug!("note {} already gone; structural command obsolete", self.note);
            self.obsolete = true;
            return;
        };
        if note.collection() != self.collection {
            self.obsolete = true;
            return;
        }
        self.snapshot = note_to_record(note);

        let marker = graph.removal_marker().clone();
        let _scope = marker.scope(self.note);
        match graph.remove_note(self.note) {
            Some((index, _)) => {
                self.index = index;
                self.present = false;
            }
            None => self.obsolete = true,
        }
    }

    /// Deserialize the note from the snapshot under its own id → insert.
    fn bring_back(&mut self, graph: &mut NoteGraph) {
        if !graph.contains(EntityRef::Collection(self.collection)) {
            log::debug!("notes {} gone; structural command obsolete", self.collection);
            self.obsolete = true;
            return;
        }
        let mut note = match note_from_record(&self.snapshot, self.collection) {
            Ok(note) => note,
            Err(e) => {
                log::warn!("cannot rebuild note from snapshot: {e}");
                self.obsolete = true;
                return;
            }
        };
        note.id = self.note;
        match graph.insert_note(self.collection, note, Some(self.index)) {
            Some(_) => self.present = true,
            None => self.obsolete = true,
        }
    }
}

impl ChangeCommand for StructuralChangeCommand {
    fn text(&self) -> String {
        match self.change {
            StructuralChange::Insert => "Add note".to_string(),
            StructuralChange::Remove => "Remove note".to_string(),
        }
    }

    fn apply(&mut self, graph: &mut NoteGraph) {
        if self.obsolete {
            return;
        }
        match self.change {
            StructuralChange::Insert => self.bring_back(graph),
            StructuralChange::Remove => self.take_out(graph),
        }
    }

    fn revert(&mut self, graph: &mut NoteGraph) {
        if self.obsolete {
            return;
        }
        match self.change {
            StructuralChange::Insert => self.take_out(graph),
            StructuralChange::Remove => self.bring_back(graph),
        }
    }

    fn is_obsolete(&self) -> bool {
        self.obsolete
    }

    fn entity_destroyed(&mut self, entity: EntityRef) {
        match entity {
            EntityRef::Collection(id) if id == self.collection => self.obsolete = true,
            // Gone for good while this command expected it in the collection.
            EntityRef::Note(id) if id == self.note => self.obsolete = true,
            _ => {}
        }
    }

    fn restores(&self, entity: EntityRef) -> bool {
        !self.obsolete && !self.present && entity == EntityRef::Note(self.note)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Note, NoteType, Property};

    fn titled(graph: &mut NoteGraph, collection: CollectionId, title: &str) -> NoteId {
        let id = graph
            .insert_note(collection, Note::new(collection, NoteType::Text), None)
            .unwrap();
        graph.set_property(EntityRef::Note(id), Property::Title, title.into());
        id
    }

    fn titles(graph: &NoteGraph, collection: CollectionId) -> Vec<String> {
        graph
            .collection(collection)
            .unwrap()
            .note_ids()
            .iter()
            .map(|id| graph.note(*id).unwrap().title().to_string())
            .collect()
    }

    #[test]
    fn test_undo_removal_rebuilds_at_same_index() {
        let mut graph = NoteGraph::new();
        let notes = graph.create_collection();
        titled(&mut graph, notes, "a");
        let b = titled(&mut graph, notes, "b");
        titled(&mut graph, notes, "c");

        let snapshot = note_to_record(graph.note(b).unwrap());
        let (index, _) = graph.remove_note(b).unwrap();
        let mut cmd = StructuralChangeCommand::removed(notes, b, index, snapshot);
        assert!(cmd.restores(EntityRef::Note(b)));

        cmd.revert(&mut graph);
        assert_eq!(titles(&graph, notes), vec!["a", "b", "c"]);
        assert_eq!(graph.collection(notes).unwrap().note_at(1), Some(b));
        assert!(!cmd.restores(EntityRef::Note(b)));

        cmd.apply(&mut graph);
        assert_eq!(titles(&graph, notes), vec!["a", "c"]);
        assert!(!graph.contains(EntityRef::Note(b)));
        assert!(!cmd.is_obsolete());
    }

    #[test]
    fn test_undo_insert_leaves_marker_clear() {
        let mut graph = NoteGraph::new();
        let notes = graph.create_collection();
        let a = titled(&mut graph, notes, "a");
        let mut cmd = StructuralChangeCommand::inserted(notes, a, 0);
        assert!(!cmd.restores(EntityRef::Note(a)));

        cmd.revert(&mut graph);
        assert_eq!(graph.removal_marker().current(), None);
        assert!(graph.collection(notes).unwrap().is_empty());
        assert!(cmd.restores(EntityRef::Note(a)));
    }

    #[test]
    fn test_insert_revert_captures_latest_state() {
        let mut graph = NoteGraph::new();
        let notes = graph.create_collection();
        let a = titled(&mut graph, notes, "draft");
        let mut cmd = StructuralChangeCommand::inserted(notes, a, 0);
        graph.set_property(EntityRef::Note(a), Property::Title, "final".into());

        cmd.revert(&mut graph);
        cmd.apply(&mut graph);
        assert_eq!(titles(&graph, notes), vec!["final"]);
        assert_eq!(graph.note(a).unwrap().title(), "final");
    }

    #[test]
    fn test_destroyed_collection_is_obsolete() {
        let mut graph = NoteGraph::new();
        let notes = graph.create_collection();
        let a = titled(&mut graph, notes, "a");
        let snapshot = note_to_record(graph.note(a).unwrap());
        graph.remove_note(a);
        let mut cmd = StructuralChangeCommand::removed(notes, a, 0, snapshot);

        graph.destroy_collection(notes);
        cmd.entity_destroyed(EntityRef::Collection(notes));
        assert!(cmd.is_obsolete());
        assert!(!cmd.restores(EntityRef::Note(a)));
        cmd.revert(&mut graph);
        assert_eq!(graph.note_count(), 0);
    }

    #[test]
    fn test_note_gone_for_good_blocks_redo() {
        let mut graph = NoteGraph::new();
        let notes = graph.create_collection();
        let a = titled(&mut graph, notes, "a");
        let snapshot = note_to_record(graph.note(a).unwrap());
        graph.remove_note(a);
        let mut cmd = StructuralChangeCommand::removed(notes, a, 0, snapshot);

        cmd.revert(&mut graph);
        graph.remove_note(a);
        cmd.entity_destroyed(EntityRef::Note(a));
        assert!(cmd.is_obsolete());

        cmd.apply(&mut graph);
        assert_eq!(graph.note_count(), 0);
    }

    #[test]
    fn test_rebuild_refuses_live_id() {
        let mut graph = NoteGraph::new();
        let notes = graph.create_collection();
        let a = titled(&mut graph, notes, "a");
        let snapshot = note_to_record(graph.note(a).unwrap());
        let mut cmd = StructuralChangeCommand::removed(notes, a, 0, snapshot);

        cmd.revert(&mut graph);
        assert!(cmd.is_obsolete());
        assert_eq!(graph.collection(notes).unwrap().note_count(), 1);
    }
}

//! Undoable writes of a single property, and the locks that suppress them.

use crate::{ChangeCommand, EntityRef, NoteGraph, Property, PropertyValue};
use std::collections::HashSet;

/// Records one property write on one entity.
///
/// Both the value before and the value after the write are kept: revert
/// writes the old value back and apply restores the new one after an undo.
/// Writes go through the graph's normal setters, so notifications fire and
/// collection ↔ owner color sync re-derives.
#[derive(Debug, Clone)]
pub struct PropertyChangeCommand {
    target: EntityRef,
    property: Property,
    old: PropertyValue,
    new: PropertyValue,
    obsolete: bool,
}

impl PropertyChangeCommand {
    pub fn new(
        target: EntityRef,
        property: Property,
        old: PropertyValue,
        new: PropertyValue,
    ) -> Self {
        Self {
            target,
            property,
            old,
            new,
            obsolete: false,
        }
    }

    pub fn target(&self) -> EntityRef {
        self.target
    }

    pub fn property(&self) -> Property {
        self.property
    }

    fn write(&mut self, graph: &mut NoteGraph, value: PropertyValue) {
        if self.obsolete {
            return;
        }
        if !graph.contains(self.target) {
            log::debug!("{} is gone; property command obsolete", self.target);
            self.obsolete = true;
            return;
        }
        graph.set_property(self.target, self.property, value);
    }
}

impl ChangeCommand for PropertyChangeCommand {
    fn text(&self) -> String {
        format!("Change {} {}", self.target.noun(), self.property)
    }

    fn apply(&mut self, graph: &mut NoteGraph) {
        let value = self.new.clone();
        self.write(graph, value);
    }

    fn revert(&mut self, graph: &mut NoteGraph) {
        let value = self.old.clone();
        self.write(graph, value);
    }

    fn is_obsolete(&self) -> bool {
        self.obsolete
    }

    fn entity_destroyed(&mut self, entity: EntityRef) {
        if entity == self.target {
            self.obsolete = true;
        }
    }
}

/// Per-entity, per-property locks.
///
/// A locked property is still writable, but writes to it never produce a
/// [`PropertyChangeCommand`]. Properties that are never undoable (see
/// [`Property::is_undoable`]) always read as locked.
#[derive(Debug, Clone, Default)]
pub struct PropertyLocks {
    locked: HashSet<(EntityRef, Property)>,
}

impl PropertyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock(&mut self, target: EntityRef, property: Property) {
        self.locked.insert((target, property));
    }

    pub fn unlock(&mut self, target: EntityRef, property: Property) {
        self.locked.remove(&(target, property));
    }

    pub fn is_locked(&self, target: EntityRef, property: Property) -> bool {
        !property.is_undoable() || self.locked.contains(&(target, property))
    }

    /// Drops every lock held for a destroyed entity.
    pub fn forget(&mut self, target: EntityRef) {
        self.locked.retain(|(entity, _)| *entity != target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, OwnerKind};

    #[test]
    fn test_revert_and_apply_round_trip() {
        let mut graph = NoteGraph::new();
        let scene = graph.create_owner(OwnerKind::Scene, Color::WHITE);
        let target = EntityRef::Owner(scene);
        graph.set_property(target, Property::Color, Color::BLACK.into());

        let mut cmd = PropertyChangeCommand::new(
            target,
            Property::Color,
            Color::WHITE.into(),
            Color::BLACK.into(),
        );
        cmd.revert(&mut graph);
        assert_eq!(graph.owner(scene).unwrap().color(), Color::WHITE);
        cmd.apply(&mut graph);
        assert_eq!(graph.owner(scene).unwrap().color(), Color::BLACK);
        assert_eq!(cmd.text(), "Change element color");
    }

    #[test]
    fn test_destroyed_target_makes_command_obsolete() {
        let mut graph = NoteGraph::new();
        let scene = graph.create_owner(OwnerKind::Scene, Color::WHITE);
        let mut cmd = PropertyChangeCommand::new(
            EntityRef::Owner(scene),
            Property::Color,
            Color::WHITE.into(),
            Color::BLACK.into(),
        );
        cmd.entity_destroyed(EntityRef::Owner(scene));
        assert!(cmd.is_obsolete());

        graph.set_property(EntityRef::Owner(scene), Property::Color, Color::BLACK.into());
        cmd.revert(&mut graph);
        assert_eq!(graph.owner(scene).unwrap().color(), Color::BLACK);
    }

    #[test]
    fn test_missing_target_detected_lazily() {
        let mut graph = NoteGraph::new();
        let scene = graph.create_owner(OwnerKind::Scene, Color::WHITE);
        let mut cmd = PropertyChangeCommand::new(
            EntityRef::Owner(scene),
            Property::Color,
            Color::WHITE.into(),
            Color::BLACK.into(),
        );
        graph.destroy_owner(scene);
        cmd.revert(&mut graph);
        assert!(cmd.is_obsolete());
    }

    #[test]
    fn test_locks() {
        let mut locks = PropertyLocks::new();
        let scene = EntityRef::Owner(crate::OwnerId::new());
        assert!(!locks.is_locked(scene, Property::Color));
        locks.lock(scene, Property::Color);
        assert!(locks.is_locked(scene, Property::Color));
        locks.forget(scene);
        assert!(!locks.is_locked(scene, Property::Color));
        assert!(locks.is_locked(scene, Property::Summary));
    }
}

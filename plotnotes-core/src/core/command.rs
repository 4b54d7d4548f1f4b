//! The undoable unit of work recorded on a [`HistoryStack`](crate::HistoryStack).

use crate::{EntityRef, NoteGraph};
use std::fmt;

/// A recorded mutation that can be reverted and re-applied.
///
/// Commands are pushed *after* the caller has already applied the mutation,
/// so [`apply`](Self::apply) only runs on redo. Commands never own the
/// entities they affect: they hold ids and check liveness against the graph.
///
/// Once obsolete, a command stays obsolete and both directions are no-ops.
pub trait ChangeCommand: fmt::Debug {
    /// Human-readable label, e.g. `"Change note title"`.
    fn text(&self) -> String;

    /// Performs the forward mutation (redo).
    fn apply(&mut self, graph: &mut NoteGraph);

    /// Performs the inverse mutation (undo).
    fn revert(&mut self, graph: &mut NoteGraph);

    fn is_obsolete(&self) -> bool;

    /// Called for every entity destroyed for good: no command in any stack
    /// can bring it back.
    fn entity_destroyed(&mut self, entity: EntityRef);

    /// Whether the next undo or redo of this command would bring `entity`
    /// back into the graph.
    fn restores(&self, _entity: EntityRef) -> bool {
        false
    }
}

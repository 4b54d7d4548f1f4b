//! Bounded undo/redo history for one document region.

use crate::{ChangeCommand, EntityRef, NoteGraph, StackId};

/// Default maximum number of commands a stack keeps.
pub const DEFAULT_UNDO_LIMIT: usize = 100;

/// What a single undo or redo step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Nothing to undo or redo.
    Idle,
    /// The command ran.
    Applied,
    /// The command was obsolete, did nothing, and was dropped from the stack.
    Obsolete,
}

/// An ordered list of commands with a cursor.
///
/// Commands before the cursor are done; commands at or after it are undone.
/// The cursor always lies in `0..=len`.
#[derive(Debug)]
pub struct HistoryStack {
    id: StackId,
    name: String,
    commands: Vec<Box<dyn ChangeCommand>>,
    cursor: usize,
    /// Zero means unbounded.
    undo_limit: usize,
    clean_index: Option<usize>,
}

impl HistoryStack {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_limit(name, DEFAULT_UNDO_LIMIT)
    }

    pub fn with_limit(name: impl Into<String>, undo_limit: usize) -> Self {
        Self {
            id: StackId::new(),
            name: name.into(),
            commands: Vec::new(),
            cursor: 0,
            undo_limit,
            clean_index: Some(0),
        }
    }

    pub fn id(&self) -> StackId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn command(&self, index: usize) -> Option<&dyn ChangeCommand> {
        self.commands.get(index).map(|cmd| cmd.as_ref())
    }

    pub fn undo_limit(&self) -> usize {
        self.undo_limit
    }

    /// Changes the depth bound, dropping the oldest commands if needed.
    pub fn set_undo_limit(&mut self, undo_limit: usize) {
        self.undo_limit = undo_limit;
        self.enforce_limit();
    }

    /// Records a mutation the caller has already applied.
    ///
    /// Everything at or after the cursor is discarded first. The command is
    /// not applied.
    pub fn push(&mut self, command: Box<dyn ChangeCommand>) {
        self.commands.truncate(self.cursor);
        if self.clean_index.is_some_and(|clean| clean > self.cursor) {
            self.clean_index = None;
        }
        self.commands.push(command);
        self.cursor = self.commands.len();
        self.enforce_limit();
    }

    fn enforce_limit(&mut self) {
        if self.undo_limit == 0 || self.commands.len() <= self.undo_limit {
            return;
        }
        let excess = self.commands.len() - self.undo_limit;
        self.commands.drain(..excess);
        self.cursor = self.cursor.saturating_sub(excess);
        self.clean_index = self.clean_index.and_then(|clean| clean.checked_sub(excess));
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.commands.len()
    }

    /// Label of the command the next [`undo`](Self::undo) would revert.
    pub fn undo_text(&self) -> String {
        self.cursor
            .checked_sub(1)
            .and_then(|index| self.commands.get(index))
            .map(|cmd| cmd.text())
            .unwrap_or_default()
    }

    /// Label of the command the next [`redo`](Self::redo) would apply.
    pub fn redo_text(&self) -> String {
        self.commands
            .get(self.cursor)
            .map(|cmd| cmd.text())
            .unwrap_or_default()
    }

    pub fn undo(&mut self, graph: &mut NoteGraph) -> StepOutcome {
        if self.cursor == 0 {
            return StepOutcome::Idle;
        }
        self.cursor -= 1;
        let index = self.cursor;
        self.commands[index].revert(graph);
        self.settle(index)
    }

    pub fn redo(&mut self, graph: &mut NoteGraph) -> StepOutcome {
        if self.cursor == self.commands.len() {
            return StepOutcome::Idle;
        }
        let index = self.cursor;
        self.commands[index].apply(graph);
        match self.settle(index) {
            StepOutcome::Applied => {
                self.cursor += 1;
                StepOutcome::Applied
            }
            other => other,
        }
    }

    /// Drops the command at `index` if it turned out obsolete.
    fn settle(&mut self, index: usize) -> StepOutcome {
        if !self.commands[index].is_obsolete() {
            return StepOutcome::Applied;
        }
        log::debug!(
            "dropping obsolete command '{}' from {}",
            self.commands[index].text(),
            self.name
        );
        self.remove_at(index);
        StepOutcome::Obsolete
    }

    fn remove_at(&mut self, index: usize) {
        self.commands.remove(index);
        if index < self.cursor {
            self.cursor -= 1;
        }
        if let Some(clean) = self.clean_index {
            if clean > index {
                self.clean_index = Some(clean - 1);
            }
        }
    }

    /// Drops every obsolete command, keeping the cursor on the same
    /// surviving boundary.
    pub fn prune_obsolete(&mut self) -> usize {
        let mut pruned = 0;
        let mut index = 0;
        while index < self.commands.len() {
            if self.commands[index].is_obsolete() {
                self.remove_at(index);
                pruned += 1;
            } else {
                index += 1;
            }
        }
        pruned
    }

    /// Discards every command without running any of them.
    pub fn clear(&mut self) {
        self.commands.clear();
        self.cursor = 0;
        self.clean_index = Some(0);
    }

    /// Marks the current cursor position as matching the saved document.
    pub fn set_clean(&mut self) {
        self.clean_index = Some(self.cursor);
    }

    pub fn is_clean(&self) -> bool {
        self.clean_index == Some(self.cursor)
    }

    /// Whether any command here can bring `entity` back.
    pub fn restores(&self, entity: EntityRef) -> bool {
        self.commands.iter().any(|cmd| cmd.restores(entity))
    }

    /// Forwards a destruction notice to every command.
    pub fn entity_destroyed(&mut self, entity: EntityRef) {
        for cmd in &mut self.commands {
            cmd.entity_destroyed(entity);
        }
    }
}

//! A set of history stacks with one active stack.

use crate::{
    ChangeCommand, EntityRef, HistoryStack, NoteGraph, PlotnotesError, Result, StackId,
    StepOutcome,
};

/// Registry of [`HistoryStack`]s routing new commands to the active one.
///
/// The active id, when set, always names a member of the group.
#[derive(Debug, Default)]
pub struct HistoryGroup {
    stacks: Vec<HistoryStack>,
    active: Option<StackId>,
}

impl HistoryGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a stack to the group. Does not activate it.
    pub fn add_stack(&mut self, stack: HistoryStack) -> StackId {
        let id = stack.id();
        self.stacks.push(stack);
        id
    }

    /// Removes a stack; clears the active id if it was the active one.
    pub fn remove_stack(&mut self, id: StackId) -> Option<HistoryStack> {
        let index = self.stacks.iter().position(|stack| stack.id() == id)?;
        if self.active == Some(id) {
            log::debug!("active history stack removed");
            self.active = None;
        }
        Some(self.stacks.remove(index))
    }

    /// Makes `id` the active stack, or deactivates all stacks with `None`.
    ///
    /// # Errors
    ///
    /// Returns [`PlotnotesError::StackNotFound`] if `id` is not in the group;
    /// the active stack is left unchanged.
    pub fn set_active(&mut self, id: Option<StackId>) -> Result<()> {
        if let Some(id) = id {
            if self.stack(id).is_none() {
                return Err(PlotnotesError::StackNotFound(id.to_string()));
            }
        }
        if self.active != id {
            log::debug!("active history stack: {id:?}");
        }
        self.active = id;
        Ok(())
    }

    pub fn active_id(&self) -> Option<StackId> {
        self.active
    }

    /// The currently active stack. `None` means edits are not recorded.
    pub fn active(&self) -> Option<&HistoryStack> {
        let id = self.active?;
        self.stack(id)
    }

    pub fn active_mut(&mut self) -> Option<&mut HistoryStack> {
        let id = self.active?;
        self.stack_mut(id)
    }

    pub fn stack(&self, id: StackId) -> Option<&HistoryStack> {
        self.stacks.iter().find(|stack| stack.id() == id)
    }

    pub fn stack_mut(&mut self, id: StackId) -> Option<&mut HistoryStack> {
        self.stacks.iter_mut().find(|stack| stack.id() == id)
    }

    pub fn stacks(&self) -> &[HistoryStack] {
        &self.stacks
    }

    /// Pushes onto the active stack. Returns `false` (and drops the command)
    /// when no stack is active.
    pub fn push(&mut self, command: Box<dyn ChangeCommand>) -> bool {
        match self.active_mut() {
            Some(stack) => {
                stack.push(command);
                true
            }
            None => false,
        }
    }

    pub fn undo(&mut self, graph: &mut NoteGraph) -> StepOutcome {
        self.active_mut()
            .map_or(StepOutcome::Idle, |stack| stack.undo(graph))
    }

    pub fn redo(&mut self, graph: &mut NoteGraph) -> StepOutcome {
        self.active_mut()
            .map_or(StepOutcome::Idle, |stack| stack.redo(graph))
    }

    pub fn can_undo(&self) -> bool {
        self.active().is_some_and(HistoryStack::can_undo)
    }

    pub fn can_redo(&self) -> bool {
        self.active().is_some_and(HistoryStack::can_redo)
    }

    pub fn undo_text(&self) -> String {
        self.active().map(HistoryStack::undo_text).unwrap_or_default()
    }

    pub fn redo_text(&self) -> String {
        self.active().map(HistoryStack::redo_text).unwrap_or_default()
    }

    /// Whether a command in any stack can bring `entity` back.
    pub fn restores(&self, entity: EntityRef) -> bool {
        self.stacks.iter().any(|stack| stack.restores(entity))
    }

    /// Forwards a destruction notice to every stack, active or not.
    pub fn entity_destroyed(&mut self, entity: EntityRef) {
        for stack in &mut self.stacks {
            stack.entity_destroyed(entity);
        }
    }
}

//! Scoped marker naming the note whose removal is in progress.
//!
//! Removing a note through a history command runs the same low-level path a
//! user-initiated removal does. The removal routine consults this marker so
//! a removal driven by a command is never recorded as a second command.
//!
//! The marker is shared (cheap [`Clone`]) between the graph and whoever
//! drives a removal; a [`RemovalScope`] sets it and restores the previous
//! value when dropped, on every exit path.

use crate::NoteId;
use std::cell::Cell;
use std::rc::Rc;

#[derive(Debug, Clone, Default)]
pub struct RemovalMarker {
    current: Rc<Cell<Option<NoteId>>>,
}

impl RemovalMarker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The note currently being removed, if any.
    pub fn current(&self) -> Option<NoteId> {
        self.current.get()
    }

    pub fn is_removing(&self, note: NoteId) -> bool {
        self.current.get() == Some(note)
    }

    /// Marks `note` as being removed until the returned scope is dropped.
    #[must_use = "the marker is cleared as soon as the scope is dropped"]
    pub fn scope(&self, note: NoteId) -> RemovalScope {
        let previous = self.current.replace(Some(note));
        RemovalScope {
            current: Rc::clone(&self.current),
            previous,
        }
    }
}

/// Guard returned by [`RemovalMarker::scope`].
#[derive(Debug)]
pub struct RemovalScope {
    current: Rc<Cell<Option<NoteId>>>,
    previous: Option<NoteId>,
}

impl Drop for RemovalScope {
    fn drop(&mut self) {
        self.current.set(self.previous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_sets_and_clears_marker() {
        let marker = RemovalMarker::new();
        let note = NoteId::new();
        {
            let _scope = marker.scope(note);
            assert!(marker.is_removing(note));
            assert!(!marker.is_removing(NoteId::new()));
        }
        assert_eq!(marker.current(), None);
    }

    #[test]
    fn test_clones_share_state() {
        let marker = RemovalMarker::new();
        let observer = marker.clone();
        let note = NoteId::new();
        let scope = marker.scope(note);
        assert!(observer.is_removing(note));
        drop(scope);
        assert!(!observer.is_removing(note));
    }

    #[test]
    fn test_nested_scopes_restore_outer_note() {
        let marker = RemovalMarker::new();
        let outer = NoteId::new();
        let inner = NoteId::new();
        let _outer_scope = marker.scope(outer);
        {
            let _inner_scope = marker.scope(inner);
            assert_eq!(marker.current(), Some(inner));
        }
        assert_eq!(marker.current(), Some(outer));
    }

    #[test]
    fn test_marker_cleared_on_early_return() {
        fn remove(marker: &RemovalMarker, note: NoteId, bail: bool) -> Option<()> {
            let _scope = marker.scope(note);
            if bail {
                return None;
            }
            Some(())
        }

        let marker = RemovalMarker::new();
        assert!(remove(&marker, NoteId::new(), true).is_none());
        assert_eq!(marker.current(), None);
    }
}

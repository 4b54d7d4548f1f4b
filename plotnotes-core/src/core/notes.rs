use crate::{CollectionId, Color, NoteId, OwnerId, OwnerKind};

/// An ordered list of notes owned by at most one story element.
///
/// The owner kind is copied from the owner when the collection is built and
/// never changes. For [`OwnerKind::Scene`] and [`OwnerKind::Character`] the
/// color mirrors the owner's color; otherwise it is purely local.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteCollection {
    pub(crate) id: CollectionId,
    pub(crate) owner: Option<OwnerId>,
    pub(crate) owner_kind: OwnerKind,
    pub(crate) color: Color,
    pub(crate) notes: Vec<NoteId>,
}

impl NoteCollection {
    pub(crate) fn new(owner: Option<(OwnerId, OwnerKind)>, color: Color) -> Self {
        let (owner, owner_kind) = match owner {
            Some((id, kind)) => (Some(id), kind),
            None => (None, OwnerKind::Other),
        };
        Self {
            id: CollectionId::new(),
            owner,
            owner_kind,
            color,
            notes: Vec::new(),
        }
    }

    pub fn id(&self) -> CollectionId {
        self.id
    }

    pub fn owner(&self) -> Option<OwnerId> {
        self.owner
    }

    pub fn owner_kind(&self) -> OwnerKind {
        self.owner_kind
    }

    /// The owner, but only when it is of the given kind.
    pub fn owner_of_kind(&self, kind: OwnerKind) -> Option<OwnerId> {
        self.owner.filter(|_| self.owner_kind == kind)
    }

    pub fn scene(&self) -> Option<OwnerId> {
        self.owner_of_kind(OwnerKind::Scene)
    }

    pub fn character(&self) -> Option<OwnerId> {
        self.owner_of_kind(OwnerKind::Character)
    }

    pub fn structure(&self) -> Option<OwnerId> {
        self.owner_of_kind(OwnerKind::Structure)
    }

    pub fn relationship(&self) -> Option<OwnerId> {
        self.owner_of_kind(OwnerKind::Relationship)
    }

    pub fn break_element(&self) -> Option<OwnerId> {
        self.owner_of_kind(OwnerKind::Break)
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Note ids in collection order.
    pub fn note_ids(&self) -> &[NoteId] {
        &self.notes
    }

    pub fn note_count(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn note_at(&self, index: usize) -> Option<NoteId> {
        self.notes.get(index).copied()
    }

    pub fn first_note(&self) -> Option<NoteId> {
        self.notes.first().copied()
    }

    pub fn last_note(&self) -> Option<NoteId> {
        self.notes.last().copied()
    }

    pub fn index_of(&self, note: NoteId) -> Option<usize> {
        self.notes.iter().position(|id| *id == note)
    }

    pub fn contains(&self, note: NoteId) -> bool {
        self.notes.contains(&note)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parentless_collection_is_other() {
        let notes = NoteCollection::new(None, Color::WHITE);
        assert_eq!(notes.owner_kind(), OwnerKind::Other);
        assert!(notes.owner().is_none());
        assert!(notes.is_empty());
        assert_eq!(notes.first_note(), None);
    }

    #[test]
    fn test_owner_accessors_match_kind() {
        let scene = OwnerId::new();
        let notes = NoteCollection::new(Some((scene, OwnerKind::Scene)), Color::BLACK);
        assert_eq!(notes.scene(), Some(scene));
        assert_eq!(notes.character(), None);
        assert_eq!(notes.color(), Color::BLACK);
    }
}

//! Named, typed properties addressable on any document entity.

use crate::{CollectionId, Color, NoteId, OwnerId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A mutable property exposed by notes, note collections or story elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Property {
    Title,
    /// Derived display text. Never stored and never individually undoable.
    Summary,
    Content,
    Color,
    FormData,
}

impl Property {
    /// Record key used by the serializer.
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Summary => "summary",
            Self::Content => "content",
            Self::Color => "color",
            Self::FormData => "formData",
        }
    }

    /// Whether the property can ever produce a history command.
    #[must_use]
    pub fn is_undoable(&self) -> bool {
        !matches!(self, Self::Summary)
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A property value captured by a history command or passed to a setter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum PropertyValue {
    Text(String),
    Color(Color),
    Json(Value),
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Color> for PropertyValue {
    fn from(value: Color) -> Self {
        Self::Color(value)
    }
}

impl From<Value> for PropertyValue {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

/// A reference to any document entity: the target of a property write or
/// the subject of a destruction notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityRef {
    Note(NoteId),
    Collection(CollectionId),
    Owner(OwnerId),
}

impl EntityRef {
    /// Noun used in history labels.
    #[must_use]
    pub fn noun(&self) -> &'static str {
        match self {
            Self::Note(_) => "note",
            Self::Collection(_) => "notes",
            Self::Owner(_) => "element",
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Note(id) => write!(f, "note {id}"),
            Self::Collection(id) => write!(f, "notes {id}"),
            Self::Owner(id) => write!(f, "owner {id}"),
        }
    }
}

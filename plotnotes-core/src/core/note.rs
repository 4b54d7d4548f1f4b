use crate::{CollectionId, Color, NoteId, Property, PropertyValue};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Discriminant of a note. Fixed when the note is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NoteType {
    #[default]
    Text,
    Form,
}

/// An annotation attached to a story element through its [`NoteCollection`](crate::NoteCollection).
///
/// Fields are read-only from outside the crate; mutation goes through
/// [`Document`](crate::Document) so history and notifications stay consistent.
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub(crate) id: NoteId,
    pub(crate) collection: CollectionId,
    pub(crate) note_type: NoteType,
    pub(crate) title: String,
    pub(crate) summary: String,
    pub(crate) content: Value,
    pub(crate) color: Color,
    pub(crate) form_id: String,
    pub(crate) form_data: Map<String, Value>,
}

impl Note {
    pub(crate) fn new(collection: CollectionId, note_type: NoteType) -> Self {
        Self {
            id: NoteId::new(),
            collection,
            note_type,
            title: String::new(),
            summary: String::new(),
            content: Value::Null,
            color: Color::WHITE,
            form_id: String::new(),
            form_data: Map::new(),
        }
    }

    pub fn id(&self) -> NoteId {
        self.id
    }

    /// The collection this note currently belongs to.
    pub fn collection(&self) -> CollectionId {
        self.collection
    }

    pub fn note_type(&self) -> NoteType {
        self.note_type
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn content(&self) -> &Value {
        &self.content
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn form_id(&self) -> &str {
        &self.form_id
    }

    pub fn form_data(&self) -> &Map<String, Value> {
        &self.form_data
    }

    /// Returns one entry of the form data, or `Value::Null` when unset.
    pub fn form_value(&self, key: &str) -> Value {
        self.form_data.get(key).cloned().unwrap_or(Value::Null)
    }

    /// Reads a property as a [`PropertyValue`].
    pub fn property(&self, property: Property) -> PropertyValue {
        match property {
            Property::Title => PropertyValue::Text(self.title.clone()),
            Property::Summary => PropertyValue::Text(self.summary.clone()),
            Property::Content => PropertyValue::Json(self.content.clone()),
            Property::Color => PropertyValue::Color(self.color),
            Property::FormData => PropertyValue::Json(Value::Object(self.form_data.clone())),
        }
    }

    /// Writes a property. Returns `true` only when the stored value changed.
    ///
    /// Writing the current value is a no-op; a value of the wrong shape for
    /// the property is ignored.
    pub(crate) fn set_property(&mut self, property: Property, value: PropertyValue) -> bool {
        match (property, value) {
            (Property::Title, PropertyValue::Text(v)) => replace_if_changed(&mut self.title, v),
            (Property::Summary, PropertyValue::Text(v)) => {
                replace_if_changed(&mut self.summary, v)
            }
            (Property::Content, PropertyValue::Json(v)) => {
                replace_if_changed(&mut self.content, v)
            }
            (Property::Color, PropertyValue::Color(v)) => replace_if_changed(&mut self.color, v),
            (Property::FormData, PropertyValue::Json(Value::Object(v))) => {
                replace_if_changed(&mut self.form_data, v)
            }
            (property, value) => {
                log::warn!("ignoring {value:?} written to note property {property}");
                false
            }
        }
    }
}

pub(crate) fn replace_if_changed<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_note() {
        let note = Note::new(CollectionId::new(), NoteType::Text);

        assert_eq!(note.title(), "");
        assert_eq!(note.note_type(), NoteType::Text);
        assert_eq!(note.color(), Color::WHITE);
        assert!(note.content().is_null());
    }

    #[test]
    fn test_set_property_reports_change_once() {
        let mut note = Note::new(CollectionId::new(), NoteType::Text);
        assert!(note.set_property(Property::Title, "Act I".into()));
        assert!(!note.set_property(Property::Title, "Act I".into()));
        assert_eq!(note.title(), "Act I");
    }

    #[test]
    fn test_set_property_ignores_mismatched_value() {
        let mut note = Note::new(CollectionId::new(), NoteType::Text);
        assert!(!note.set_property(Property::Color, "red".into()));
        assert!(!note.set_property(Property::FormData, json!([1, 2]).into()));
        assert_eq!(note.color(), Color::WHITE);
    }

    #[test]
    fn test_form_value_defaults_to_null() {
        let mut note = Note::new(CollectionId::new(), NoteType::Form);
        assert!(note.form_value("mood").is_null());
        note.set_property(Property::FormData, json!({"mood": "tense"}).into());
        assert_eq!(note.form_value("mood"), json!("tense"));
    }
}

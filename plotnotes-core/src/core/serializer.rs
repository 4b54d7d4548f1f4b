//! Conversion between notes and their JSON records.
//!
//! A note serializes to a flat object of its stored properties. A collection
//! serializes to an object whose reserved `#data` key holds the array of note
//! records. Reading is tolerant: unknown keys are ignored, missing keys keep
//! the note's default, and a record with a wrongly-typed value is rejected
//! whole so no half-read note ever reaches the graph.
//!
//! Documents written by older releases stored notes as a flat array of
//! `{color, heading, content}` objects; [`legacy_notes`] upgrades those.

use crate::{CollectionId, Color, Note, NoteGraph, NoteType, PlotnotesError, Property, Result};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// A serialized entity: a flat JSON object.
pub type Record = Map<String, Value>;

/// Reserved collection-level key holding the array of note records.
pub const DATA_KEY: &str = "#data";

const TYPE_KEY: &str = "type";
const FORM_ID_KEY: &str = "formId";

/// Stored note properties, in record order.
const STORED_PROPERTIES: [Property; 4] = [
    Property::Title,
    Property::Content,
    Property::Color,
    Property::FormData,
];

/// Whether `property` is written for this particular note.
///
/// Form data only means something for form notes, so text notes omit it.
fn can_serialize(note: &Note, property: Property) -> bool {
    match property {
        Property::Summary => false,
        Property::FormData => note.note_type() == NoteType::Form,
        _ => true,
    }
}

/// Serializes a note's stored properties.
pub fn note_to_record(note: &Note) -> Record {
    let mut record = Record::new();
    record.insert(TYPE_KEY.to_string(), note_type_value(note.note_type()));
    record.insert(FORM_ID_KEY.to_string(), Value::String(note.form_id().to_string()));
    for property in STORED_PROPERTIES {
        if !can_serialize(note, property) {
            continue;
        }
        let value = match property {
            Property::Title => Value::String(note.title().to_string()),
            Property::Content => note.content().clone(),
            Property::Color => Value::String(note.color().name()),
            Property::FormData => Value::Object(note.form_data().clone()),
            Property::Summary => continue,
        };
        record.insert(property.key().to_string(), value);
    }
    record
}

fn note_type_value(note_type: NoteType) -> Value {
    match note_type {
        NoteType::Text => Value::String("text".to_string()),
        NoteType::Form => Value::String("form".to_string()),
    }
}

fn parse_note_type(value: &Value) -> Result<NoteType> {
    match value {
        Value::String(s) if s == "text" => Ok(NoteType::Text),
        Value::String(s) if s == "form" => Ok(NoteType::Form),
        // Older documents stored the enum ordinal.
        Value::Number(n) if n.as_u64() == Some(0) => Ok(NoteType::Text),
        Value::Number(n) if n.as_u64() == Some(1) => Ok(NoteType::Form),
        other => Err(PlotnotesError::InvalidRecord(format!(
            "unknown note type {other}"
        ))),
    }
}

fn string_field(record: &Record, key: &str) -> Result<Option<String>> {
    match record.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(PlotnotesError::InvalidRecord(format!(
            "`{key}` must be a string, got {other}"
        ))),
    }
}

/// Reads a record into `note`.
///
/// Every field is validated before anything is written, so on error `note`
/// is left untouched.
///
/// # Errors
///
/// Returns [`PlotnotesError::InvalidRecord`] or [`PlotnotesError::InvalidColor`]
/// when a known key holds a value of the wrong shape.
pub fn apply_record(record: &Record, note: &mut Note) -> Result<()> {
    let note_type = record.get(TYPE_KEY).map(parse_note_type).transpose()?;
    let title = string_field(record, Property::Title.key())?;
    let form_id = string_field(record, FORM_ID_KEY)?;
    let color = string_field(record, Property::Color.key())?
        .map(|s| s.parse::<Color>())
        .transpose()?;
    let form_data = match record.get(Property::FormData.key()) {
        None | Some(Value::Null) => None,
        Some(Value::Object(map)) => Some(map.clone()),
        Some(other) => {
            return Err(PlotnotesError::InvalidRecord(format!(
                "`formData` must be an object, got {other}"
            )))
        }
    };
    let content = record.get(Property::Content.key()).cloned();

    if let Some(note_type) = note_type {
        note.note_type = note_type;
    }
    if let Some(title) = title {
        note.title = title;
    }
    if let Some(form_id) = form_id {
        note.form_id = form_id;
    }
    if let Some(color) = color {
        note.color = color;
    }
    if let Some(form_data) = form_data {
        note.form_data = form_data;
    }
    if let Some(content) = content {
        note.content = content;
    }
    Ok(())
}

/// Builds a fresh note (new identity) from a record.
///
/// # Errors
///
/// See [`apply_record`].
pub fn note_from_record(record: &Record, collection: CollectionId) -> Result<Note> {
    let mut note = Note::new(collection, NoteType::Text);
    apply_record(record, &mut note)?;
    Ok(note)
}

/// Serializes a collection: its color plus `#data`, omitted when empty.
pub fn collection_to_record(graph: &NoteGraph, id: CollectionId) -> Option<Record> {
    let notes = graph.collection(id)?;
    let mut record = Record::new();
    record.insert(
        Property::Color.key().to_string(),
        Value::String(notes.color().name()),
    );
    let data: Vec<Value> = notes
        .note_ids()
        .iter()
        .filter_map(|note| graph.note(*note))
        .map(|note| Value::Object(note_to_record(note)))
        .collect();
    if !data.is_empty() {
        record.insert(DATA_KEY.to_string(), Value::Array(data));
    }
    Some(record)
}

/// Drops records structurally equal to an earlier one, keeping first
/// occurrences in their original order.
pub fn unique_records(values: &[Value]) -> Vec<&Value> {
    let mut seen = HashSet::new();
    values
        .iter()
        // serde_json maps are key-sorted, so the compact text is canonical.
        .filter(|value| seen.insert(value.to_string()))
        .collect()
}

/// Materializes notes from a `#data` array.
///
/// Duplicate records yield a single note. Records that are not objects or
/// fail to read are dropped and logged.
pub fn notes_from_records(values: &[Value], collection: CollectionId) -> Vec<Note> {
    unique_records(values)
        .into_iter()
        .filter_map(|value| {
            let Value::Object(record) = value else {
                log::warn!("dropping non-object note record {value}");
                return None;
            };
            match note_from_record(record, collection) {
                Ok(note) => Some(note),
                Err(e) => {
                    log::warn!("dropping malformed note record: {e}");
                    None
                }
            }
        })
        .collect()
}

/// Upgrades one legacy `{color, heading, content}` entry to a text note.
///
/// Only color, title and content are taken; anything else is ignored. An
/// unreadable color falls back to white.
pub fn legacy_note(value: &Value, collection: CollectionId) -> Note {
    let mut note = Note::new(collection, NoteType::Text);
    let color = value.get("color").and_then(Value::as_str).unwrap_or_default();
    note.color = color.parse().unwrap_or_else(|_| {
        log::debug!("legacy note color {color:?} unreadable, using white");
        Color::WHITE
    });
    note.title = value
        .get("heading")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    note.content = value.get("content").cloned().unwrap_or(Value::Null);
    note
}

/// Upgrades a legacy flat note array.
pub fn legacy_notes(values: &[Value], collection: CollectionId) -> Vec<Note> {
    values.iter().map(|value| legacy_note(value, collection)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_text_note_omits_form_data() {
        let mut note = Note::new(CollectionId::new(), NoteType::Text);
        note.title = "Opening".to_string();
        note.form_data.insert("beat".to_string(), json!(1));

        let rec = note_to_record(&note);
        assert_eq!(rec["type"], json!("text"));
        assert_eq!(rec["title"], json!("Opening"));
        assert_eq!(rec["color"], json!("#ffffff"));
        assert!(!rec.contains_key("formData"));
        assert!(!rec.contains_key("summary"));
    }

    #[test]
    fn test_form_note_keeps_form_data() {
        let mut note = Note::new(CollectionId::new(), NoteType::Form);
        note.form_id = "scene-beats".to_string();
        note.form_data.insert("beat".to_string(), json!(1));

        let rec = note_to_record(&note);
        assert_eq!(rec["formId"], json!("scene-beats"));
        assert_eq!(rec["formData"], json!({"beat": 1}));
    }

    #[test]
    fn test_apply_record_ignores_unknown_and_defaults_missing() {
        let rec = record(json!({"title": "Twist", "attachments": [], "future": true}));
        let note = note_from_record(&rec, CollectionId::new()).unwrap();
        assert_eq!(note.title(), "Twist");
        assert_eq!(note.note_type(), NoteType::Text);
        assert_eq!(note.color(), Color::WHITE);
        assert!(note.content().is_null());
    }

    #[test]
    fn test_apply_record_is_all_or_nothing() {
        let mut note = Note::new(CollectionId::new(), NoteType::Text);
        note.title = "Keep".to_string();
        let rec = record(json!({"title": "Replace", "color": "not-a-color"}));

        assert!(apply_record(&rec, &mut note).is_err());
        assert_eq!(note.title(), "Keep");
    }

    #[test]
    fn test_apply_record_rejects_wrong_types() {
        let collection = CollectionId::new();
        assert!(note_from_record(&record(json!({"title": 7})), collection).is_err());
        assert!(note_from_record(&record(json!({"type": "sketch"})), collection).is_err());
        assert!(note_from_record(&record(json!({"formData": "x"})), collection).is_err());
    }

    #[test]
    fn test_numeric_note_type_accepted() {
        let rec = record(json!({"type": 1}));
        let note = note_from_record(&rec, CollectionId::new()).unwrap();
        assert_eq!(note.note_type(), NoteType::Form);
    }

    #[test]
    fn test_duplicate_records_collapse_in_order() {
        let values = vec![
            json!({"title": "A"}),
            json!({"title": "B"}),
            json!({"title": "A"}),
            json!({"title": "C"}),
        ];
        let notes = notes_from_records(&values, CollectionId::new());
        let titles: Vec<&str> = notes.iter().map(Note::title).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_malformed_records_are_dropped() {
        let values = vec![json!("stray"), json!({"title": 3}), json!({"title": "ok"})];
        let notes = notes_from_records(&values, CollectionId::new());
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].title(), "ok");
    }

    #[test]
    fn test_legacy_note_upgrade() {
        let legacy = json!({
            "color": "#ff0000",
            "heading": "Old heading",
            "content": "Old body",
            "author": "ignored"
        });
        let note = legacy_note(&legacy, CollectionId::new());
        assert_eq!(note.note_type(), NoteType::Text);
        assert_eq!(note.title(), "Old heading");
        assert_eq!(note.content(), &json!("Old body"));
        assert_eq!(note.color(), Color::rgb(0xff, 0, 0));
        assert!(note.form_data().is_empty());
        assert_eq!(note.form_id(), "");
    }
}

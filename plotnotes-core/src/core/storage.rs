//! SQLite-backed store for serialized Plotnotes documents.

use crate::{Document, DocumentRecord, HistorySettings, PlotnotesError, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use uuid::Uuid;

/// Highest `store_meta.format_version` this build can read.
pub const STORE_FORMAT_VERSION: u32 = 1;

/// One row of [`Storage::list_documents`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    pub id: String,
    pub title: String,
    /// Unix timestamp (seconds) of the last save.
    pub saved_at: i64,
}

pub struct Storage {
    conn: Connection,
}

impl Storage {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(Self { conn })
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;

        // Validate database structure
        let table_count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master
             WHERE type='table'
             AND name IN ('documents', 'store_meta')",
            [],
            |row| row.get(0),
        )?;

        if table_count != 2 {
            return Err(PlotnotesError::InvalidDocument(
                "Not a valid Plotnotes database".to_string(),
            ));
        }

        let version: Option<String> = conn
            .query_row(
                "SELECT value FROM store_meta WHERE key = 'format_version'",
                [],
                |row| row.get(0),
            )
            .optional()?;
        match version.as_deref().map(str::parse::<u32>) {
            Some(Ok(version)) if version <= STORE_FORMAT_VERSION => {}
            Some(Ok(version)) => {
                return Err(PlotnotesError::InvalidDocument(format!(
                    "store format version {version} is newer than {STORE_FORMAT_VERSION}"
                )))
            }
            _ => {
                return Err(PlotnotesError::InvalidDocument(
                    "Missing or unreadable store format version".to_string(),
                ))
            }
        }

        Ok(Self { conn })
    }

    #[cfg(test)]
    fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Stores `document` under a fresh id and returns that id.
    ///
    /// Only the document's content is stored; edit history is not.
    ///
    /// # Errors
    ///
    /// Returns [`PlotnotesError::Database`] for any SQLite failure.
    pub fn save_document(&self, title: &str, document: &Document) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let body = serde_json::to_string(&document.to_record())?;
        self.conn.execute(
            "INSERT INTO documents (id, title, body_json, saved_at) VALUES (?, ?, ?, ?)",
            params![id, title, body, chrono::Utc::now().timestamp()],
        )?;
        log::info!("saved document {id} ({title})");
        Ok(id)
    }

    /// Overwrites a previously saved document.
    ///
    /// # Errors
    ///
    /// Returns [`PlotnotesError::DocumentNotFound`] if no row has `id`.
    pub fn update_document(&self, id: &str, title: &str, document: &Document) -> Result<()> {
        let body = serde_json::to_string(&document.to_record())?;
        let changed = self.conn.execute(
            "UPDATE documents SET title = ?, body_json = ?, saved_at = ? WHERE id = ?",
            params![title, body, chrono::Utc::now().timestamp(), id],
        )?;
        if changed == 0 {
            return Err(PlotnotesError::DocumentNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Loads a document with empty history.
    ///
    /// # Errors
    ///
    /// Returns [`PlotnotesError::DocumentNotFound`] if no row has `id`,
    /// [`PlotnotesError::Json`] if the stored body is unreadable, or whatever
    /// [`Document::from_record`] rejects.
    pub fn load_document(&self, id: &str, settings: HistorySettings) -> Result<Document> {
        let body: Option<String> = self
            .conn
            .query_row(
                "SELECT body_json FROM documents WHERE id = ?",
                [id],
                |row| row.get(0),
            )
            .optional()?;
        let body = body.ok_or_else(|| PlotnotesError::DocumentNotFound(id.to_string()))?;
        let record: DocumentRecord = serde_json::from_str(&body)?;
        Document::from_record(&record, settings)
    }

    /// All stored documents, most recently saved first.
    pub fn list_documents(&self) -> Result<Vec<StoredDocument>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, saved_at FROM documents ORDER BY saved_at DESC, title ASC",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(StoredDocument {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    saved_at: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// # Errors
    ///
    /// Returns [`PlotnotesError::DocumentNotFound`] if no row has `id`.
    pub fn delete_document(&self, id: &str) -> Result<()> {
        let changed = self
            .conn
            .execute("DELETE FROM documents WHERE id = ?", [id])?;
        if changed == 0 {
            return Err(PlotnotesError::DocumentNotFound(id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, OwnerKind};
    use tempfile::NamedTempFile;

    fn sample() -> Document {
        let mut doc = Document::new();
        let scene = doc.create_owner(OwnerKind::Scene, Color::BLACK);
        let notes = doc.owner(scene).unwrap().notes();
        let note = doc.add_text_note(notes).unwrap();
        doc.set_note_title(note, "Storm").unwrap();
        doc
    }

    #[test]
    fn test_create_storage() {
        let temp = NamedTempFile::new().unwrap();
        let storage = Storage::create(temp.path()).unwrap();

        let tables: Vec<String> = storage
            .connection()
            .prepare("SELECT name FROM sqlite_master WHERE type='table'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<_, _>>()
            .unwrap();

        assert!(tables.contains(&"documents".to_string()));
        assert!(tables.contains(&"store_meta".to_string()));
    }

    #[test]
    fn test_open_existing_storage() {
        let temp = NamedTempFile::new().unwrap();
        Storage::create(temp.path()).unwrap();
        assert!(Storage::open(temp.path()).is_ok());
    }

    #[test]
    fn test_open_invalid_database() {
        let temp = NamedTempFile::new().unwrap();

        // Create empty file (not a valid Plotnotes DB)
        std::fs::write(temp.path(), "not a database").unwrap();

        let result = Storage::open(temp.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_open_foreign_database() {
        let temp = NamedTempFile::new().unwrap();
        {
            let conn = Connection::open(temp.path()).unwrap();
            conn.execute("CREATE TABLE notes (id TEXT PRIMARY KEY)", [])
                .unwrap();
        }
        assert!(matches!(
            Storage::open(temp.path()),
            Err(PlotnotesError::InvalidDocument(_))
        ));
    }

    #[test]
    fn test_open_rejects_newer_format_version() {
        let temp = NamedTempFile::new().unwrap();
        {
            let storage = Storage::create(temp.path()).unwrap();
            storage
                .connection()
                .execute(
                    "UPDATE store_meta SET value = ? WHERE key = 'format_version'",
                    [(STORE_FORMAT_VERSION + 1).to_string()],
                )
                .unwrap();
        }
        assert!(matches!(
            Storage::open(temp.path()),
            Err(PlotnotesError::InvalidDocument(_))
        ));
    }

    #[test]
    fn test_open_rejects_missing_format_version() {
        let temp = NamedTempFile::new().unwrap();
        {
            let storage = Storage::create(temp.path()).unwrap();
            storage
                .connection()
                .execute("DELETE FROM store_meta", [])
                .unwrap();
        }
        assert!(Storage::open(temp.path()).is_err());
    }

    #[test]
    fn test_save_and_load_document() {
        let temp = NamedTempFile::new().unwrap();
        let storage = Storage::create(temp.path()).unwrap();
        let doc = sample();

        let id = storage.save_document("Draft", &doc).unwrap();
        let loaded = storage
            .load_document(&id, HistorySettings::default())
            .unwrap();
        assert_eq!(loaded.to_record(), doc.to_record());

        let listed = storage.list_documents().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "Draft");
    }

    #[test]
    fn test_update_and_delete_document() {
        let temp = NamedTempFile::new().unwrap();
        let storage = Storage::create(temp.path()).unwrap();
        let id = storage.save_document("Draft", &Document::new()).unwrap();

        storage.update_document(&id, "Final", &sample()).unwrap();
        assert_eq!(storage.list_documents().unwrap()[0].title, "Final");
        let loaded = storage
            .load_document(&id, HistorySettings::default())
            .unwrap();
        assert_eq!(loaded.graph().note_count(), 1);

        storage.delete_document(&id).unwrap();
        assert!(matches!(
            storage.load_document(&id, HistorySettings::default()),
            Err(PlotnotesError::DocumentNotFound(_))
        ));
        assert!(storage.delete_document(&id).is_err());
        assert!(storage.update_document(&id, "x", &sample()).is_err());
    }
}

//! History settings persistence for Plotnotes.
//!
//! Stores undo preferences in a JSON file at an OS-appropriate location.

use crate::core::history::DEFAULT_UNDO_LIMIT;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Persisted undo/redo settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistorySettings {
    /// Maximum commands per history stack. Zero means unbounded.
    pub undo_limit: usize,
    /// Whether adding a note is itself undoable.
    pub record_insertions: bool,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            undo_limit: DEFAULT_UNDO_LIMIT,
            record_insertions: true,
        }
    }
}

/// Returns the path to the settings JSON file.
///
/// - macOS / Linux: `~/.config/plotnotes/history.json`
/// - Windows: `%APPDATA%/Plotnotes/history.json`
pub fn settings_file_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        base.join("Plotnotes").join("history.json")
    }
    #[cfg(not(target_os = "windows"))]
    {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config").join("plotnotes").join("history.json")
    }
}

/// Loads settings from `path`; returns defaults if the file is missing or corrupt.
pub fn load_settings(path: &Path) -> HistorySettings {
    match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            log::warn!("ignoring unreadable settings at {}: {e}", path.display());
            HistorySettings::default()
        }),
        Err(_) => HistorySettings::default(),
    }
}

/// Saves settings to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`crate::PlotnotesError::Io`] if the directory or file cannot be
/// written.
pub fn save_settings(path: &Path, settings: &HistorySettings) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)?;
    Ok(())
}

// photo-batch/src/history/mod.rs
//! Append-only log of export batches.
//!
//! The whole log is kept in memory, newest entry first, and the backing JSON
//! file is rewritten in full on every append. A missing or unreadable file at
//! startup yields an empty log rather than an error.

use crate::core::{Result, StudioError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DEFAULT_HISTORY_FILE: &str = "history.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(rename = "date")]
    pub timestamp: String,
    pub operation: String,
    pub count: usize,
    pub location: PathBuf,
}

#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    entries: Vec<HistoryEntry>,
}

impl HistoryStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match Self::read_entries(&path) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Starting with empty history: {}", e);
                Vec::new()
            }
        };

        log::debug!("Loaded {} history entries from {}", entries.len(), path.display());

        Self { path, entries }
    }

    fn read_entries(path: &Path) -> Result<Vec<HistoryEntry>> {
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| StudioError::History(format!("{}: {}", path.display(), e)))?;

        serde_json::from_str(&content)
            .map_err(|e| StudioError::History(format!("{}: {}", path.display(), e)))
    }

    /// Records a new entry stamped with the local time, puts it first and
    /// rewrites the file. The entry stays in memory even if the write fails.
    pub fn add_entry<P: AsRef<Path>>(&mut self, operation: &str, count: usize, location: P) -> Result<()> {
        let entry = HistoryEntry {
            timestamp: chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(),
            operation: operation.to_string(),
            count,
            location: location.as_ref().to_path_buf(),
        };

        log::info!(
            "History: {} ({} files) -> {}",
            entry.operation,
            entry.count,
            entry.location.display()
        );

        self.entries.insert(0, entry);
        self.save()
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        self.entries.serialize(&mut serializer)?;

        fs::write(&self.path, buffer)?;
        Ok(())
    }

    /// Entries, newest first.
    pub fn get_all(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

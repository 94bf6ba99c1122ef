//! Single-slot snapshot of the last successfully synced day.
//!
//! The snapshot carries no date tag: callers treat it as "today's last known
//! state". Every successful sync of the current day overwrites it in full.

use std::path::PathBuf;

use anyhow::Result;

use crate::models::LessonEntry;

const CACHE_FILE: &str = "timetable_cache.json";

/// File-backed snapshot store, the fallback source when the portal fails.
pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    /// Open the store at the default per-user cache location.
    pub fn open() -> Result<Self> {
        Ok(Self::open_at(super::cache_file(CACHE_FILE)?))
    }

    /// Open the store at a specific path.
    pub const fn open_at(path: PathBuf) -> Self {
        Self { path }
    }

    /// Overwrite the snapshot with a day's entries.
    pub fn save_snapshot(&self, entries: &[LessonEntry]) -> Result<()> {
        super::write_json(&self.path, &entries)
    }

    /// Last saved snapshot, or `None` when the file is missing or unreadable.
    pub fn snapshot(&self) -> Option<Vec<LessonEntry>> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        serde_json::from_str(&content).ok()
    }

    pub fn has_cache(&self) -> bool {
        self.path.exists()
    }
}

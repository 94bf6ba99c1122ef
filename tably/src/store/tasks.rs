//! Task annotations: free-text notes keyed by subject name.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;

const TASKS_FILE: &str = "tasks.json";

/// File-backed note store consulted by the display layer. Independent of the
/// sync pipeline.
pub struct TaskStore {
    path: PathBuf,
}

impl TaskStore {
    /// Open the store at the default per-user location.
    pub fn open() -> Result<Self> {
        Ok(Self::open_at(super::data_file(TASKS_FILE)?))
    }

    /// Open the store at a specific path.
    pub const fn open_at(path: PathBuf) -> Self {
        Self { path }
    }

    /// Save a note for a subject. A blank note removes the entry.
    pub fn save_task(&self, subject: &str, note: &str) -> Result<()> {
        let mut tasks = self.load();
        if note.trim().is_empty() {
            tasks.remove(subject);
        } else {
            tasks.insert(subject.to_string(), note.to_string());
        }
        super::write_json(&self.path, &tasks)
    }

    pub fn task(&self, subject: &str) -> Option<String> {
        self.load().remove(subject)
    }

    /// Whether a non-empty note exists, for list indicators.
    pub fn has_task(&self, subject: &str) -> bool {
        self.task(subject).is_some_and(|note| !note.is_empty())
    }

    fn load(&self) -> BTreeMap<String, String> {
        super::read_json(&self.path)
    }
}

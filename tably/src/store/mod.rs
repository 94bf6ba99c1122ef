//! JSON-file persistence stores.
//!
//! Every store is a single whole-value JSON file with last-write-wins
//! semantics. Missing or corrupt files read back as empty; no store ever
//! merges on write.

mod cache;
mod session;
mod settings;
mod tasks;

pub use cache::CacheStore;
pub use session::{is_placeholder_student_id, SessionStore};
pub use settings::SettingsStore;
pub use tasks::TaskStore;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

const APP_DIR: &str = "tably";

/// Resolve a file under the per-user data directory, creating the app
/// subdirectory if needed.
pub(crate) fn data_file(name: &str) -> Result<PathBuf> {
    let base = dirs::data_dir().context("Could not determine user data directory")?;
    app_file(base, name)
}

/// Resolve a file under the per-user cache directory.
pub(crate) fn cache_file(name: &str) -> Result<PathBuf> {
    let base = dirs::cache_dir().context("Could not determine user cache directory")?;
    app_file(base, name)
}

fn app_file(base: PathBuf, name: &str) -> Result<PathBuf> {
    let dir = base.join(APP_DIR);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    Ok(dir.join(name))
}

/// Read a JSON file, falling back to the default value when the file is
/// missing or unreadable.
pub(crate) fn read_json<T: DeserializeOwned + Default>(path: &Path) -> T {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|content| serde_json::from_str(&content).ok())
        .unwrap_or_default()
}

/// Write a value as pretty JSON, replacing the whole file.
pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize store")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write store: {}", path.display()))
}

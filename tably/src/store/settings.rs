//! App settings consulted by the sync pipeline.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Serialize, Deserialize)]
struct SettingsData {
    notifications_enabled: bool,
}

impl Default for SettingsData {
    fn default() -> Self {
        Self {
            notifications_enabled: true,
        }
    }
}

/// File-backed settings store.
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Open the store at the default per-user location.
    pub fn open() -> Result<Self> {
        Ok(Self::open_at(super::data_file(SETTINGS_FILE)?))
    }

    /// Open the store at a specific path.
    pub const fn open_at(path: PathBuf) -> Self {
        Self { path }
    }

    /// Whether pre-class reminders should be scheduled. Defaults to on.
    pub fn notifications_enabled(&self) -> bool {
        let data: SettingsData = super::read_json(&self.path);
        data.notifications_enabled
    }

    pub fn set_notifications_enabled(&self, enabled: bool) -> Result<()> {
        let mut data: SettingsData = super::read_json(&self.path);
        data.notifications_enabled = enabled;
        super::write_json(&self.path, &data)
    }
}

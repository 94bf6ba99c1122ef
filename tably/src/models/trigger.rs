//! Scheduled trigger model for reminders and display refreshes.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// What a trigger does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    /// Pre-class reminder notification.
    Reminder,
    /// Display/widget refresh at a class boundary.
    DisplayRefresh,
}

impl TriggerKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reminder => "reminder",
            Self::DisplayRefresh => "display_refresh",
        }
    }
}

impl std::fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identity of an installed trigger.
///
/// Installing a trigger with an identity that is already registered replaces
/// the earlier registration, so a re-sync never double-fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TriggerId {
    pub kind: TriggerKind,
    pub hour: u32,
    pub minute: u32,
}

impl TriggerId {
    /// Stable numeric request code for delivery backends that key
    /// registrations by integer. Refresh codes live in a 10000+ band so they
    /// never collide with reminder codes.
    #[allow(dead_code)]
    pub const fn request_code(self) -> u32 {
        let base = self.hour * 100 + self.minute;
        match self.kind {
            TriggerKind::Reminder => base,
            TriggerKind::DisplayRefresh => 10_000 + base,
        }
    }
}

/// A point-in-time trigger derived from a day's entries. Recomputed on every
/// successful sync, never persisted.
#[derive(Debug, Clone)]
pub struct Trigger {
    pub id: TriggerId,
    /// When the trigger fires, local wall-clock.
    pub fire_at: DateTime<Local>,
    /// Payload for the delivery collaborator to render.
    pub subject: String,
    pub room: String,
}

impl Trigger {
    /// Fire instant as epoch milliseconds, the unit delivery backends take.
    #[allow(dead_code)]
    pub fn fire_at_millis(&self) -> i64 {
        self.fire_at.timestamp_millis()
    }
}

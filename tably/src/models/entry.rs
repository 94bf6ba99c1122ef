//! Lesson entry model - one row of a day's timetable.

use serde::{Deserialize, Serialize};

/// Display subject carried by synthesized free periods.
pub const FREE_PERIOD_SUBJECT: &str = "No Lesson";

/// A normalized timetable entry for a single day.
///
/// Serialized camelCase - this is also the cached snapshot format on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonEntry {
    /// Human period label, numeric ("1") or a code ("RC", "L1").
    pub period: String,
    /// Start of the period, "HH:MM" local wall-clock.
    pub time_start: String,
    /// End of the period, "HH:MM" local wall-clock.
    pub time_end: String,
    pub subject: String,
    pub class_name: String,
    /// Teacher names joined with ", ".
    pub teacher: String,
    pub room: String,
    /// Hex color with leading '#', empty for free periods.
    pub bg_color: String,
    /// Hex color with leading '#', empty for free periods.
    pub border_color: String,
    /// The portal marked this period as in progress at fetch time.
    #[serde(default)]
    pub is_current: bool,
    /// Synthesized placeholder for an empty period.
    #[serde(default)]
    pub is_free: bool,
}

impl LessonEntry {
    /// Build a free-period placeholder carrying only the period's time bounds.
    pub fn free(period: &str, time_start: &str, time_end: &str, is_current: bool) -> Self {
        Self {
            period: period.to_string(),
            time_start: time_start.to_string(),
            time_end: time_end.to_string(),
            subject: FREE_PERIOD_SUBJECT.to_string(),
            class_name: String::new(),
            teacher: String::new(),
            room: String::new(),
            bg_color: String::new(),
            border_color: String::new(),
            is_current,
            is_free: true,
        }
    }
}

//! Typed view of the portal's multi-week timetable payload.
//!
//! The portal returns an array of week blocks, each holding a map from a
//! date key to that day's info. Every field defaults when absent so the
//! extractor works on plain values instead of scattered null checks.

use std::collections::BTreeMap;

use serde::Deserialize;

/// One calendar week's worth of day entries.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeekBlock {
    /// Date key ("YYYY-MM-DD") to day info. BTreeMap keeps days in
    /// chronological order since the keys sort lexicographically.
    #[serde(default)]
    pub dates: BTreeMap<String, DayInfo>,
}

/// A single day inside a week block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DayInfo {
    /// Match field, "YYYY-MM-DD".
    #[serde(default)]
    pub date_name: String,
    /// Ordered periods for this day. The portal names this field "period".
    #[serde(default, rename = "period")]
    pub periods: Vec<PeriodInfo>,
}

/// One timetable slot within a day.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PeriodInfo {
    /// Period label: numeric ("1") or an administrative code ("RC", "L1").
    #[serde(default)]
    pub name: String,
    /// "HH:MM" local wall-clock, may be empty for code-only slots.
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    /// The portal flagged this period as in progress at fetch time.
    #[serde(default)]
    pub is_now: bool,
    /// Zero lessons means the slot is empty (free or administrative).
    #[serde(default)]
    pub lessons: Vec<LessonInfo>,
}

/// A scheduled lesson inside a period.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LessonInfo {
    #[serde(default)]
    pub subject_name: String,
    #[serde(default)]
    pub lesson_class_name: String,
    #[serde(default)]
    pub teachers: Vec<String>,
    #[serde(default)]
    pub room_name: String,
    /// Hex color without the '#' prefix.
    pub class_background_colour: Option<String>,
    pub class_border_colour: Option<String>,
}

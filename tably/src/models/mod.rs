//! Data models for the timetable sync engine.

mod entry;
mod payload;
mod trigger;

pub use entry::{LessonEntry, FREE_PERIOD_SUBJECT};
pub use payload::{DayInfo, LessonInfo, PeriodInfo, WeekBlock};
pub use trigger::{Trigger, TriggerId, TriggerKind};

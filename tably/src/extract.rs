//! Date-scoped extraction of lesson entries from the week-block payload.
//!
//! Pure functions only: the portal client hands over its typed payload and a
//! target date, and gets back that day's entries in display order.

use chrono::NaiveDate;

use crate::models::{LessonEntry, PeriodInfo, WeekBlock};

/// Administrative period codes that never surface as free periods. These are
/// deployment-specific labels (roll call, recess, lunch halves) rather than a
/// universal rule.
const EXCLUDED_FREE_CODES: &[&str] = &["RC", "R1", "R2", "L1", "L2", "7", "8", "9"];

const DEFAULT_BG_COLOUR: &str = "FFFFFF";
const DEFAULT_BORDER_COLOUR: &str = "000000";

/// Extract the entries for a single day, sorted for display.
///
/// The first day whose `date_name` equals the target date wins; scanning
/// stops once that day's periods have been processed. Days are never merged
/// across week blocks. Returns an empty list when no day matches.
pub fn day_entries(weeks: &[WeekBlock], target: NaiveDate) -> Vec<LessonEntry> {
    let date_str = target.format("%Y-%m-%d").to_string();
    let mut entries = Vec::new();

    'scan: for week in weeks {
        for day in week.dates.values() {
            if day.date_name != date_str {
                continue;
            }
            for period in &day.periods {
                push_period(&mut entries, period);
            }
            break 'scan;
        }
    }

    entries.sort_by_key(sort_key);
    entries
}

/// Emit the entries for one period: one per lesson, or a synthesized free
/// entry for an empty period whose name is a real (non-administrative) slot.
fn push_period(entries: &mut Vec<LessonEntry>, period: &PeriodInfo) {
    if period.lessons.is_empty() {
        if !period.name.is_empty() && !EXCLUDED_FREE_CODES.contains(&period.name.as_str()) {
            entries.push(LessonEntry::free(
                &period.name,
                &period.start_time,
                &period.end_time,
                period.is_now,
            ));
        }
        return;
    }

    for lesson in &period.lessons {
        entries.push(LessonEntry {
            period: period.name.clone(),
            time_start: period.start_time.clone(),
            time_end: period.end_time.clone(),
            subject: lesson.subject_name.clone(),
            class_name: lesson.lesson_class_name.clone(),
            teacher: lesson.teachers.join(", "),
            room: lesson.room_name.clone(),
            bg_color: format!(
                "#{}",
                lesson
                    .class_background_colour
                    .as_deref()
                    .unwrap_or(DEFAULT_BG_COLOUR)
            ),
            border_color: format!(
                "#{}",
                lesson
                    .class_border_colour
                    .as_deref()
                    .unwrap_or(DEFAULT_BORDER_COLOUR)
            ),
            is_current: period.is_now,
            is_free: false,
        });
    }
}

/// Two-key sort rank.
///
/// Primary: minutes since midnight from `time_start`. Some period codes carry
/// no parseable time but still need a stable position, so unparseable starts
/// fall back to fixed ranks: period "7" before the whole day, "8" after it,
/// anything else last. Secondary tie-break: numeric labels rank at 10x their
/// value, "RC" at 25, everything else at 100.
fn sort_key(entry: &LessonEntry) -> (i32, i32) {
    let primary = parse_minutes(&entry.time_start).unwrap_or_else(|| match entry.period.as_str() {
        "7" => -20,
        "8" => 2000,
        _ => i32::MAX,
    });
    let secondary = entry
        .period
        .parse::<i32>()
        .map_or_else(|_| if entry.period == "RC" { 25 } else { 100 }, |n| n * 10);
    (primary, secondary)
}

/// Parse "HH:MM" (extra trailing components tolerated) into minutes since
/// midnight.
fn parse_minutes(time: &str) -> Option<i32> {
    let mut parts = time.trim().split(':');
    let hour: i32 = parts.next()?.parse().ok()?;
    let minute: i32 = parts.next()?.parse().ok()?;
    Some(hour * 60 + minute)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FREE_PERIOD_SUBJECT;

    fn payload(json: serde_json::Value) -> Vec<WeekBlock> {
        serde_json::from_value(json).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn extracts_only_the_matching_day() {
        let weeks = payload(serde_json::json!([
            {
                "dates": {
                    "2024-03-11": {
                        "date_name": "2024-03-11",
                        "period": [
                            {
                                "name": "1",
                                "start_time": "09:00",
                                "end_time": "10:00",
                                "lessons": [{
                                    "subject_name": "Maths",
                                    "lesson_class_name": "10MAT1",
                                    "teachers": ["Ms Chen", "Mr Park"],
                                    "room_name": "B12",
                                    "class_background_colour": "AABBCC",
                                    "class_border_colour": "112233"
                                }]
                            }
                        ]
                    },
                    "2024-03-12": {
                        "date_name": "2024-03-12",
                        "period": [
                            {
                                "name": "1",
                                "start_time": "09:00",
                                "end_time": "10:00",
                                "lessons": [{"subject_name": "Science"}]
                            }
                        ]
                    }
                }
            }
        ]));

        let entries = day_entries(&weeks, date("2024-03-11"));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].subject, "Maths");
        assert_eq!(entries[0].teacher, "Ms Chen, Mr Park");
        assert_eq!(entries[0].bg_color, "#AABBCC");
        assert_eq!(entries[0].border_color, "#112233");
    }

    #[test]
    fn missing_colours_get_defaults() {
        let weeks = payload(serde_json::json!([
            {
                "dates": {
                    "2024-03-11": {
                        "date_name": "2024-03-11",
                        "period": [
                            {
                                "name": "2",
                                "start_time": "10:00",
                                "end_time": "11:00",
                                "lessons": [{"subject_name": "English"}]
                            }
                        ]
                    }
                }
            }
        ]));

        let entries = day_entries(&weeks, date("2024-03-11"));
        assert_eq!(entries[0].bg_color, "#FFFFFF");
        assert_eq!(entries[0].border_color, "#000000");
    }

    #[test]
    fn empty_named_period_becomes_free_entry() {
        let weeks = payload(serde_json::json!([
            {
                "dates": {
                    "2024-03-11": {
                        "date_name": "2024-03-11",
                        "period": [
                            {"name": "Period A", "start_time": "11:00", "end_time": "12:00", "is_now": true}
                        ]
                    }
                }
            }
        ]));

        let entries = day_entries(&weeks, date("2024-03-11"));
        assert_eq!(entries.len(), 1);
        assert!(entries[0].is_free);
        assert!(entries[0].is_current);
        assert_eq!(entries[0].subject, FREE_PERIOD_SUBJECT);
        assert_eq!(entries[0].time_start, "11:00");
        assert_eq!(entries[0].time_end, "12:00");
        assert!(entries[0].teacher.is_empty());
        assert!(entries[0].room.is_empty());
    }

    #[test]
    fn excluded_codes_are_dropped_when_empty() {
        let weeks = payload(serde_json::json!([
            {
                "dates": {
                    "2024-03-11": {
                        "date_name": "2024-03-11",
                        "period": [
                            {"name": "7", "start_time": "08:00", "end_time": "08:30"},
                            {"name": "RC", "start_time": "08:55", "end_time": "09:00"},
                            {"name": "", "start_time": "12:00", "end_time": "12:30"}
                        ]
                    }
                }
            }
        ]));

        assert!(day_entries(&weeks, date("2024-03-11")).is_empty());
    }

    #[test]
    fn sorts_by_start_time() {
        let weeks = payload(serde_json::json!([
            {
                "dates": {
                    "2024-03-11": {
                        "date_name": "2024-03-11",
                        "period": [
                            {
                                "name": "8",
                                "start_time": "13:00",
                                "end_time": "14:00",
                                "lessons": [{"subject_name": "Music"}]
                            },
                            {
                                "name": "2",
                                "start_time": "09:00",
                                "end_time": "10:00",
                                "lessons": [{"subject_name": "History"}]
                            }
                        ]
                    }
                }
            }
        ]));

        let entries = day_entries(&weeks, date("2024-03-11"));
        assert_eq!(entries[0].period, "2");
        assert_eq!(entries[1].period, "8");
    }

    #[test]
    fn unparseable_times_use_fixed_period_ranks() {
        let weeks = payload(serde_json::json!([
            {
                "dates": {
                    "2024-03-11": {
                        "date_name": "2024-03-11",
                        "period": [
                            {
                                "name": "8",
                                "start_time": "",
                                "end_time": "",
                                "lessons": [{"subject_name": "After School Sport"}]
                            },
                            {
                                "name": "1",
                                "start_time": "09:00",
                                "end_time": "10:00",
                                "lessons": [{"subject_name": "Maths"}]
                            },
                            {
                                "name": "7",
                                "start_time": "",
                                "end_time": "",
                                "lessons": [{"subject_name": "Band Rehearsal"}]
                            }
                        ]
                    }
                }
            }
        ]));

        let entries = day_entries(&weeks, date("2024-03-11"));
        assert_eq!(entries[0].period, "7");
        assert_eq!(entries[1].period, "1");
        assert_eq!(entries[2].period, "8");
    }

    #[test]
    fn tiebreak_orders_rc_between_numeric_labels() {
        // Identical start times force the secondary key: 2 -> 20, RC -> 25,
        // "Sport" -> 100.
        let weeks = payload(serde_json::json!([
            {
                "dates": {
                    "2024-03-11": {
                        "date_name": "2024-03-11",
                        "period": [
                            {
                                "name": "Sport",
                                "start_time": "09:00",
                                "end_time": "10:00",
                                "lessons": [{"subject_name": "Sport"}]
                            },
                            {
                                "name": "RC",
                                "start_time": "09:00",
                                "end_time": "10:00",
                                "lessons": [{"subject_name": "Roll Call"}]
                            },
                            {
                                "name": "2",
                                "start_time": "09:00",
                                "end_time": "10:00",
                                "lessons": [{"subject_name": "History"}]
                            }
                        ]
                    }
                }
            }
        ]));

        let entries = day_entries(&weeks, date("2024-03-11"));
        let labels: Vec<&str> = entries.iter().map(|e| e.period.as_str()).collect();
        assert_eq!(labels, vec!["2", "RC", "Sport"]);
    }

    #[test]
    fn sort_is_idempotent() {
        let weeks = payload(serde_json::json!([
            {
                "dates": {
                    "2024-03-11": {
                        "date_name": "2024-03-11",
                        "period": [
                            {"name": "3", "start_time": "11:00", "end_time": "12:00",
                             "lessons": [{"subject_name": "Art"}]},
                            {"name": "1", "start_time": "09:00", "end_time": "10:00",
                             "lessons": [{"subject_name": "Maths"}]},
                            {"name": "2", "start_time": "10:00", "end_time": "11:00",
                             "lessons": [{"subject_name": "English"}]}
                        ]
                    }
                }
            }
        ]));

        let once = day_entries(&weeks, date("2024-03-11"));
        let mut twice = once.clone();
        twice.sort_by_key(sort_key);
        assert_eq!(once, twice);
    }

    #[test]
    fn first_matching_week_wins() {
        let weeks = payload(serde_json::json!([
            {
                "dates": {
                    "2024-03-11": {
                        "date_name": "2024-03-11",
                        "period": [
                            {"name": "1", "start_time": "09:00", "end_time": "10:00",
                             "lessons": [{"subject_name": "Maths"}]}
                        ]
                    }
                }
            },
            {
                "dates": {
                    "2024-03-11": {
                        "date_name": "2024-03-11",
                        "period": [
                            {"name": "1", "start_time": "09:00", "end_time": "10:00",
                             "lessons": [{"subject_name": "Duplicate Week"}]}
                        ]
                    }
                }
            }
        ]));

        let entries = day_entries(&weeks, date("2024-03-11"));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].subject, "Maths");
    }

    #[test]
    fn no_match_yields_empty_list() {
        let weeks = payload(serde_json::json!([
            {"dates": {"2024-03-11": {"date_name": "2024-03-11", "period": []}}}
        ]));
        assert!(day_entries(&weeks, date("2024-06-01")).is_empty());
    }
}

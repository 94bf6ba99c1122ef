//! Reminder and display-refresh trigger planning.
//!
//! The planner derives the day's trigger set from its entries; the
//! `TriggerSink` seam hands them to whatever delivers notifications. The
//! planner never talks to the OS and delivery failures never fail a batch.

use std::collections::HashSet;

use anyhow::Result;
use chrono::{DateTime, Duration, Local};

use crate::models::{LessonEntry, Trigger, TriggerId, TriggerKind};

/// Reminders fire this many minutes before class start.
pub const REMINDER_LEAD_MINUTES: i64 = 5;

/// Delivery collaborator: installs and cancels point-in-time triggers.
pub trait TriggerSink {
    /// Remove any previously installed trigger with this identity.
    fn cancel(&mut self, id: TriggerId);

    /// Install a trigger. Errors (missing OS permission and the like) abort
    /// only this trigger.
    fn install(&mut self, trigger: &Trigger) -> Result<()>;
}

/// Derive the trigger set for a day's entries.
///
/// Per non-free entry:
/// - a reminder at start minus the lead time; when `now` is already inside
///   the lead window the reminder fires immediately rather than being
///   dropped, and once the class has started no reminder is scheduled;
/// - display refreshes at start and end when those instants are still in the
///   future, deduplicated by `(hour, minute)` so a class ending exactly when
///   the next starts yields a single refresh.
pub fn plan_triggers(entries: &[LessonEntry], now: DateTime<Local>) -> Vec<Trigger> {
    let mut triggers = Vec::new();
    let mut refresh_seen: HashSet<(u32, u32)> = HashSet::new();

    for entry in entries {
        if entry.is_free {
            continue;
        }

        if let Some((hour, minute)) = parse_hm(&entry.time_start) {
            if let Some(start) = today_at(now, hour, minute) {
                if now < start {
                    let nominal = start - Duration::minutes(REMINDER_LEAD_MINUTES);
                    let fire_at = if now < nominal { nominal } else { now };
                    triggers.push(Trigger {
                        id: TriggerId {
                            kind: TriggerKind::Reminder,
                            hour,
                            minute,
                        },
                        fire_at,
                        subject: entry.subject.clone(),
                        room: entry.room.clone(),
                    });
                }
            }
        }

        for time in [&entry.time_start, &entry.time_end] {
            let Some((hour, minute)) = parse_hm(time) else {
                continue;
            };
            if !refresh_seen.insert((hour, minute)) {
                continue;
            }
            if let Some(at) = today_at(now, hour, minute) {
                if at > now {
                    triggers.push(Trigger {
                        id: TriggerId {
                            kind: TriggerKind::DisplayRefresh,
                            hour,
                            minute,
                        },
                        fire_at: at,
                        subject: entry.subject.clone(),
                        room: entry.room.clone(),
                    });
                }
            }
        }
    }

    triggers
}

/// Install a planned trigger set, cancelling each identity first so a re-sync
/// replaces earlier registrations instead of stacking duplicates.
pub fn install_triggers<K: TriggerSink>(sink: &mut K, triggers: &[Trigger]) {
    for trigger in triggers {
        sink.cancel(trigger.id);
        // A single failed delivery registration is a no-op, not a batch error.
        let _ = sink.install(trigger);
    }
}

/// Today's date (relative to `now`) at the given wall-clock time.
fn today_at(now: DateTime<Local>, hour: u32, minute: u32) -> Option<DateTime<Local>> {
    now.date_naive()
        .and_hms_opt(hour, minute, 0)?
        .and_local_timezone(Local)
        .single()
}

fn parse_hm(time: &str) -> Option<(u32, u32)> {
    let mut parts = time.trim().split(':');
    let hour: u32 = parts.next()?.parse().ok()?;
    let minute: u32 = parts.next()?.parse().ok()?;
    (hour < 24 && minute < 60).then_some((hour, minute))
}

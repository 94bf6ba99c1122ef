//! Network-first, cache-fallback sync pipeline.
//!
//! One sync request moves through two states: fetching, then resolved as
//! live, stale, or failed. A transient outage degrades to the last cached
//! view of today instead of an error screen, as long as one sync ever
//! succeeded.

use chrono::{DateTime, Days, Local, NaiveDate};

use crate::models::LessonEntry;
use crate::portal::PortalClient;
use crate::schedule::{self, TriggerSink};
use crate::store::CacheStore;

/// Which day a sync targets. Caching and reminders are scoped to today only;
/// a tomorrow view is display-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayScope {
    Today,
    Tomorrow,
}

impl DayScope {
    /// Calendar date this scope resolves to, relative to `now`.
    pub fn date(self, now: DateTime<Local>) -> NaiveDate {
        let today = now.date_naive();
        match self {
            Self::Today => today,
            // Next day always exists in the supported calendar range.
            Self::Tomorrow => today.checked_add_days(Days::new(1)).unwrap_or(today),
        }
    }

    pub const fn is_today(self) -> bool {
        matches!(self, Self::Today)
    }
}

/// Resolution of one sync request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Fresh entries from the portal.
    Live(Vec<LessonEntry>),
    /// Portal unreachable; entries served from the cached snapshot.
    Stale(Vec<LessonEntry>),
    /// Portal unreachable and no usable snapshot.
    Failed(String),
}

/// Seam over the portal client so tests can script fetch results.
pub trait TimetableSource {
    async fn timetable_for_date(&mut self, date: NaiveDate) -> Option<Vec<LessonEntry>>;
}

impl TimetableSource for PortalClient {
    async fn timetable_for_date(&mut self, date: NaiveDate) -> Option<Vec<LessonEntry>> {
        Self::timetable_for_date(self, date).await
    }
}

/// Coordinates portal fetch, snapshot persistence, and trigger scheduling.
pub struct SyncOrchestrator {
    cache: CacheStore,
    notifications_enabled: bool,
}

impl SyncOrchestrator {
    pub const fn new(cache: CacheStore, notifications_enabled: bool) -> Self {
        Self {
            cache,
            notifications_enabled,
        }
    }

    /// Run one sync request.
    ///
    /// A live result for today overwrites the snapshot and, when
    /// notifications are enabled, replaces the day's scheduled triggers. A
    /// live result for any other day is returned as-is. A failed fetch falls
    /// back to the snapshot.
    pub async fn sync_day<S, K>(
        &self,
        source: &mut S,
        sink: &mut K,
        scope: DayScope,
        now: DateTime<Local>,
    ) -> SyncOutcome
    where
        S: TimetableSource,
        K: TriggerSink,
    {
        let date = scope.date(now);

        match source.timetable_for_date(date).await {
            Some(entries) => {
                if scope.is_today() {
                    // Snapshot write failure must not fail a successful sync.
                    self.cache.save_snapshot(&entries).ok();
                    if self.notifications_enabled {
                        let triggers = schedule::plan_triggers(&entries, now);
                        schedule::install_triggers(sink, &triggers);
                    }
                }
                SyncOutcome::Live(entries)
            }
            None => match self.cache.snapshot() {
                Some(cached) if !cached.is_empty() => SyncOutcome::Stale(cached),
                _ => SyncOutcome::Failed(
                    "portal unreachable and no cached timetable".to_string(),
                ),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Trigger, TriggerId};
    use anyhow::Result;
    use chrono::TimeZone;
    use tempfile::TempDir;

    /// Source that returns a fixed result and records requested dates.
    struct ScriptedSource {
        result: Option<Vec<LessonEntry>>,
        requested: Vec<NaiveDate>,
    }

    impl ScriptedSource {
        fn returning(result: Option<Vec<LessonEntry>>) -> Self {
            Self {
                result,
                requested: Vec::new(),
            }
        }
    }

    impl TimetableSource for ScriptedSource {
        async fn timetable_for_date(&mut self, date: NaiveDate) -> Option<Vec<LessonEntry>> {
            self.requested.push(date);
            self.result.clone()
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        installed: Vec<TriggerId>,
    }

    impl TriggerSink for RecordingSink {
        fn cancel(&mut self, _id: TriggerId) {}

        fn install(&mut self, trigger: &Trigger) -> Result<()> {
            self.installed.push(trigger.id);
            Ok(())
        }
    }

    fn lesson(subject: &str, start: &str, end: &str) -> LessonEntry {
        LessonEntry {
            period: "1".to_string(),
            time_start: start.to_string(),
            time_end: end.to_string(),
            subject: subject.to_string(),
            class_name: String::new(),
            teacher: String::new(),
            room: String::new(),
            bg_color: String::new(),
            border_color: String::new(),
            is_current: false,
            is_free: false,
        }
    }

    fn cache_in(dir: &TempDir) -> CacheStore {
        CacheStore::open_at(dir.path().join("timetable_cache.json"))
    }

    fn morning() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 11, 8, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn live_today_persists_snapshot_and_schedules() {
        let dir = TempDir::new().unwrap();
        let entries = vec![lesson("Maths", "09:00", "10:00")];
        let mut source = ScriptedSource::returning(Some(entries.clone()));
        let mut sink = RecordingSink::default();

        let orchestrator = SyncOrchestrator::new(cache_in(&dir), true);
        let outcome = orchestrator
            .sync_day(&mut source, &mut sink, DayScope::Today, morning())
            .await;

        assert_eq!(outcome, SyncOutcome::Live(entries.clone()));
        assert_eq!(cache_in(&dir).snapshot().unwrap(), entries);
        assert!(!sink.installed.is_empty());
        assert_eq!(source.requested, vec![morning().date_naive()]);
    }

    #[tokio::test]
    async fn live_today_skips_scheduling_when_notifications_off() {
        let dir = TempDir::new().unwrap();
        let mut source =
            ScriptedSource::returning(Some(vec![lesson("Maths", "09:00", "10:00")]));
        let mut sink = RecordingSink::default();

        let orchestrator = SyncOrchestrator::new(cache_in(&dir), false);
        orchestrator
            .sync_day(&mut source, &mut sink, DayScope::Today, morning())
            .await;

        assert!(sink.installed.is_empty());
        // Snapshot still written: only scheduling is preference-gated.
        assert!(cache_in(&dir).has_cache());
    }

    #[tokio::test]
    async fn tomorrow_is_never_cached_or_scheduled() {
        let dir = TempDir::new().unwrap();
        let entries = vec![lesson("Maths", "09:00", "10:00")];
        let mut source = ScriptedSource::returning(Some(entries.clone()));
        let mut sink = RecordingSink::default();

        let orchestrator = SyncOrchestrator::new(cache_in(&dir), true);
        let outcome = orchestrator
            .sync_day(&mut source, &mut sink, DayScope::Tomorrow, morning())
            .await;

        assert_eq!(outcome, SyncOutcome::Live(entries));
        assert!(!cache_in(&dir).has_cache());
        assert!(sink.installed.is_empty());
        assert_eq!(
            source.requested,
            vec![morning().date_naive().succ_opt().unwrap()]
        );
    }

    #[tokio::test]
    async fn failed_fetch_falls_back_to_snapshot() {
        let dir = TempDir::new().unwrap();
        let cached = vec![lesson("Science", "10:00", "11:00")];
        cache_in(&dir).save_snapshot(&cached).unwrap();

        let mut source = ScriptedSource::returning(None);
        let mut sink = RecordingSink::default();

        let orchestrator = SyncOrchestrator::new(cache_in(&dir), true);
        let outcome = orchestrator
            .sync_day(&mut source, &mut sink, DayScope::Today, morning())
            .await;

        assert_eq!(outcome, SyncOutcome::Stale(cached));
        // Stale results never reschedule triggers.
        assert!(sink.installed.is_empty());
    }

    #[tokio::test]
    async fn failed_fetch_with_empty_cache_fails() {
        let dir = TempDir::new().unwrap();
        let mut source = ScriptedSource::returning(None);
        let mut sink = RecordingSink::default();

        let orchestrator = SyncOrchestrator::new(cache_in(&dir), true);
        let outcome = orchestrator
            .sync_day(&mut source, &mut sink, DayScope::Today, morning())
            .await;

        assert!(matches!(outcome, SyncOutcome::Failed(_)));
    }

    #[tokio::test]
    async fn empty_snapshot_counts_as_no_cache() {
        let dir = TempDir::new().unwrap();
        cache_in(&dir).save_snapshot(&[]).unwrap();

        let mut source = ScriptedSource::returning(None);
        let mut sink = RecordingSink::default();

        let orchestrator = SyncOrchestrator::new(cache_in(&dir), true);
        let outcome = orchestrator
            .sync_day(&mut source, &mut sink, DayScope::Today, morning())
            .await;

        assert!(matches!(outcome, SyncOutcome::Failed(_)));
    }
}

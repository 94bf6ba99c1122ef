//! CLI command execution.
//!
//! The only place in the crate that prints. Core modules return errors and
//! sentinel values; this layer turns them into terminal output.

use anyhow::{bail, Context, Result};
use chrono::Local;

use crate::models::{LessonEntry, Trigger, TriggerId};
use crate::portal::{PortalClient, DEFAULT_BASE_URL};
use crate::schedule::TriggerSink;
use crate::store::{CacheStore, SessionStore, SettingsStore, TaskStore};
use crate::sync::{DayScope, SyncOrchestrator, SyncOutcome};

use super::args::{Cli, Commands, ToggleState};

/// Sink that records registrations; delivery itself belongs to an OS alarm
/// service this CLI does not have.
#[derive(Default)]
struct RecordingSink {
    installed: Vec<Trigger>,
}

impl TriggerSink for RecordingSink {
    fn cancel(&mut self, _id: TriggerId) {}

    fn install(&mut self, trigger: &Trigger) -> Result<()> {
        self.installed.push(trigger.clone());
        Ok(())
    }
}

// === Command Execution ===

pub async fn execute(cli: Cli) -> Result<()> {
    let portal_url = cli
        .portal
        .clone()
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    match cli.command {
        Commands::Login {
            cookie,
            session_id,
            student_id,
        } => login(&portal_url, &cookie, session_id.as_deref(), &student_id).await,
        Commands::Logout => logout(&portal_url),
        Commands::Status => status(&portal_url).await,
        Commands::Whoami => whoami(&portal_url).await,
        Commands::Show { tomorrow } => {
            let scope = if tomorrow {
                DayScope::Tomorrow
            } else {
                DayScope::Today
            };
            show(&portal_url, scope).await
        }
        Commands::Task {
            subject,
            note,
            clear,
        } => task(&subject, &note.join(" "), clear),
        Commands::Notifications { state } => set_notifications(state),
    }
}

/// Persist the session pieces as they become available: cookie first, then
/// session id, then student id. A missing session id is discovered from the
/// cookie alone.
async fn login(
    portal_url: &str,
    cookie: &str,
    session_id: Option<&str>,
    student_id: &str,
) -> Result<()> {
    let session = SessionStore::open()?;
    session.save_cookie(cookie)?;

    if let Some(sid) = session_id {
        session.save_session_id(sid)?;
        session.save_student_id(student_id)?;
    } else {
        println!("No session id given, discovering from cookie...");
        let client = PortalClient::new(portal_url, SessionStore::open()?)?;
        let (sid, resolved_student) = client.discover_session_info(cookie).await.context(
            "Could not discover a session from this cookie. Pass --session-id explicitly.",
        )?;
        session.save_session_id(&sid)?;
        session.save_student_id(&resolved_student)?;
        println!("Discovered session {sid}, student {resolved_student}");
    }

    if session.is_logged_in() {
        println!("Logged in.");
    } else {
        println!("Session saved, but the cookie does not look like a portal login.");
    }
    Ok(())
}

fn logout(portal_url: &str) -> Result<()> {
    let mut client = PortalClient::new(portal_url, SessionStore::open()?)?;
    client.logout()?;
    println!("Logged out.");
    Ok(())
}

async fn status(portal_url: &str) -> Result<()> {
    let session = SessionStore::open()?;
    if !session.is_logged_in() {
        println!("Not logged in");
        return Ok(());
    }

    let client = PortalClient::new(portal_url, session)?;
    if client.check_login_status().await {
        println!("Session is valid");
    } else {
        println!("Session looks expired - log in again");
    }

    if CacheStore::open()?.has_cache() {
        println!("Offline snapshot available");
    }
    Ok(())
}

async fn whoami(portal_url: &str) -> Result<()> {
    let client = PortalClient::new(portal_url, SessionStore::open()?)?;
    let lookup = client.fetch_user_display_name().await;
    println!("{}", lookup.display());
    Ok(())
}

async fn show(portal_url: &str, scope: DayScope) -> Result<()> {
    let session = SessionStore::open()?;
    if !session.is_logged_in() {
        bail!("Not logged in. Run: tably login --cookie <COOKIE>");
    }

    let mut client = PortalClient::new(portal_url, session)?;
    let settings = SettingsStore::open()?;
    let orchestrator = SyncOrchestrator::new(CacheStore::open()?, settings.notifications_enabled());
    let mut sink = RecordingSink::default();

    match orchestrator
        .sync_day(&mut client, &mut sink, scope, Local::now())
        .await
    {
        SyncOutcome::Live(entries) => {
            print_entries(&entries)?;
            if !sink.installed.is_empty() {
                println!();
                for trigger in &sink.installed {
                    println!(
                        "  {} at {}",
                        trigger.id.kind,
                        trigger.fire_at.format("%H:%M")
                    );
                }
            }
        }
        SyncOutcome::Stale(entries) => {
            println!("! Offline - showing the last synced timetable");
            println!();
            print_entries(&entries)?;
        }
        SyncOutcome::Failed(message) => bail!(message),
    }
    Ok(())
}

fn print_entries(entries: &[LessonEntry]) -> Result<()> {
    if entries.is_empty() {
        println!("No classes.");
        return Ok(());
    }

    let tasks = TaskStore::open()?;
    for entry in entries {
        let marker = if entry.is_current { ">" } else { " " };
        let note = if tasks.has_task(&entry.subject) {
            " *"
        } else {
            ""
        };

        if entry.is_free {
            println!(
                "{marker} {:<4} {}-{}  (free)",
                entry.period, entry.time_start, entry.time_end
            );
        } else {
            println!(
                "{marker} {:<4} {}-{}  {} [{}]  {}  {}{note}",
                entry.period,
                entry.time_start,
                entry.time_end,
                entry.subject,
                entry.class_name,
                entry.room,
                entry.teacher
            );
        }
    }
    Ok(())
}

fn task(subject: &str, note: &str, clear: bool) -> Result<()> {
    let tasks = TaskStore::open()?;

    if clear {
        tasks.save_task(subject, "")?;
        println!("Cleared note for {subject}");
    } else if note.is_empty() {
        match tasks.task(subject) {
            Some(existing) => println!("{existing}"),
            None => println!("No note for {subject}"),
        }
    } else {
        tasks.save_task(subject, note)?;
        println!("Saved note for {subject}");
    }
    Ok(())
}

fn set_notifications(state: ToggleState) -> Result<()> {
    let enabled = matches!(state, ToggleState::On);
    SettingsStore::open()?.set_notifications_enabled(enabled)?;
    println!(
        "Pre-class reminders {}",
        if enabled { "enabled" } else { "disabled" }
    );
    Ok(())
}

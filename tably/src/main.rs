//! Tably - a school portal timetable client for the terminal.
//!
//! Architecture:
//! - The portal client fetches the multi-week timetable with a captured
//!   session cookie, resolving missing ids against the portal's user endpoint
//! - A pure extractor turns the payload into one day's ordered entries
//! - Sync is network-first with a cached-snapshot fallback, so an outage
//!   degrades to the last known view of today instead of an error
//! - Successful today-syncs derive reminder and refresh triggers for a
//!   delivery collaborator

mod cli;
mod extract;
mod models;
mod portal;
mod schedule;
mod store;
mod sync;

use anyhow::Result;
use clap::Parser;

use cli::{execute, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    execute(cli).await
}

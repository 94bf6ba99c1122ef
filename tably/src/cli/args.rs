//! CLI argument definitions.

use clap::{Parser, Subcommand, ValueEnum};

/// Tably - your school portal timetable in the terminal
#[derive(Parser, Debug)]
#[command(name = "tably")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Portal base URL (defaults to the built-in deployment)
    #[arg(long)]
    pub portal: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Store a captured portal session cookie
    Login {
        /// Raw cookie string captured from a logged-in browser session
        #[arg(long)]
        cookie: String,

        /// Portal session id (discovered from the cookie when omitted)
        #[arg(long)]
        session_id: Option<String>,

        /// Student id ("auto" resolves against the portal on first fetch)
        #[arg(long, default_value = "auto")]
        student_id: String,
    },

    /// Clear the stored session
    Logout,

    /// Check whether the stored session still authenticates
    Status,

    /// Show the logged-in user's name
    Whoami,

    /// Sync and print a day's timetable
    Show {
        /// Show tomorrow instead of today
        #[arg(long)]
        tomorrow: bool,
    },

    /// Read or write a note attached to a subject
    Task {
        /// Subject the note belongs to
        subject: String,

        /// Note text (prints the current note when omitted)
        #[arg(trailing_var_arg = true)]
        note: Vec<String>,

        /// Remove the note
        #[arg(long, conflicts_with = "note")]
        clear: bool,
    },

    /// Turn pre-class reminders on or off
    Notifications {
        /// Desired state
        #[arg(value_enum)]
        state: ToggleState,
    },
}

/// On/off argument for toggles
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ToggleState {
    On,
    Off,
}

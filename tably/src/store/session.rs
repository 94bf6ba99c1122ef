//! Session state persistence: cookie, session id, student id.
//!
//! The three values arrive at different points of a login flow (cookie first,
//! then session id, then student id), so each has its own save operation and
//! is persisted as soon as it is available.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

const SESSION_FILE: &str = "session.json";

/// The portal session cookie carries this marker when it holds a real login.
const SESSION_COOKIE_MARKER: &str = "PortalSID2";

/// Student id values that mean "needs resolution against the portal".
const STUDENT_ID_PLACEHOLDERS: &[&str] = &["auto", "auto_refresh_needed"];

/// True if the student id is a placeholder the client must resolve before the
/// first timetable fetch.
pub fn is_placeholder_student_id(id: &str) -> bool {
    id.is_empty() || STUDENT_ID_PLACEHOLDERS.contains(&id)
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionData {
    cookie: Option<String>,
    session_id: Option<String>,
    student_id: Option<String>,
}

/// File-backed session state store.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Open the store at the default per-user location.
    pub fn open() -> Result<Self> {
        Ok(Self::open_at(super::data_file(SESSION_FILE)?))
    }

    /// Open the store at a specific path.
    pub const fn open_at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn cookie(&self) -> Option<String> {
        self.load().cookie
    }

    pub fn save_cookie(&self, cookie: &str) -> Result<()> {
        let mut data = self.load();
        data.cookie = Some(cookie.to_string());
        self.save(&data)
    }

    pub fn session_id(&self) -> Option<String> {
        self.load().session_id
    }

    pub fn save_session_id(&self, session_id: &str) -> Result<()> {
        let mut data = self.load();
        data.session_id = Some(session_id.to_string());
        self.save(&data)
    }

    pub fn student_id(&self) -> Option<String> {
        self.load().student_id
    }

    pub fn save_student_id(&self, student_id: &str) -> Result<()> {
        let mut data = self.load();
        data.student_id = Some(student_id.to_string());
        self.save(&data)
    }

    /// A session looks logged in when the cookie holds the portal's login
    /// marker and a session id is present. Best-effort: the portal may still
    /// reject an expired cookie.
    pub fn is_logged_in(&self) -> bool {
        let data = self.load();
        let cookie_ok = data
            .cookie
            .is_some_and(|c| !c.is_empty() && c.contains(SESSION_COOKIE_MARKER));
        cookie_ok && data.session_id.is_some_and(|s| !s.is_empty())
    }

    /// Clear every stored field.
    pub fn logout(&self) -> Result<()> {
        self.save(&SessionData::default())
    }

    fn load(&self) -> SessionData {
        super::read_json(&self.path)
    }

    fn save(&self, data: &SessionData) -> Result<()> {
        super::write_json(&self.path, data)
    }
}

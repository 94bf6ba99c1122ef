//! Session-aware portal client.
//!
//! All operations degrade to `None`/sentinel results rather than propagating
//! errors: the sync layer treats "no live data" uniformly and falls back to
//! the cached snapshot. The only retry behaviour anywhere is the single
//! POST-then-GET fallback against the user endpoint, which exists because
//! that endpoint answers inconsistently across portal deployments.

use std::time::Duration;

use chrono::NaiveDate;
use regex::Regex;
use reqwest::header;
use serde_json::Value;

use crate::extract;
use crate::models::{LessonEntry, WeekBlock};
use crate::store::{is_placeholder_student_id, SessionStore};

use super::error::PortalError;

/// Default portal deployment.
pub const DEFAULT_BASE_URL: &str = "https://castlehill-h.sentral.com.au";

const MOBILE_USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 14) AppleWebKit/537.36";
const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Fixed probe body the user endpoint expects.
const AUTH_PROBE_BODY: &str = r#"{"action":"is_authenticated"}"#;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Session id appears as a path segment in the portal's post-login URL.
const SESSION_ID_PATTERN: &str = r"/s-([a-zA-Z0-9]+)/";
/// Markup fallback for the student id during cookie-only discovery.
const STUDENT_ID_ATTR_PATTERN: &str = r#"data-student-id="(\d+)""#;

/// Result of a display-name lookup. `Unavailable` is a renderable error tag,
/// not a failure: the display layer shows a placeholder and moves on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserLookup {
    Name(String),
    Unknown,
    Unavailable,
}

impl UserLookup {
    pub fn display(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Unknown => "Unknown",
            Self::Unavailable => "(unavailable)",
        }
    }
}

/// Resolved authentication state for one request.
struct AuthState {
    cookie: String,
    session_id: String,
    student_id: String,
}

/// Authenticated HTTP client for the portal.
///
/// Holds the last successfully fetched payload so same-process date queries
/// reuse it; `clear_cache` must be called on logout. Not safe for concurrent
/// syncs - callers serialize requests per client instance.
pub struct PortalClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionStore,
    cached_payload: Option<Vec<WeekBlock>>,
}

impl PortalClient {
    /// Build a client against a portal deployment.
    pub fn new(base_url: impl Into<String>, session: SessionStore) -> Result<Self, PortalError> {
        let http = reqwest::Client::builder()
            .connect_timeout(REQUEST_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            session,
            cached_payload: None,
        })
    }

    /// Fetch the full multi-week timetable, replacing the in-memory payload.
    /// `None` when authentication state is incomplete or the request failed.
    pub async fn fetch_full_timetable(&mut self) -> Option<&[WeekBlock]> {
        self.fetch_full_inner().await.ok()?;
        self.cached_payload.as_deref()
    }

    async fn fetch_full_inner(&mut self) -> Result<(), PortalError> {
        let mut auth = self.auth_state()?;

        if is_placeholder_student_id(&auth.student_id) {
            let resolved = self
                .resolve_student_id()
                .await
                .ok_or(PortalError::StudentIdNotFound)?;
            // Persist so later sessions skip resolution; a failed write only
            // costs another lookup next time.
            self.session.save_student_id(&resolved).ok();
            auth.student_id = resolved;
        }

        let url = format!(
            "{}/s-{}/portal/timetable/getFullTimetableInDates/{}/undefined/true",
            self.base_url, auth.session_id, auth.student_id
        );

        let resp = self
            .http
            .get(&url)
            .header(header::COOKIE, &auth.cookie)
            .header(header::USER_AGENT, MOBILE_USER_AGENT)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(PortalError::Status(resp.status()));
        }

        let body = resp.text().await?;
        let raw: Vec<Value> = serde_json::from_str(&body)?;
        // Lenient per block: one malformed week must not discard the rest.
        let weeks = raw
            .into_iter()
            .filter_map(|block| serde_json::from_value(block).ok())
            .collect();
        self.cached_payload = Some(weeks);
        Ok(())
    }

    /// Resolve the student id via the user endpoint. `student_id` field
    /// first, generic `id` as fallback; both may arrive as string or number.
    pub async fn resolve_student_id(&self) -> Option<String> {
        let cookie = self.session.cookie().unwrap_or_default();
        let session_id = self.session.session_id()?;

        let body = self.user_endpoint_body(&session_id, &cookie).await?;
        let json: Value = serde_json::from_str(&body).ok()?;
        field_string(&json, "student_id").or_else(|| field_string(&json, "id"))
    }

    /// Look up the logged-in user's display name.
    pub async fn fetch_user_display_name(&self) -> UserLookup {
        let Some(cookie) = self.session.cookie() else {
            return UserLookup::Unavailable;
        };
        let Some(session_id) = self.session.session_id() else {
            return UserLookup::Unavailable;
        };

        let Some(body) = self.user_endpoint_body(&session_id, &cookie).await else {
            return UserLookup::Unavailable;
        };
        let Ok(json) = serde_json::from_str::<Value>(&body) else {
            return UserLookup::Unavailable;
        };

        let name = field_string(&json, "first_name")
            .filter(|name| !name.is_empty())
            .or_else(|| field_string(&json, "name").filter(|name| !name.is_empty()));
        name.map_or(UserLookup::Unknown, UserLookup::Name)
    }

    /// Entries for one date, fetching the full payload first if this client
    /// has not fetched it yet. `None` means no live data; the caller decides
    /// whether the cache can stand in.
    pub async fn timetable_for_date(&mut self, date: NaiveDate) -> Option<Vec<LessonEntry>> {
        if self.cached_payload.is_none() {
            self.fetch_full_timetable().await?;
        }
        self.cached_payload
            .as_deref()
            .map(|weeks| extract::day_entries(weeks, date))
    }

    /// Best-effort login probe: does the user endpoint answer 2xx?
    pub async fn check_login_status(&self) -> bool {
        let (Some(cookie), Some(session_id)) = (self.session.cookie(), self.session.session_id())
        else {
            return false;
        };

        let url = format!("{}/s-{}/portal/user", self.base_url, session_id);
        match self
            .http
            .get(&url)
            .header(header::COOKIE, cookie)
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    /// Discover `(session_id, student_id)` from a bare cookie by navigating
    /// the portal root and following redirects. The session id comes from the
    /// final URL's path; the student id from the user endpoint, with a markup
    /// scan as last resort. `Some` only when both were found.
    pub async fn discover_session_info(&self, cookie: &str) -> Option<(String, String)> {
        let resp = self
            .http
            .get(format!("{}/portal", self.base_url))
            .header(header::COOKIE, cookie)
            .header(header::USER_AGENT, DESKTOP_USER_AGENT)
            .send()
            .await
            .ok()?;

        let final_url = resp.url().to_string();
        let body = resp.text().await.unwrap_or_default();

        let session_re = Regex::new(SESSION_ID_PATTERN).ok()?;
        let session_id = session_re.captures(&final_url)?.get(1)?.as_str().to_string();

        let mut student_id = None;
        let user_url = format!("{}/s-{}/portal/user", self.base_url, session_id);
        if let Ok(user_resp) = self
            .http
            .get(&user_url)
            .header(header::COOKIE, cookie)
            .send()
            .await
        {
            if user_resp.status().is_success() {
                if let Ok(json) = user_resp.json::<Value>().await {
                    student_id =
                        field_string(&json, "student_id").or_else(|| field_string(&json, "id"));
                }
            }
        }

        if student_id.is_none() {
            if let Ok(attr_re) = Regex::new(STUDENT_ID_ATTR_PATTERN) {
                student_id = attr_re
                    .captures(&body)
                    .and_then(|caps| caps.get(1))
                    .map(|m| m.as_str().to_string());
            }
        }

        student_id.map(|sid| (session_id, sid))
    }

    /// Drop the in-memory payload. Called on logout.
    pub fn clear_cache(&mut self) {
        self.cached_payload = None;
    }

    /// Clear the stored session and the in-memory payload.
    pub fn logout(&mut self) -> anyhow::Result<()> {
        self.clear_cache();
        self.session.logout()
    }

    fn auth_state(&self) -> Result<AuthState, PortalError> {
        let cookie = self
            .session
            .cookie()
            .filter(|c| !c.is_empty())
            .ok_or(PortalError::AuthIncomplete)?;
        let session_id = self
            .session
            .session_id()
            .filter(|s| !s.is_empty())
            .ok_or(PortalError::AuthIncomplete)?;
        let student_id = self.session.student_id().unwrap_or_default();
        Ok(AuthState {
            cookie,
            session_id,
            student_id,
        })
    }

    /// Shared resilient call against the user endpoint: POST the auth probe,
    /// and when that fails or returns an empty body, try exactly one GET.
    async fn user_endpoint_body(&self, session_id: &str, cookie: &str) -> Option<String> {
        let url = format!("{}/s-{}/portal/user", self.base_url, session_id);

        let mut body = String::new();
        let post = self
            .http
            .post(&url)
            .body(AUTH_PROBE_BODY)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::COOKIE, cookie)
            .header(header::USER_AGENT, MOBILE_USER_AGENT)
            .header(
                header::REFERER,
                format!("{}/s-{}/portal/", self.base_url, session_id),
            )
            .header(header::ORIGIN, &self.base_url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await;

        if let Ok(resp) = post {
            if resp.status().is_success() {
                body = resp.text().await.unwrap_or_default();
            }
        }

        if body.is_empty() {
            let get = self
                .http
                .get(&url)
                .header(header::COOKIE, cookie)
                .header(header::USER_AGENT, MOBILE_USER_AGENT)
                .header(header::ACCEPT, "application/json")
                .send()
                .await;

            if let Ok(resp) = get {
                if resp.status().is_success() {
                    body = resp.text().await.unwrap_or_default();
                }
            }
        }

        if body.is_empty() {
            None
        } else {
            Some(body)
        }
    }
}

/// Pull a field as a string, accepting JSON strings and numbers (the portal
/// is inconsistent about which it sends for ids).
fn field_string(json: &Value, key: &str) -> Option<String> {
    match json.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_string_accepts_strings_and_numbers() {
        let json: Value = serde_json::from_str(r#"{"student_id":"123","id":456,"x":true}"#).unwrap();
        assert_eq!(field_string(&json, "student_id").as_deref(), Some("123"));
        assert_eq!(field_string(&json, "id").as_deref(), Some("456"));
        assert_eq!(field_string(&json, "x"), None);
        assert_eq!(field_string(&json, "missing"), None);
    }

    #[test]
    fn session_id_pattern_matches_redirect_url() {
        let re = Regex::new(SESSION_ID_PATTERN).unwrap();
        let url = "https://example.sentral.com.au/s-abC123/portal/dashboard";
        let caps = re.captures(url).unwrap();
        assert_eq!(caps.get(1).unwrap().as_str(), "abC123");
    }

    #[test]
    fn student_id_attr_pattern_scans_markup() {
        let re = Regex::new(STUDENT_ID_ATTR_PATTERN).unwrap();
        let html = r#"<div class="profile" data-student-id="98765">"#;
        let caps = re.captures(html).unwrap();
        assert_eq!(caps.get(1).unwrap().as_str(), "98765");
    }

    #[test]
    fn user_lookup_display() {
        assert_eq!(UserLookup::Name("Alex".to_string()).display(), "Alex");
        assert_eq!(UserLookup::Unknown.display(), "Unknown");
        assert_eq!(UserLookup::Unavailable.display(), "(unavailable)");
    }
}

//! Portal error taxonomy.
//!
//! Internal to the client: every public operation collapses these to
//! `None`/sentinel results at its boundary, so callers apply the cache
//! fallback uniformly instead of branching on failure kinds.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PortalError {
    /// Cookie, session id, or student id missing or still a placeholder.
    #[error("login state incomplete")]
    AuthIncomplete,

    /// Timeout, connection failure, or malformed response transport.
    #[error("portal request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The portal answered with a non-success status.
    #[error("portal returned status {0}")]
    Status(reqwest::StatusCode),

    /// Response body was not the JSON shape we expect.
    #[error("unexpected portal response: {0}")]
    Parse(#[from] serde_json::Error),

    /// The student id could not be resolved from the user endpoint.
    #[error("student id not found")]
    StudentIdNotFound,
}

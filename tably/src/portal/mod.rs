//! Portal HTTP client: authenticated calls against the school portal.

mod client;
mod error;

pub use client::{PortalClient, UserLookup, DEFAULT_BASE_URL};
pub use error::PortalError;

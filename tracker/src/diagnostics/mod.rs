//! Structured diagnostics extracted from validate/deploy error bodies
//!
//! The backend reports three mutually exclusive failure shapes, told apart by
//! fixed marker substrings. The body is inspected once and routed to exactly
//! one parser; anything unrecognized is surfaced as-is.

pub mod auth;
pub mod conflict;

use std::fmt;

pub use auth::AuthDenial;
pub use conflict::ConflictNode;

/// Marker carried by a resource-conflict error body
pub const CONFLICT_MARKER: &str = "EXISTS|";

/// Marker carried by an authorization-denial error body
pub const AUTH_MARKER: &str = "AUTHORIZATION_ERROR|";

/// Routed outcome of a failed validate/deploy call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployFailure {
    /// The deployment target already exists
    Conflict(Vec<ConflictNode>),

    /// The backend refused the caller's role
    AuthDenied(AuthDenial),

    /// Unrecognized error, displayed as-is
    Other(String),
}

impl fmt::Display for DeployFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeployFailure::Conflict(nodes) => {
                write!(f, "cluster already exists ({} running node(s))", nodes.len())
            }
            DeployFailure::AuthDenied(denial) => write!(f, "{}", denial.message),
            DeployFailure::Other(message) => write!(f, "{}", message),
        }
    }
}

/// Inspect an error body once and route it to exactly one parser.
pub fn classify_failure(body: &str) -> DeployFailure {
    if body.contains(CONFLICT_MARKER) {
        DeployFailure::Conflict(conflict::parse(body))
    } else if body.contains(AUTH_MARKER) {
        DeployFailure::AuthDenied(auth::parse(body))
    } else {
        DeployFailure::Other(body.to_string())
    }
}

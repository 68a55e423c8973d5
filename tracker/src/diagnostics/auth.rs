//! Authorization-denial error parsing

use serde::{Deserialize, Serialize};

use crate::diagnostics::AUTH_MARKER;

/// Human-readable denial returned by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthDenial {
    pub message: String,
}

/// Strip the recognized marker and keep the remainder as the message.
pub fn parse(body: &str) -> AuthDenial {
    let message = match body.split_once(AUTH_MARKER) {
        Some((_, rest)) => rest.trim().to_string(),
        None => body.trim().to_string(),
    };
    AuthDenial { message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strips_marker() {
        let denial = parse("AUTHORIZATION_ERROR|Viewer role cannot deploy");
        assert_eq!(denial.message, "Viewer role cannot deploy");
    }

    #[test]
    fn test_parse_empty_remainder() {
        let denial = parse("AUTHORIZATION_ERROR|");
        assert_eq!(denial.message, "");
    }

    #[test]
    fn test_parse_without_marker_keeps_body() {
        let denial = parse("permission denied");
        assert_eq!(denial.message, "permission denied");
    }
}

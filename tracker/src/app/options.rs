//! Application configuration options

use crate::stream::session;

/// Main application options
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// Control plane API base URL
    pub backend_base_url: String,

    /// Path of the log stream endpoint on the control plane
    pub stream_path: String,

    /// Role forwarded on every control-plane call
    pub role: String,

    /// Stream session options
    pub stream: session::Options,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            backend_base_url: "http://localhost:8000".to_string(),
            stream_path: "/api/logs/stream".to_string(),
            role: "Operator".to_string(),
            stream: session::Options::default(),
        }
    }
}

//! Settings file management

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::TrackerError;
use crate::logs::LogLevel;

/// Tracker settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Control plane configuration
    #[serde(default)]
    pub backend: BackendSettings,

    /// Role string forwarded verbatim on every control-plane call
    #[serde(default = "default_role")]
    pub role: String,

    /// Fixed log-stream reconnect delay in seconds
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_secs: u64,
}

fn default_role() -> String {
    "Operator".to_string()
}

fn default_reconnect_delay() -> u64 {
    3
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            backend: BackendSettings::default(),
            role: default_role(),
            reconnect_delay_secs: default_reconnect_delay(),
        }
    }
}

/// Control plane settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendSettings {
    /// Base URL for the control plane API
    #[serde(default = "default_backend_url")]
    pub base_url: String,

    /// Path of the log stream endpoint
    #[serde(default = "default_stream_path")]
    pub stream_path: String,
}

fn default_backend_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_stream_path() -> String {
    "/api/logs/stream".to_string()
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: default_backend_url(),
            stream_path: default_stream_path(),
        }
    }
}

impl Settings {
    /// Read settings from a JSON file, falling back to defaults when the
    /// file does not exist
    pub async fn load(path: &Path) -> Result<Self, TrackerError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = tokio::fs::read_to_string(path).await?;
        let settings = serde_json::from_str(&raw)?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_fill_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"role": "Viewer", "log_level": "debug"}"#).unwrap();

        assert_eq!(settings.role, "Viewer");
        assert_eq!(settings.log_level, LogLevel::Debug);
        assert_eq!(settings.backend.base_url, "http://localhost:8000");
        assert_eq!(settings.reconnect_delay_secs, 3);
    }
}

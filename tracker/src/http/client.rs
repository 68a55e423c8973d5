//! HTTP client for the Harbor Master control plane

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, error};

use crate::diagnostics::classify_failure;
use crate::errors::TrackerError;
use crate::models::report::{ConfigPreview, DeploymentReport};
use crate::models::spec::DeploymentSpec;

/// Header carrying the caller-supplied role, forwarded verbatim.
/// Role enforcement is entirely the control plane's responsibility.
pub const ROLE_HEADER: &str = "X-Harbor-Role";

// The deploy call blocks until the whole playbook finishes
const REQUEST_TIMEOUT: Duration = Duration::from_secs(3600);

/// HTTP client for control-plane communication
pub struct HttpClient {
    client: Client,
    base_url: String,
    role: String,
}

impl HttpClient {
    /// Create a new HTTP client carrying the given role string
    pub fn new(base_url: &str, role: &str) -> Result<Self, TrackerError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            role: role.to_string(),
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submit a cluster deployment.
    ///
    /// Blocks until the control plane reports the outcome; progress arrives
    /// independently over the log stream. A failure body is routed through
    /// the diagnostics parsers.
    pub async fn deploy(&self, spec: &DeploymentSpec) -> Result<DeploymentReport, TrackerError> {
        let url = format!("{}/deploy", self.base_url);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header(ROLE_HEADER, &self.role)
            .json(spec)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = extract_detail(&body);
            error!("Deploy rejected: {} - {}", status, detail);
            return Err(TrackerError::DeployRejected(classify_failure(&detail)));
        }

        let report = response.json().await?;
        Ok(report)
    }

    /// Fetch the rendered galera.cnf preview for a spec
    pub async fn preview_config(&self, spec: &DeploymentSpec) -> Result<ConfigPreview, TrackerError> {
        let url = format!("{}/preview-config", self.base_url);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header(ROLE_HEADER, &self.role)
            .json(spec)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = extract_detail(&body);
            error!("Config preview failed: {} - {}", status, detail);
            return Err(TrackerError::BackendError { status, detail });
        }

        let preview = response.json().await?;
        Ok(preview)
    }
}

/// Unwrap the control plane's `{"detail": ...}` error envelope.
///
/// A string detail is returned as-is; a field-validation array is joined as
/// `"<field>: <msg>"` entries; anything else falls back to the raw body.
fn extract_detail(body: &str) -> String {
    let parsed: serde_json::Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) => return body.to_string(),
    };

    match parsed.get("detail") {
        Some(serde_json::Value::String(detail)) => detail.clone(),
        Some(serde_json::Value::Array(errors)) => errors
            .iter()
            .map(|err| {
                let field = err
                    .get("loc")
                    .and_then(|loc| loc.as_array())
                    .and_then(|loc| loc.last())
                    .and_then(|field| field.as_str())
                    .unwrap_or("request");
                let msg = err.get("msg").and_then(|m| m.as_str()).unwrap_or("invalid");
                format!("{}: {}", field, msg)
            })
            .collect::<Vec<_>>()
            .join(", "),
        _ => body.to_string(),
    }
}

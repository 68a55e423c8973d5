//! Deployment outcome and health report models

use serde::{Deserialize, Serialize};

/// Successful deployment response from the control plane
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentReport {
    /// Outcome label, e.g. "Success"
    pub status: String,

    /// Deployed cluster name
    pub cluster_name: String,

    /// Virtual IP fronting the cluster
    pub lvs_vip: String,

    /// Post-deployment diagnostics
    pub health_report: HealthReport,

    #[serde(default)]
    pub message: String,
}

/// Post-deployment diagnostics across all node groups
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    #[serde(default)]
    pub galera: Vec<GaleraNodeHealth>,

    #[serde(rename = "async", default)]
    pub async_replica: Option<AsyncReplicaHealth>,

    #[serde(default)]
    pub lvs: Vec<LvsNodeHealth>,

    /// "Healthy" or "Degraded"
    pub overall_status: String,

    /// Step-by-step diagnostic log from the checker
    #[serde(default)]
    pub debug_logs: Vec<String>,
}

/// Health of one Galera node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaleraNodeHealth {
    pub host: String,
    pub reachable: bool,

    #[serde(default)]
    pub cluster_size: u32,

    /// wsrep local state, e.g. "Synced" or "Donor"
    #[serde(default)]
    pub sync_state: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Health of the async replica
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AsyncReplicaHealth {
    pub host: String,
    pub reachable: bool,

    #[serde(default)]
    pub io_running: String,

    #[serde(default)]
    pub sql_running: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Health of one LVS load balancer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LvsNodeHealth {
    pub host: String,
    pub ssh_reachable: bool,

    #[serde(default)]
    pub holds_vip: bool,

    #[serde(default)]
    pub routing_active: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Rendered configuration preview for one Galera node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigPreview {
    /// Target filename, e.g. "60-galera.cnf"
    pub filename: String,

    /// Rendered file content
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_report() {
        let raw = r#"{
            "status": "Success",
            "cluster_name": "Galera_Cluster",
            "lvs_vip": "192.168.64.150",
            "health_report": {
                "galera": [
                    {"host": "192.168.64.120", "reachable": true, "cluster_size": 3, "sync_state": "Synced"},
                    {"host": "192.168.64.121", "reachable": false, "error": "timed out"}
                ],
                "async": {"host": "192.168.64.125", "reachable": true, "io_running": "Yes", "sql_running": "Yes"},
                "lvs": [
                    {"host": "192.168.64.123", "ssh_reachable": true, "holds_vip": true, "routing_active": true}
                ],
                "overall_status": "Degraded"
            },
            "message": "Deployment complete."
        }"#;

        let report: DeploymentReport = serde_json::from_str(raw).unwrap();
        assert_eq!(report.status, "Success");
        assert_eq!(report.health_report.galera.len(), 2);
        assert_eq!(report.health_report.galera[0].sync_state, "Synced");
        assert_eq!(report.health_report.galera[1].cluster_size, 0);
        assert!(report.health_report.async_replica.is_some());
        assert_eq!(report.health_report.overall_status, "Degraded");
    }
}

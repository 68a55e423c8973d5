//! Cluster deployment spec

use serde::{Deserialize, Serialize};

use crate::errors::TrackerError;

/// MariaDB engine versions the control plane supports
pub const SUPPORTED_VERSIONS: [&str; 3] = ["10.5.16", "10.6.21", "10.11"];

/// Special characters accepted in SST passwords
const PASSWORD_SPECIALS: &str = "@$!%*?&";

/// Configuration for an individual Galera cluster node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaleraNodeConfig {
    /// IPv4 address of the node
    pub ip: String,

    /// Unique name for wsrep_node_name
    pub node_name: String,

    /// MySQL server-id (derived from the IP when 0)
    #[serde(default)]
    pub server_id: u32,
}

/// Full cluster deployment request submitted to the control plane
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentSpec {
    pub mariadb_version: String,
    pub galera_nodes: Vec<GaleraNodeConfig>,
    pub lvs_ips: Vec<String>,
    pub monitor_ip: String,
    pub async_ip: String,

    /// The virtual IP that floats between the LVS nodes
    pub lvs_vip: String,

    #[serde(default = "default_repl_user")]
    pub repl_user: String,
    pub repl_password: String,

    // Core Galera parameters
    pub wsrep_cluster_name: String,
    #[serde(default = "default_wsrep_on")]
    pub wsrep_on: String,
    #[serde(default = "default_wsrep_provider")]
    pub wsrep_provider: String,
    #[serde(default = "default_binlog_format")]
    pub binlog_format: String,
    #[serde(default = "default_storage_engine")]
    pub default_storage_engine: String,
    #[serde(default = "default_autoinc_lock_mode")]
    pub innodb_autoinc_lock_mode: u32,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    // SST settings; credentials in 'user:password' format
    #[serde(default = "default_sst_method")]
    pub wsrep_sst_method: String,
    pub wsrep_sst_auth: String,

    // Version-specific engine parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wsrep_strict_ddl: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wsrep_replicate_myisam: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expire_logs_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wsrep_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binlog_expire_logs_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub innodb_buffer_pool_instances: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wsrep_slave_threads: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub innodb_undo_tablespaces: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wsrep_gtid_domain_id: Option<u32>,
}

fn default_repl_user() -> String {
    "repl_user".to_string()
}

fn default_wsrep_on() -> String {
    "ON".to_string()
}

fn default_wsrep_provider() -> String {
    "/usr/lib/galera/libgalera_smm.so".to_string()
}

fn default_binlog_format() -> String {
    "ROW".to_string()
}

fn default_storage_engine() -> String {
    "InnoDB".to_string()
}

fn default_autoinc_lock_mode() -> u32 {
    2
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_sst_method() -> String {
    "mariabackup".to_string()
}

/// Derive a deterministic server-id from a node IP.
///
/// Uses the last two octets so re-submitting the same spec always produces
/// the same ids; non-IPv4 input falls back to a stable hash in the same
/// range.
pub fn derive_server_id(ip: &str) -> u32 {
    let octets: Vec<&str> = ip.split('.').collect();
    if octets.len() == 4 {
        if let (Ok(third), Ok(fourth)) = (octets[2].parse::<u32>(), octets[3].parse::<u32>()) {
            return third * 256 + fourth;
        }
    }

    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    std::hash::Hash::hash(ip, &mut hasher);
    (std::hash::Hasher::finish(&hasher) % 65535) as u32
}

impl DeploymentSpec {
    /// Derive server ids for every Galera node from their IPs
    pub fn assign_server_ids(&mut self) {
        for node in &mut self.galera_nodes {
            node.server_id = derive_server_id(&node.ip);
        }
    }

    /// Client-side validation of the schema rules.
    ///
    /// Connectivity, SSH and resource probing stay on the control plane;
    /// this only rejects specs the backend would reject on shape alone.
    pub fn validate(&self) -> Result<(), TrackerError> {
        if !SUPPORTED_VERSIONS.contains(&self.mariadb_version.as_str()) {
            return Err(validation_error(format!(
                "Version Error: mariadb_version must be one of {:?}.",
                SUPPORTED_VERSIONS
            )));
        }

        if self.galera_nodes.len() != 3 {
            return Err(validation_error(
                "Topology Error: exactly 3 Galera nodes are required.",
            ));
        }
        if self.lvs_ips.len() != 2 {
            return Err(validation_error(
                "Topology Error: exactly 2 LVS nodes are required.",
            ));
        }

        let mut names: Vec<&str> = self.galera_nodes.iter().map(|n| n.node_name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        if names.len() != self.galera_nodes.len() {
            return Err(validation_error(
                "Conflict: all wsrep_node_names must be unique.",
            ));
        }

        let mut ids: Vec<u32> = self.galera_nodes.iter().map(|n| n.server_id).collect();
        ids.sort_unstable();
        ids.dedup();
        if ids.len() != self.galera_nodes.len() {
            return Err(validation_error(
                "Conflict: derived server ids must be unique across the cluster.",
            ));
        }

        if self.repl_password.len() < 8 {
            return Err(validation_error(
                "Security Error: repl_password must be at least 8 characters.",
            ));
        }

        let Some((_, sst_password)) = self.wsrep_sst_auth.split_once(':') else {
            return Err(validation_error(
                "Format Error: wsrep_sst_auth must be 'user:password'.",
            ));
        };
        if !is_complex_password(sst_password) {
            return Err(validation_error(
                "Security Error: SST password does not meet complexity standards (Upper, Lower, Num, Special).",
            ));
        }

        if !self.binlog_format.eq_ignore_ascii_case("ROW") {
            return Err(validation_error("Config Error: binlog_format must be 'ROW'."));
        }
        if !self.default_storage_engine.eq_ignore_ascii_case("InnoDB") {
            return Err(validation_error(
                "Config Error: default_storage_engine must be 'InnoDB'.",
            ));
        }
        if self.innodb_autoinc_lock_mode != 2 {
            return Err(validation_error(
                "Config Error: innodb_autoinc_lock_mode must be 2.",
            ));
        }

        // Version-specific requirements
        if self.mariadb_version.starts_with("10.5") {
            if self.expire_logs_days.is_none() {
                return Err(validation_error("10.5 Error: expire_logs_days is required."));
            }
        } else {
            if self.binlog_expire_logs_seconds.is_none() {
                return Err(validation_error(format!(
                    "MariaDB {} Error: binlog_expire_logs_seconds is required.",
                    self.mariadb_version
                )));
            }
            let wsrep_mode = self.wsrep_mode.as_deref().unwrap_or("");
            if !wsrep_mode.contains("REQUIRED_PRIMARY_KEY") {
                return Err(validation_error(format!(
                    "MariaDB {} Error: wsrep_mode must include REQUIRED_PRIMARY_KEY.",
                    self.mariadb_version
                )));
            }
        }

        Ok(())
    }
}

fn validation_error(message: impl Into<String>) -> TrackerError {
    TrackerError::ValidationError(message.into())
}

/// 8+ chars with upper, lower, digit and one accepted special character
fn is_complex_password(password: &str) -> bool {
    password.len() >= 8
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| PASSWORD_SPECIALS.contains(c))
}

//! Resource-conflict error parsing

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

// One `[<host>: <status>, Size: <size>]` occurrence per running node
static NODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^:\[\]]+):\s*([^,\]]+),\s*Size:\s*([^\]]+)\]").unwrap());

/// One already-running cluster node reported by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictNode {
    /// Node address
    pub host: String,

    /// Galera sync state, e.g. "Synced" or "Donor"
    pub status: String,

    /// Cluster size as reported by the node
    pub cluster_size: String,
}

/// Extract every node occurrence from a conflict error body, in order of
/// appearance. Returns an empty list when nothing matches.
pub fn parse(body: &str) -> Vec<ConflictNode> {
    NODE_REGEX
        .captures_iter(body)
        .map(|cap| ConflictNode {
            host: cap[1].trim().to_string(),
            status: cap[2].trim().to_string(),
            cluster_size: cap[3].trim().to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_two_nodes_in_order() {
        let nodes =
            parse("EXISTS|[10.0.0.5: Synced, Size: 3][10.0.0.6: Donor, Size: 3]");

        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].host, "10.0.0.5");
        assert_eq!(nodes[0].status, "Synced");
        assert_eq!(nodes[0].cluster_size, "3");
        assert_eq!(nodes[1].host, "10.0.0.6");
        assert_eq!(nodes[1].status, "Donor");
        assert_eq!(nodes[1].cluster_size, "3");
    }

    #[test]
    fn test_parse_no_occurrence() {
        assert!(parse("EXISTS|cluster is already provisioned").is_empty());
        assert!(parse("").is_empty());
    }

    #[test]
    fn test_parse_ignores_surrounding_text() {
        let nodes = parse("conflict on [db-node-01: Joined, Size: 2], aborting");
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].host, "db-node-01");
        assert_eq!(nodes[0].status, "Joined");
        assert_eq!(nodes[0].cluster_size, "2");
    }
}

//! Log line classification against the pipeline markers

use serde::{Deserialize, Serialize};

/// One ordered stage of the deployment pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    MariadbPrep,
    GaleraSetup,
    LvsSetup,
    AsyncSetup,
    MonitoringSetup,
}

impl Phase {
    /// All phases in pipeline order
    pub const ALL: [Phase; 5] = [
        Phase::MariadbPrep,
        Phase::GaleraSetup,
        Phase::LvsSetup,
        Phase::AsyncSetup,
        Phase::MonitoringSetup,
    ];

    /// Progress percentage reached when this phase starts
    pub fn reached_percentage(self) -> u8 {
        match self {
            Phase::MariadbPrep => 15,
            Phase::GaleraSetup => 40,
            Phase::LvsSetup => 65,
            Phase::AsyncSetup => 80,
            Phase::MonitoringSetup => 90,
        }
    }

    /// Marker substring announcing the start of this phase
    pub fn start_marker(self) -> &'static str {
        match self {
            Phase::MariadbPrep => "MARIADB_PREP_START",
            Phase::GaleraSetup => "GALERA_SETUP_START",
            Phase::LvsSetup => "LVS_SETUP_START",
            Phase::AsyncSetup => "ASYNC_SETUP_START",
            Phase::MonitoringSetup => "MONITORING_SETUP_START",
        }
    }

    /// The phase immediately before this one in pipeline order
    pub fn previous(self) -> Option<Phase> {
        match self {
            Phase::MariadbPrep => None,
            Phase::GaleraSetup => Some(Phase::MariadbPrep),
            Phase::LvsSetup => Some(Phase::GaleraSetup),
            Phase::AsyncSetup => Some(Phase::LvsSetup),
            Phase::MonitoringSetup => Some(Phase::AsyncSetup),
        }
    }

    /// Human-readable label for console output
    pub fn label(self) -> &'static str {
        match self {
            Phase::MariadbPrep => "MariaDB preparation",
            Phase::GaleraSetup => "Galera cluster setup",
            Phase::LvsSetup => "LVS load balancer setup",
            Phase::AsyncSetup => "Async replica setup",
            Phase::MonitoringSetup => "Monitoring setup",
        }
    }
}

/// Marker announcing the end of the whole pipeline
pub const COMPLETE_MARKER: &str = "DEPLOYMENT_COMPLETE";

/// Markers flagging an orchestration failure on a line
pub const FAILURE_MARKERS: [&str; 2] = ["FAILED!", "ERROR!"];

/// Phase-transition signal extracted from a single line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseSignal {
    /// A pipeline phase has started
    Start(Phase),
    /// The terminal completion marker was seen
    Complete,
}

/// Result of classifying one log line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Classification {
    /// Phase-transition signal, if any marker matched
    pub phase: Option<PhaseSignal>,
    /// Whether the line carries a failure marker
    pub failure: bool,
}

/// Classify a single raw log line.
///
/// Phase markers are tested in pipeline order with the terminal marker last;
/// the first containment match wins, so a line carrying several markers
/// resolves to the earliest pipeline stage. The failure check is independent
/// of the phase match and may fire on the same line.
pub fn classify(line: &str) -> Classification {
    let mut phase = None;
    for candidate in Phase::ALL {
        if line.contains(candidate.start_marker()) {
            phase = Some(PhaseSignal::Start(candidate));
            break;
        }
    }
    if phase.is_none() && line.contains(COMPLETE_MARKER) {
        phase = Some(PhaseSignal::Complete);
    }

    let failure = FAILURE_MARKERS.iter().any(|marker| line.contains(marker));

    Classification { phase, failure }
}

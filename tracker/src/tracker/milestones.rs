//! Milestone state machine for deployment progress

use serde::{Deserialize, Serialize};

use crate::tracker::classifier::{classify, Classification, Phase, PhaseSignal};

/// Tracked status of one pipeline phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MilestoneStatus {
    #[default]
    Pending,
    Loading,
    Done,
    Failed,
}

/// Phase -> status mapping for the five pipeline stages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestones {
    statuses: [MilestoneStatus; 5],
}

impl Milestones {
    pub fn get(&self, phase: Phase) -> MilestoneStatus {
        self.statuses[phase as usize]
    }

    fn set(&mut self, phase: Phase, status: MilestoneStatus) {
        self.statuses[phase as usize] = status;
    }

    /// (phase, status) pairs in pipeline order
    pub fn iter(&self) -> impl Iterator<Item = (Phase, MilestoneStatus)> + '_ {
        Phase::ALL.iter().map(move |&phase| (phase, self.get(phase)))
    }
}

/// Derived progress state at one point in the line sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// Overall completion percentage (0-100)
    pub percentage: u8,

    /// Per-phase milestone statuses
    pub milestones: Milestones,
}

impl Default for ProgressSnapshot {
    fn default() -> Self {
        Self::initial()
    }
}

impl ProgressSnapshot {
    /// Snapshot at the start of a fresh attempt: every phase pending, 0%
    pub fn initial() -> Self {
        Self {
            percentage: 0,
            milestones: Milestones::default(),
        }
    }

    /// Apply one classified line and produce the next snapshot.
    ///
    /// The phase signal is applied before the failure flag, so a line that
    /// both starts a phase and carries a failure marker leaves that phase
    /// failed with the percentage held at the phase threshold. The failure
    /// rule covers every loading milestone, not just the newest one.
    pub fn apply(mut self, classification: &Classification) -> Self {
        match classification.phase {
            Some(PhaseSignal::Start(phase)) => {
                if let Some(previous) = phase.previous() {
                    self.milestones.set(previous, MilestoneStatus::Done);
                }
                self.milestones.set(phase, MilestoneStatus::Loading);
                self.percentage = phase.reached_percentage();
            }
            Some(PhaseSignal::Complete) => {
                self.milestones
                    .set(Phase::MonitoringSetup, MilestoneStatus::Done);
                self.percentage = 100;
            }
            None => {}
        }

        if classification.failure {
            for phase in Phase::ALL {
                if self.milestones.get(phase) == MilestoneStatus::Loading {
                    self.milestones.set(phase, MilestoneStatus::Failed);
                }
            }
        }

        self
    }

    /// Whether any milestone has failed (pipeline halted)
    pub fn is_failed(&self) -> bool {
        Phase::ALL
            .iter()
            .any(|&phase| self.milestones.get(phase) == MilestoneStatus::Failed)
    }

    /// Whether the pipeline ran to completion
    pub fn is_complete(&self) -> bool {
        self.percentage == 100
            && Phase::ALL
                .iter()
                .all(|&phase| self.milestones.get(phase) == MilestoneStatus::Done)
    }
}

/// Fold an ordered line sequence into its final snapshot.
///
/// Replaying the same transcript always yields the same snapshot.
pub fn replay<'a, I>(lines: I) -> ProgressSnapshot
where
    I: IntoIterator<Item = &'a str>,
{
    lines
        .into_iter()
        .fold(ProgressSnapshot::initial(), |snapshot, line| {
            snapshot.apply(&classify(line))
        })
}

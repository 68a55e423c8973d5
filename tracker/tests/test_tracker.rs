//! Tracker core integration tests

use harbormon::tracker::attempt::DeploymentTracker;
use harbormon::tracker::classifier::Phase;
use harbormon::tracker::milestones::{replay, MilestoneStatus, ProgressSnapshot};

const PIPELINE_LINES: [&str; 6] = [
    "PLAY [mariadb : MARIADB_PREP_START] ****",
    "PLAY [galera : GALERA_SETUP_START] ****",
    "PLAY [lvs : LVS_SETUP_START] ****",
    "PLAY [async : ASYNC_SETUP_START] ****",
    "PLAY [monitoring : MONITORING_SETUP_START] ****",
    ">>> DEPLOYMENT_COMPLETE",
];

#[test]
fn test_percentage_follows_last_observed_phase() {
    let expected = [15u8, 40, 65, 80, 90, 100];

    for (index, &expected_percentage) in expected.iter().enumerate() {
        let snapshot = replay(PIPELINE_LINES[..=index].iter().copied());
        assert_eq!(snapshot.percentage, expected_percentage);

        // Every phase strictly before the last observed one is done
        for earlier in 0..index.min(Phase::ALL.len()) {
            assert_eq!(
                snapshot.milestones.get(Phase::ALL[earlier]),
                MilestoneStatus::Done,
                "phase {:?} after {} lines",
                Phase::ALL[earlier],
                index + 1
            );
        }
    }
}

#[test]
fn test_interleaved_noise_does_not_change_outcome() {
    let with_noise = [
        "PLAY [mariadb : MARIADB_PREP_START] ****",
        "TASK [mariadb : add repository] ****",
        "ok: [db-node-01]",
        "PLAY [galera : GALERA_SETUP_START] ****",
        "changed: [db-node-02]",
    ];

    let snapshot = replay(with_noise);
    assert_eq!(snapshot.percentage, 40);
    assert_eq!(
        snapshot.milestones.get(Phase::GaleraSetup),
        MilestoneStatus::Loading
    );
}

#[test]
fn test_replaying_transcript_reproduces_snapshot() {
    let mut tracker = DeploymentTracker::new();
    let lines = [
        "PLAY [mariadb : MARIADB_PREP_START] ****",
        "PLAY [galera : GALERA_SETUP_START] ****",
        "fatal: [db-node-03]: FAILED! => SST timed out",
    ];
    for line in lines {
        tracker.observe_line(line);
    }

    // Replaying the stored transcript yields exactly the live snapshot
    let replayed = replay(tracker.transcript().iter().map(String::as_str));
    assert_eq!(replayed, tracker.snapshot());
    assert!(replayed.is_failed());
}

#[test]
fn test_reset_then_fresh_start_matches_new_attempt() {
    let mut seasoned = DeploymentTracker::new();
    for line in PIPELINE_LINES {
        seasoned.observe_line(line);
    }
    seasoned.reset();
    seasoned.observe_line("PLAY [mariadb : MARIADB_PREP_START] ****");

    let mut fresh = DeploymentTracker::new();
    fresh.observe_line("PLAY [mariadb : MARIADB_PREP_START] ****");

    assert_eq!(seasoned.snapshot(), fresh.snapshot());
    assert_eq!(seasoned.transcript(), fresh.transcript());
}

#[test]
fn test_same_input_twice_after_reset_is_deterministic() {
    let mut tracker = DeploymentTracker::new();
    for line in PIPELINE_LINES {
        tracker.observe_line(line);
    }
    let first = tracker.snapshot();

    tracker.reset();
    assert_eq!(tracker.snapshot(), ProgressSnapshot::initial());

    for line in PIPELINE_LINES {
        tracker.observe_line(line);
    }
    assert_eq!(tracker.snapshot(), first);
}

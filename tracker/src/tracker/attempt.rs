//! State owner for one tracked deployment attempt

use tokio::sync::{broadcast, watch};
use tracing::{debug, info};
use uuid::Uuid;

use crate::tracker::buffer::LogBuffer;
use crate::tracker::classifier::classify;
use crate::tracker::milestones::ProgressSnapshot;

/// Capacity of the line feed towards presentation subscribers
const LINE_FEED_CAPACITY: usize = 1024;

/// Owns the transcript and milestone snapshot of one deployment attempt.
///
/// Single-writer discipline: exactly one stream session drives this state.
/// Presentation layers subscribe to the emitted snapshots and lines and never
/// mutate tracker internals.
pub struct DeploymentTracker {
    attempt_id: Uuid,
    buffer: LogBuffer,
    snapshot: ProgressSnapshot,
    snapshot_tx: watch::Sender<ProgressSnapshot>,
    line_tx: broadcast::Sender<String>,
}

impl DeploymentTracker {
    pub fn new() -> Self {
        let (snapshot_tx, _) = watch::channel(ProgressSnapshot::initial());
        let (line_tx, _) = broadcast::channel(LINE_FEED_CAPACITY);

        Self {
            attempt_id: Uuid::new_v4(),
            buffer: LogBuffer::new(),
            snapshot: ProgressSnapshot::initial(),
            snapshot_tx,
            line_tx,
        }
    }

    /// Identity of the current attempt
    pub fn attempt_id(&self) -> Uuid {
        self.attempt_id
    }

    /// Process one received line.
    ///
    /// The line is appended to the transcript before classification, so the
    /// transcript order always matches arrival order.
    pub fn observe_line(&mut self, line: &str) {
        self.buffer.append(line);

        let classification = classify(line);
        let next = self.snapshot.apply(&classification);
        if next.percentage != self.snapshot.percentage {
            debug!("Progress: {}% -> {}%", self.snapshot.percentage, next.percentage);
        }
        self.snapshot = next;

        self.snapshot_tx.send_replace(self.snapshot);
        // Subscribers may lag or be absent; dropped lines here only affect
        // live rendering, the transcript keeps everything.
        let _ = self.line_tx.send(line.to_string());
    }

    /// Current derived progress state
    pub fn snapshot(&self) -> ProgressSnapshot {
        self.snapshot
    }

    /// Full ordered transcript of the current attempt
    pub fn transcript(&self) -> &[String] {
        self.buffer.all()
    }

    /// Subscribe to snapshot updates
    pub fn subscribe(&self) -> watch::Receiver<ProgressSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Subscribe to the raw line feed
    pub fn subscribe_lines(&self) -> broadcast::Receiver<String> {
        self.line_tx.subscribe()
    }

    /// Discard all attempt state ahead of a fresh attempt
    pub fn reset(&mut self) {
        self.attempt_id = Uuid::new_v4();
        self.buffer.clear();
        self.snapshot = ProgressSnapshot::initial();
        self.snapshot_tx.send_replace(self.snapshot);
        info!("Tracker reset, new attempt {}", self.attempt_id);
    }
}

impl Default for DeploymentTracker {
    fn default() -> Self {
        Self::new()
    }
}

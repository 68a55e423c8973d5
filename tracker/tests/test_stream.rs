//! Stream session integration tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{oneshot, watch};

use harbormon::errors::TrackerError;
use harbormon::stream::session::{run, Options, StreamConnectionState, StreamSession};
use harbormon::stream::sse::{LogStream, StreamConnector};
use harbormon::tracker::attempt::DeploymentTracker;

/// Stream serving a fixed script of lines, then a server-side close
struct ScriptedStream {
    lines: VecDeque<String>,
}

#[async_trait]
impl LogStream for ScriptedStream {
    async fn next_line(&mut self) -> Result<Option<String>, TrackerError> {
        Ok(self.lines.pop_front())
    }
}

/// Connector running through scripted connection attempts.
///
/// Each `Some(lines)` entry opens a stream serving those lines; each `None`
/// entry fails to open. Once the script is exhausted the connector signals
/// `exhausted` and parks until the session is shut down.
struct ScriptedConnector {
    attempts: Mutex<VecDeque<Option<Vec<&'static str>>>>,
    opens: Arc<AtomicUsize>,
    exhausted: Mutex<Option<oneshot::Sender<()>>>,
}

impl ScriptedConnector {
    fn new(attempts: Vec<Option<Vec<&'static str>>>, exhausted: oneshot::Sender<()>) -> Self {
        Self::with_counter(attempts, exhausted, Arc::new(AtomicUsize::new(0)))
    }

    fn with_counter(
        attempts: Vec<Option<Vec<&'static str>>>,
        exhausted: oneshot::Sender<()>,
        opens: Arc<AtomicUsize>,
    ) -> Self {
        Self {
            attempts: Mutex::new(attempts.into()),
            opens,
            exhausted: Mutex::new(Some(exhausted)),
        }
    }

    fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StreamConnector for ScriptedConnector {
    type Stream = ScriptedStream;

    async fn open(&self) -> Result<ScriptedStream, TrackerError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        let next = self.attempts.lock().unwrap().pop_front();
        match next {
            Some(Some(lines)) => Ok(ScriptedStream {
                lines: lines.into_iter().map(String::from).collect(),
            }),
            Some(None) => Err(TrackerError::StreamError("connection refused".to_string())),
            None => {
                if let Some(tx) = self.exhausted.lock().unwrap().take() {
                    let _ = tx.send(());
                }
                std::future::pending().await
            }
        }
    }
}

#[tokio::test]
async fn test_failed_attempts_leave_transcript_untouched() {
    let (exhausted_tx, exhausted_rx) = oneshot::channel();
    let connector = ScriptedConnector::new(vec![None, None, None], exhausted_tx);
    let mut tracker = DeploymentTracker::new();
    let (state_tx, state_rx) = watch::channel(StreamConnectionState::Disconnected);

    run(
        &Options {
            reconnect_delay: Duration::from_secs(3),
        },
        &connector,
        &mut tracker,
        &state_tx,
        |_| std::future::ready(()),
        Box::pin(async move {
            let _ = exhausted_rx.await;
        }),
    )
    .await;

    // Three failed opens plus the parked fourth attempt
    assert_eq!(connector.opens(), 4);
    assert!(tracker.transcript().is_empty());
    assert_eq!(tracker.snapshot().percentage, 0);
    assert_eq!(*state_rx.borrow(), StreamConnectionState::Disconnected);
}

#[tokio::test]
async fn test_lines_flow_in_arrival_order_across_reconnects() {
    let (exhausted_tx, exhausted_rx) = oneshot::channel();
    let connector = ScriptedConnector::new(
        vec![
            Some(vec!["PLAY [MARIADB_PREP_START]", "ok: [db-node-01]"]),
            None,
            Some(vec!["PLAY [GALERA_SETUP_START]"]),
        ],
        exhausted_tx,
    );
    let mut tracker = DeploymentTracker::new();
    let (state_tx, _state_rx) = watch::channel(StreamConnectionState::Disconnected);

    run(
        &Options {
            reconnect_delay: Duration::from_secs(3),
        },
        &connector,
        &mut tracker,
        &state_tx,
        |_| std::future::ready(()),
        Box::pin(async move {
            let _ = exhausted_rx.await;
        }),
    )
    .await;

    let transcript: Vec<&str> = tracker.transcript().iter().map(String::as_str).collect();
    assert_eq!(
        transcript,
        vec![
            "PLAY [MARIADB_PREP_START]",
            "ok: [db-node-01]",
            "PLAY [GALERA_SETUP_START]",
        ]
    );
    assert_eq!(tracker.snapshot().percentage, 40);
}

#[tokio::test]
async fn test_dropping_desire_cancels_pending_reconnect() {
    let (sleeping_tx, sleeping_rx) = oneshot::channel::<()>();
    let sleeping_tx = Mutex::new(Some(sleeping_tx));
    let (exhausted_tx, _exhausted_rx) = oneshot::channel();
    let connector = ScriptedConnector::new(vec![None], exhausted_tx);
    let mut tracker = DeploymentTracker::new();
    let (state_tx, _state_rx) = watch::channel(StreamConnectionState::Disconnected);

    run(
        &Options::default(),
        &connector,
        &mut tracker,
        &state_tx,
        |_| {
            // Signal that the reconnect delay is pending, then never complete
            if let Some(tx) = sleeping_tx.lock().unwrap().take() {
                let _ = tx.send(());
            }
            std::future::pending::<()>()
        },
        Box::pin(async move {
            // Desire drops while the reconnect delay is pending
            let _ = sleeping_rx.await;
        }),
    )
    .await;

    // The scheduled reconnection never produced a second attempt
    assert_eq!(connector.opens(), 1);
}

#[tokio::test]
async fn test_session_stop_cancels_and_returns_tracker() {
    let (exhausted_tx, exhausted_rx) = oneshot::channel();
    let opens = Arc::new(AtomicUsize::new(0));
    let connector = ScriptedConnector::with_counter(
        vec![Some(vec![
            "PLAY [MARIADB_PREP_START]",
            "PLAY [GALERA_SETUP_START]",
            "PLAY [LVS_SETUP_START]",
            "PLAY [ASYNC_SETUP_START]",
            "PLAY [MONITORING_SETUP_START]",
            ">>> DEPLOYMENT_COMPLETE",
        ])],
        exhausted_tx,
        opens.clone(),
    );

    let session = StreamSession::spawn(
        Options {
            reconnect_delay: Duration::from_millis(1),
        },
        connector,
        DeploymentTracker::new(),
    );
    let state_rx = session.connection_state();

    // Wait for the stream to be consumed and the next attempt to park
    exhausted_rx.await.unwrap();
    let tracker = session.stop().await.unwrap();

    assert!(tracker.snapshot().is_complete());
    assert_eq!(tracker.snapshot().percentage, 100);
    assert_eq!(tracker.transcript().len(), 6);
    assert_eq!(*state_rx.borrow(), StreamConnectionState::Disconnected);
    assert_eq!(opens.load(Ordering::SeqCst), 2);
}

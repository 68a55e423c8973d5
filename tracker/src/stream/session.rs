//! Stream session worker and reconnection policy

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::errors::TrackerError;
use crate::stream::sse::{LogStream, StreamConnector};
use crate::tracker::attempt::DeploymentTracker;

/// Connection state of the logical log-stream subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Stream session options
#[derive(Debug, Clone)]
pub struct Options {
    /// Fixed delay before each reconnection attempt
    pub reconnect_delay: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            reconnect_delay: Duration::from_secs(3),
        }
    }
}

/// Run the stream session worker.
///
/// Manages one logical subscription across any number of physical connection
/// attempts: open, forward every received line to the tracker, and on any
/// disconnect wait the fixed delay and reopen. There is no retry ceiling and
/// no backoff growth; the peer is a single trusted control plane. The
/// shutdown future is the session-desire signal and races every await, so a
/// pending delay or in-flight open attempt is cancelled as soon as desire
/// drops.
pub async fn run<C, S, F>(
    options: &Options,
    connector: &C,
    tracker: &mut DeploymentTracker,
    state_tx: &watch::Sender<StreamConnectionState>,
    sleep_fn: S,
    mut shutdown_signal: Pin<Box<dyn Future<Output = ()> + Send>>,
) where
    C: StreamConnector,
    S: Fn(Duration) -> F,
    F: Future<Output = ()>,
{
    info!("Stream session starting...");

    loop {
        state_tx.send_replace(StreamConnectionState::Connecting);

        let opened = tokio::select! {
            _ = &mut shutdown_signal => {
                state_tx.send_replace(StreamConnectionState::Disconnected);
                info!("Stream session shutting down...");
                return;
            }
            opened = connector.open() => opened,
        };

        match opened {
            Ok(mut stream) => {
                state_tx.send_replace(StreamConnectionState::Connected);
                info!("Log stream connected");

                loop {
                    tokio::select! {
                        _ = &mut shutdown_signal => {
                            state_tx.send_replace(StreamConnectionState::Disconnected);
                            info!("Stream session shutting down...");
                            return;
                        }
                        received = stream.next_line() => match received {
                            Ok(Some(line)) => tracker.observe_line(&line),
                            Ok(None) => {
                                info!("Log stream closed by server");
                                break;
                            }
                            Err(e) => {
                                warn!("Log stream error: {}, reconnecting...", e);
                                break;
                            }
                        }
                    }
                }
            }
            Err(e) => {
                warn!("Failed to open log stream: {}, retrying...", e);
            }
        }

        state_tx.send_replace(StreamConnectionState::Disconnected);

        // Fixed-delay retry; shutdown during the wait cancels the pending
        // reconnection attempt.
        tokio::select! {
            _ = &mut shutdown_signal => {
                info!("Stream session shutting down...");
                return;
            }
            _ = sleep_fn(options.reconnect_delay) => {}
        }
    }
}

/// Handle for one spawned stream session.
///
/// Owns the desire flag and the worker task; dropping desire to false is the
/// only way the session ends, and it also cancels any scheduled reconnection.
pub struct StreamSession {
    state_rx: watch::Receiver<StreamConnectionState>,
    desire_tx: watch::Sender<bool>,
    handle: JoinHandle<DeploymentTracker>,
}

impl StreamSession {
    /// Spawn a session worker that owns the tracker for its lifetime
    pub fn spawn<C>(options: Options, connector: C, mut tracker: DeploymentTracker) -> Self
    where
        C: StreamConnector + 'static,
        C::Stream: 'static,
    {
        let (state_tx, state_rx) = watch::channel(StreamConnectionState::Disconnected);
        let (desire_tx, mut desire_rx) = watch::channel(true);

        let handle = tokio::spawn(async move {
            let desire_dropped = Box::pin(async move {
                while desire_rx.changed().await.is_ok() {
                    if !*desire_rx.borrow() {
                        break;
                    }
                }
            });

            run(
                &options,
                &connector,
                &mut tracker,
                &state_tx,
                tokio::time::sleep,
                desire_dropped,
            )
            .await;

            tracker
        });

        Self {
            state_rx,
            desire_tx,
            handle,
        }
    }

    /// Subscribe to connection-state changes
    pub fn connection_state(&self) -> watch::Receiver<StreamConnectionState> {
        self.state_rx.clone()
    }

    /// Drop session desire and wait for the worker to wind down.
    ///
    /// Returns the tracker so the final transcript and snapshot survive the
    /// session.
    pub async fn stop(self) -> Result<DeploymentTracker, TrackerError> {
        let _ = self.desire_tx.send(false);
        self.handle
            .await
            .map_err(|e| TrackerError::ShutdownError(e.to_string()))
    }
}

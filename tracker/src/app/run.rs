//! Main application run loop

use std::future::Future;

use tokio::sync::broadcast;
use tracing::{error, info};

use crate::app::options::AppOptions;
use crate::console;
use crate::errors::TrackerError;
use crate::http::client::HttpClient;
use crate::models::spec::DeploymentSpec;
use crate::stream::session::StreamSession;
use crate::stream::sse::SseConnector;
use crate::tracker::attempt::DeploymentTracker;

/// Run one tracked deployment attempt.
///
/// Resets the attempt state, starts the log-stream session (session desire
/// true), submits the deployment, prints the outcome and winds the session
/// down (desire false, cancelling any pending reconnection).
pub async fn run(
    options: AppOptions,
    mut spec: DeploymentSpec,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), TrackerError> {
    info!("Initializing Harbor Master tracker...");

    spec.assign_server_ids();
    spec.validate()?;

    let http_client = HttpClient::new(&options.backend_base_url, &options.role)?;

    // Fresh attempt state; a reset always precedes a new session
    let mut tracker = DeploymentTracker::new();
    tracker.reset();
    let line_rx = tracker.subscribe_lines();
    let snapshot_rx = tracker.subscribe();

    let connector = SseConnector::new(&options.backend_base_url, &options.stream_path)?;
    let session = StreamSession::spawn(options.stream.clone(), connector, tracker);

    let (console_shutdown_tx, mut console_shutdown_rx) = broadcast::channel::<()>(1);
    let console_handle = tokio::spawn(console::run(
        line_rx,
        snapshot_rx,
        session.connection_state(),
        Box::pin(async move {
            let _ = console_shutdown_rx.recv().await;
        }),
    ));

    // Submit the deployment while the session tails the log stream
    let outcome = tokio::select! {
        _ = shutdown_signal => {
            info!("Shutdown signal received, shutting down...");
            None
        }
        outcome = http_client.deploy(&spec) => Some(outcome),
    };

    match &outcome {
        Some(Ok(report)) => console::print_report(report),
        Some(Err(TrackerError::DeployRejected(failure))) => console::print_failure(failure),
        Some(Err(e)) => error!("Deploy call failed: {}", e),
        None => {}
    }

    // Wind down: dropping session desire also cancels a pending reconnection
    let tracker = session.stop().await?;
    let _ = console_shutdown_tx.send(());
    console_handle
        .await
        .map_err(|e| TrackerError::ShutdownError(e.to_string()))?;

    info!(
        "Attempt {} finished with {} transcript line(s) at {}%",
        tracker.attempt_id(),
        tracker.transcript().len(),
        tracker.snapshot().percentage
    );

    match outcome {
        Some(Err(e)) => Err(e),
        _ => Ok(()),
    }
}

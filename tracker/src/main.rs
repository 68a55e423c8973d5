//! Harbor Master Tracker - Entry Point
//!
//! Submits a cluster deployment to the Harbor Master control plane and tails
//! the orchestration log stream, tracking milestones and progress.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use harbormon::app::options::AppOptions;
use harbormon::app::run::run;
use harbormon::logs::{init_logging, LogOptions};
use harbormon::models::spec::DeploymentSpec;
use harbormon::storage::settings::Settings;
use harbormon::stream::session;
use harbormon::utils::version_info;

use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut cli_args: HashMap<String, String> = HashMap::new();

    for arg in args.iter().skip(1) {
        if let Some((key, value)) = arg.split_once('=') {
            // Handle --key=value format
            let clean_key = key.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), value.to_string());
        } else if arg.starts_with("--") {
            // Handle standalone flags like --version
            let clean_key = arg.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), "true".to_string());
        }
    }

    // Print version and exit
    if cli_args.contains_key("version") {
        println!("{}", serde_json::to_string_pretty(&version_info()).unwrap());
        return;
    }

    // Retrieve the settings file
    let settings_path = cli_args
        .get("settings")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/etc/harbormon/settings.json"));
    let settings = match Settings::load(&settings_path).await {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Unable to read settings file: {}", e);
            return;
        }
    };

    // Initialize logging
    let log_level = cli_args
        .get("log-level")
        .and_then(|level| level.parse().ok())
        .unwrap_or(settings.log_level);
    let log_options = LogOptions {
        log_level,
        ..Default::default()
    };
    let _log_guard = match init_logging(log_options) {
        Ok(guard) => guard,
        Err(e) => {
            println!("Failed to initialize logging: {e}");
            None
        }
    };

    // The deployment spec file is required
    let Some(spec_path) = cli_args.get("spec") else {
        error!("No deployment spec provided");
        error!("Run: harbormon --spec=<deployment.json> [--settings=<settings.json>] [--role=<role>]");
        return;
    };
    let spec: DeploymentSpec = match tokio::fs::read_to_string(spec_path).await {
        Ok(raw) => match serde_json::from_str(&raw) {
            Ok(spec) => spec,
            Err(e) => {
                error!("Invalid deployment spec {}: {}", spec_path, e);
                return;
            }
        },
        Err(e) => {
            error!("Unable to read deployment spec {}: {}", spec_path, e);
            return;
        }
    };

    // Run the tracker
    let options = AppOptions {
        backend_base_url: cli_args
            .get("backend")
            .cloned()
            .unwrap_or_else(|| settings.backend.base_url.clone()),
        stream_path: settings.backend.stream_path.clone(),
        role: cli_args
            .get("role")
            .cloned()
            .unwrap_or_else(|| settings.role.clone()),
        stream: session::Options {
            reconnect_delay: Duration::from_secs(settings.reconnect_delay_secs),
        },
    };

    info!("Running Harbor Master tracker with options: {:?}", options);
    if let Err(e) = run(options, spec, await_shutdown_signal()).await {
        error!("Deployment attempt failed: {e}");
        std::process::exit(1);
    }
}

async fn await_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).unwrap();
        let mut sigint = signal(SignalKind::interrupt()).unwrap();

        tokio::select! {
            _ = sigterm.recv() => {
                info!("SIGTERM received, shutting down...");
            }
            _ = sigint.recv() => {
                info!("SIGINT received, shutting down...");
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl+C received, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
        info!("Ctrl+C received, shutting down...");
    }
}

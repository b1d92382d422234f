//! # DualSense Overlay
//!
//! Live view of a PS5 DualSense controller's input state.
//!
//! This application polls the first connected controller once per display
//! frame, rate-limited to the configured poll interval, and prints the
//! normalized snapshot to stdout as a status line or as JSON Lines.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

use dualsense_overlay::config::Config;
use dualsense_overlay::controller::ps5::DualSenseSource;
use dualsense_overlay::display::run_display;
use dualsense_overlay::poller::clock::IntervalClock;
use dualsense_overlay::poller::{run, Poller};

/// Config file used when no path is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Main entry point for DualSense Overlay
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Set up logging with tracing subscriber
///    - Load configuration (argv[1], else `config/default.toml`, else defaults)
///    - Attach to the controller, or keep rescanning until one appears
///
/// 2. **Main Loop**
///    - Poll loop publishes a fresh snapshot at most once per poll interval
///    - Display task renders the latest snapshot to stdout
///
/// 3. **Graceful Shutdown**
///    - Ctrl+C cancels the display and tears down the poll loop
///
/// # Examples
///
/// ```bash
/// cargo run --release -- config/default.toml
/// ```
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays a clean status stream
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("DualSense Overlay v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = load_config(std::env::args().nth(1).map(PathBuf::from))?;

    let source = DualSenseSource::from_config(&config.controller);
    let poller = Poller::with_interval(
        source,
        Duration::from_millis(config.poller.poll_interval_ms),
    );
    let handle = run::spawn(poller, IntervalClock::new(config.poller.frame_rate_hz));

    let cancel = CancellationToken::new();
    let display = tokio::spawn({
        let state = handle.subscribe();
        let display_config = config.display.clone();
        let cancel = cancel.clone();
        async move { run_display(state, &display_config, std::io::stdout(), cancel).await }
    });

    info!("Press Ctrl+C to exit");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;
    info!("Received Ctrl+C, shutting down...");

    cancel.cancel();
    if let Err(e) = display.await {
        tracing::warn!("Display task failed: {}", e);
    }

    if let Some(poller) = handle.teardown().await {
        info!("Total snapshots published: {}", poller.emissions());
    }

    Ok(())
}

/// Resolves and loads the configuration.
fn load_config(arg: Option<PathBuf>) -> Result<Config> {
    match arg {
        Some(path) => Config::load(&path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            Config::load(Path::new(DEFAULT_CONFIG_PATH))
                .with_context(|| format!("Failed to load config from {}", DEFAULT_CONFIG_PATH))
        }
        None => {
            info!("No config file found, using defaults");
            Ok(Config::default())
        }
    }
}

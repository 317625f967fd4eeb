//! Tank Pilot - fly a tank in a tick-based battle from the keyboard
//!
//! This is the main entry point. It handles:
//! - Reading key events from the terminal
//! - Running the per-tick pilot loop against the sandbox battle
//! - Tracking opponent bearings from radar sightings
//! - Rendering the HUD

mod app;
mod config;
mod host;
mod hud;
mod input;
mod pilot;
mod radar;
mod util;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::AppState;
use crate::config::{Config, OutputFormat};
use crate::host::SandboxHost;
use crate::input::terminal::TerminalInput;
use crate::input::{KeyBindings, CONTROLS_LEGEND};
use crate::pilot::Pilot;
use crate::util::rate_limit::InputRateLimiter;
use crate::util::time::Timer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config.log_level, config.log_format);

    info!("Starting Tank Pilot");
    info!(
        tps = config.sandbox_tps,
        smoothing = config.smoothing.enabled,
        alpha = config.smoothing.alpha,
        "Sandbox battle"
    );
    info!("Controls: {}", CONTROLS_LEGEND);

    let state = AppState::new(config.clone());

    let host = SandboxHost::new(config.sandbox());
    let stop = host.stop_handle();
    let (pilot, handle) = Pilot::new(
        host,
        state.keys.clone(),
        KeyBindings::default(),
        state.tracker.clone(),
    );

    spawn_terminal_input(&state);

    if config.hud_interval_ticks > 0 {
        tokio::spawn(hud::run_hud(
            handle.subscribe(),
            tokio::io::stdout(),
            config.hud_interval_ticks,
            config.hud_format,
        ));
    }

    tokio::spawn(async move {
        shutdown_signal().await;
        stop.stop();
    });

    let timer = Timer::new();
    let summary = pilot.run().await;

    info!(
        ticks = summary.ticks,
        shots_fired = summary.shots_fired,
        opponents = state.tracker.len(),
        elapsed_ms = timer.elapsed_ms(),
        "Tank Pilot shutdown complete"
    );
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str, format: OutputFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    match format {
        OutputFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init(),
        OutputFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }
}

/// Feed stdin lines to the key state from a dedicated thread
fn spawn_terminal_input(state: &AppState) {
    let input = TerminalInput::new(
        state.keys.clone(),
        state.tracker.clone(),
        InputRateLimiter::new(state.config.input_rate_limit),
    );

    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        if let Err(e) = input.run(stdin.lock()) {
            error!(error = %e, "Terminal input failed");
        }
    });
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, ending battle");
        }
        _ = terminate => {
            info!("Received terminate signal, ending battle");
        }
    }
}

//! CCPatch - BeatStep CC patch calibration

use anyhow::{Context, Result};
use ccpatch::cli::Args;
use ccpatch::config::AppConfig;
use ccpatch::engine::{Engine, FeedbackScheduler};
use ccpatch::midi::format_hex;
use ccpatch::transport::{self, InboundEvent, InputPort, OutputPort};
use clap::Parser;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const CLIENT_NAME: &str = "ccpatch";

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    init_logging(&level)?;

    info!("Starting CCPatch v{}...", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::discover().context("Failed to load configuration")?;
    debug!("Configuration: {:?}", config);

    transport::log_available_ports();

    let controller = Arc::new(OutputPort::new(
        &config.controller_port,
        format!("{}-controller-out", CLIENT_NAME),
        config.reconnect_interval(),
    ));
    if let Err(e) = controller.connect() {
        warn!("Controller output not available yet: {}", e);
    }

    let instrument = Arc::new(OutputPort::new(
        &config.instrument_port,
        format!("{}-instrument-out", CLIENT_NAME),
        config.reconnect_interval(),
    ));
    if let Err(e) = instrument.connect() {
        warn!("Instrument output not available yet: {}", e);
    }

    let (event_tx, mut event_rx) = mpsc::channel::<InboundEvent>(1000);
    let mut input = InputPort::new(
        &config.controller_port,
        format!("{}-controller-in", CLIENT_NAME),
        event_tx,
    );
    if let Err(e) = input.connect() {
        warn!("Controller input not available yet: {}", e);
    }

    let engine = Engine::new(controller, instrument, config.patch_dir.clone());
    let feedback = FeedbackScheduler::spawn(engine.clone(), config.feedback_delay());
    let engine = engine.with_feedback(feedback);

    engine.configure_device();

    if let Some(path) = &args.patch {
        if let Err(e) = engine.load_patch(path) {
            debug!("Starting with an empty patch: {}", e);
        }
    }

    info!("Ready. Turn knobs to record, Stop to save a patch.");

    let mut reconnect = tokio::time::interval(config.reconnect_interval());
    reconnect.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            Some(event) = event_rx.recv() => {
                trace!("{} <- {} [{}]", event.source, event.message, format_hex(&event.raw));
                engine.on_message(&event.message);
            }
            _ = reconnect.tick() => {
                if !input.check_alive() {
                    debug!("Reconnecting controller input '{}'", input.pattern());
                    match input.connect() {
                        Ok(()) => engine.configure_device(),
                        Err(e) => debug!("Controller input still unavailable: {}", e),
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    info!("CCPatch stopped");
    Ok(())
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .init();

    Ok(())
}

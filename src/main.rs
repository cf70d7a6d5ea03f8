//! ST7735 TFT panel driver for Raspberry Pi
//!
//! A small service that:
//! - Drives a 160x128 ST7735 panel over SPI with GPIO control lines
//! - Draws text, lines, rectangles and images in RGB565
//! - Keeps a status screen refreshed until SIGINT/SIGTERM

mod config;
mod display;
mod image_proc;
mod scheduler;

use clap::Parser;
use config::{Config, DEFAULT_CONFIG_PATH};
use display::DisplayController;
use scheduler::Scheduler;
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "st7735-panel")]
#[command(about = "ST7735 TFT panel driver for Raspberry Pi")]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Orientation (0 = landscape, 1 = portrait), overrides config
    #[arg(short, long)]
    orientation: Option<u8>,

    /// Show test pattern and exit
    #[arg(long)]
    test: bool,

    /// Clear display and exit
    #[arg(long)]
    clear: bool,

    /// Draw text and exit
    #[arg(long, value_name = "STRING")]
    text: Option<String>,

    /// Draw an image file (PNG/JPEG) and exit
    #[arg(long, value_name = "PATH")]
    image: Option<String>,

    /// Write the effective configuration (file plus overrides) back to --config and exit
    #[arg(long)]
    save_config: bool,
}

/// Using current_thread runtime for single-core boards
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = Config::load(&args.config).unwrap_or_else(|e| {
        eprintln!("Failed to load config from {}: {}, using defaults", args.config, e);
        Config::default()
    });
    if let Some(orientation) = args.orientation {
        config.orientation = orientation;
    }

    init_logging(args.verbose || config.verbose);

    tracing::info!("Starting ST7735 panel driver");

    if args.save_config {
        config.validate()?;
        config.save(&args.config)?;
        tracing::info!("Configuration written to {}", args.config);
        return Ok(());
    }

    let display = DisplayController::new(config.clone());

    // Handle one-shot commands
    if args.test {
        tracing::info!("Running test pattern...");
        display.test_pattern().await?;
        tracing::info!("Test pattern complete");
        return Ok(());
    }

    if args.clear {
        tracing::info!("Clearing display...");
        display.init().await?;
        display.clear(config.background_color()).await?;
        tracing::info!("Display cleared");
        return Ok(());
    }

    if let Some(text) = &args.text {
        display.init().await?;
        display
            .show_text(text, config.foreground_color(), config.background_color())
            .await?;
        return Ok(());
    }

    if let Some(path) = &args.image {
        image_proc::show_image(&display, path, &config).await?;
        return Ok(());
    }

    // Setup shutdown signal handling
    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    let scheduler = Scheduler::new(config, display.clone());

    let scheduler_shutdown = shutdown_tx.subscribe();
    let scheduler_handle = tokio::spawn(async move {
        scheduler.run(scheduler_shutdown).await;
    });

    wait_for_shutdown().await?;
    tracing::info!("Shutdown signal received");

    let _ = shutdown_tx.send(());

    tokio::select! {
        _ = scheduler_handle => {},
        _ = tokio::time::sleep(std::time::Duration::from_secs(5)) => {
            tracing::warn!("Scheduler shutdown timeout");
        }
    }

    if let Err(e) = display.sleep().await {
        tracing::error!("Failed to put display to sleep: {}", e);
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
///
/// Default level is "warn" to minimize SD card wear from log writes.
/// Use --verbose flag for "debug" level during development/troubleshooting.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("st7735_panel={}", level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
async fn wait_for_shutdown() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = sigterm.recv() => {
            tracing::info!("Received SIGTERM");
        }
        _ = sigint.recv() => {
            tracing::info!("Received SIGINT");
        }
    }

    Ok(())
}

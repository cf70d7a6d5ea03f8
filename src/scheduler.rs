//! Refresh scheduler for the status screen.
//!
//! Redraws the title, local date/time and panel orientation at a configurable
//! interval until shutdown.

use crate::config::Config;
use crate::display::{DisplayController, Orientation};
use chrono::{DateTime, Local, TimeZone};
use std::time::Duration;
use tokio::sync::broadcast;

/// Title drawn in scaled glyphs at the top of the status screen
const TITLE: &str = "ST7735";

/// Scheduler for periodic status redraws
pub struct Scheduler {
    config: Config,
    display: DisplayController,
}

impl Scheduler {
    /// Create a new scheduler
    pub fn new(config: Config, display: DisplayController) -> Self {
        Self { config, display }
    }

    /// Run the scheduler loop
    ///
    /// Draws immediately, then once per configured interval. Listens for the
    /// shutdown signal to stop.
    pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!("Scheduler started");

        let interval = Duration::from_secs(self.config.refresh_interval_secs);

        loop {
            self.refresh_display().await;

            tracing::debug!("Next refresh in {:?}", interval);

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = shutdown.recv() => {
                    tracing::info!("Scheduler shutting down");
                    break;
                }
            }
        }
    }

    /// Draw one status frame
    async fn refresh_display(&self) {
        let lines = status_lines(Local::now(), Orientation::from(self.config.orientation));

        let result = match self.display.init().await {
            Ok(()) => {
                self.display
                    .show_status(
                        &lines,
                        self.config.foreground_color(),
                        self.config.background_color(),
                    )
                    .await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => tracing::debug!("Status screen refreshed"),
            Err(e) if e.is_timeout() => tracing::warn!("Status refresh timed out: {}", e),
            Err(e) => tracing::error!("Status refresh failed: {}", e),
        }
    }
}

/// Text lines of the status screen; the first is the title
pub fn status_lines<Tz>(now: DateTime<Tz>, orientation: Orientation) -> Vec<String>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let (width, height) = orientation.dimensions();
    let label = match orientation {
        Orientation::Landscape => "landscape",
        Orientation::Portrait => "portrait",
    };

    vec![
        TITLE.to_string(),
        now.format("%Y-%m-%d").to_string(),
        now.format("%H:%M:%S").to_string(),
        format!("{} {}x{}", label, width, height),
    ]
}

//! Configuration management for the TFT panel.
//!
//! Handles loading, saving, and validating configuration from JSON files.

use crate::display::color::pack_color;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "/opt/st7735-panel/config.json";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// SPI bus and control line wiring (BCM pin numbering)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WiringConfig {
    /// SPI bus (0 or 1)
    #[serde(default)]
    pub spi_bus: u8,

    /// Hardware slave select line (0-2)
    #[serde(default)]
    pub slave_select: u8,

    /// SPI clock in Hz
    #[serde(default = "default_clock_speed_hz")]
    pub clock_speed_hz: u32,

    /// SPI mode (0-3); the ST7735 samples on the second edge with clock idle high
    #[serde(default = "default_spi_mode")]
    pub spi_mode: u8,

    /// Data/Command select pin
    #[serde(default = "default_dc_pin")]
    pub dc_pin: u8,

    /// Reset pin
    #[serde(default = "default_rst_pin")]
    pub rst_pin: u8,

    /// Backlight enable pin
    #[serde(default = "default_backlight_pin")]
    pub backlight_pin: u8,

    /// Software chip-select pin. When set, chip-select is held for a whole
    /// pixel stream. Left unset, the hardware CE line is toggled by spidev at
    /// every 4096-byte chunk (2048 samples); the ST7735 keeps accepting
    /// samples across the gap because DC stays high after RAMWR.
    #[serde(default)]
    pub cs_pin: Option<u8>,
}

fn default_clock_speed_hz() -> u32 {
    16_000_000
}

fn default_spi_mode() -> u8 {
    3
}

fn default_dc_pin() -> u8 {
    25
}

fn default_rst_pin() -> u8 {
    24
}

fn default_backlight_pin() -> u8 {
    18
}

impl Default for WiringConfig {
    fn default() -> Self {
        Self {
            spi_bus: 0,
            slave_select: 0,
            clock_speed_hz: default_clock_speed_hz(),
            spi_mode: default_spi_mode(),
            dc_pin: default_dc_pin(),
            rst_pin: default_rst_pin(),
            backlight_pin: default_backlight_pin(),
            cs_pin: None,
        }
    }
}

impl WiringConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.spi_bus > 1 {
            return Err(ConfigError::ValidationError(
                "spi_bus must be 0 or 1".to_string(),
            ));
        }

        if self.slave_select > 2 {
            return Err(ConfigError::ValidationError(
                "slave_select must be between 0 and 2".to_string(),
            ));
        }

        if self.spi_mode > 3 {
            return Err(ConfigError::ValidationError(
                "spi_mode must be between 0 and 3".to_string(),
            ));
        }

        if self.clock_speed_hz < 100_000 || self.clock_speed_hz > 32_000_000 {
            return Err(ConfigError::ValidationError(
                "clock_speed_hz must be between 100000 and 32000000".to_string(),
            ));
        }

        let mut pins = vec![
            ("dc_pin", self.dc_pin),
            ("rst_pin", self.rst_pin),
            ("backlight_pin", self.backlight_pin),
        ];
        if let Some(cs) = self.cs_pin {
            pins.push(("cs_pin", cs));
        }

        for (name, pin) in &pins {
            if *pin > 27 {
                return Err(ConfigError::ValidationError(format!(
                    "{} must be a BCM GPIO between 0 and 27, got {}",
                    name, pin
                )));
            }
        }

        for (i, (name, pin)) in pins.iter().enumerate() {
            if let Some((other, _)) = pins[i + 1..].iter().find(|(_, p)| p == pin) {
                return Err(ConfigError::ValidationError(format!(
                    "{} and {} are both assigned to GPIO {}",
                    name, other, pin
                )));
            }
        }

        Ok(())
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// SPI and GPIO wiring
    #[serde(default)]
    pub wiring: WiringConfig,

    /// Panel orientation: 0 = landscape 160x128, anything else portrait 128x160
    #[serde(default)]
    pub orientation: u8,

    /// Upper bound for a single bus transfer in milliseconds
    #[serde(default = "default_transfer_timeout_ms")]
    pub transfer_timeout_ms: u64,

    /// Row offset of the visible area
    #[serde(default)]
    pub margin_row: u16,

    /// Column offset of the visible area
    #[serde(default)]
    pub margin_col: u16,

    /// Status screen refresh interval in seconds
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    /// Text color as [r, g, b]
    #[serde(default = "default_foreground")]
    pub foreground: [u8; 3],

    /// Background color as [r, g, b]
    #[serde(default)]
    pub background: [u8; 3],

    /// Image rotation in degrees (0, 90, 180, 270)
    #[serde(default)]
    pub rotation: u16,

    /// Horizontal mirror
    #[serde(default)]
    pub mirror_h: bool,

    /// Vertical mirror
    #[serde(default)]
    pub mirror_v: bool,

    /// Scale image to fit display (letterbox) instead of filling it (crop)
    #[serde(default = "default_true")]
    pub scale_to_fit: bool,

    /// Enable verbose logging
    #[serde(default)]
    pub verbose: bool,
}

fn default_transfer_timeout_ms() -> u64 {
    5000
}

fn default_refresh_interval_secs() -> u64 {
    30
}

fn default_foreground() -> [u8; 3] {
    [255, 255, 255]
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wiring: WiringConfig::default(),
            orientation: 0,
            transfer_timeout_ms: default_transfer_timeout_ms(),
            margin_row: 0,
            margin_col: 0,
            refresh_interval_secs: default_refresh_interval_secs(),
            foreground: default_foreground(),
            background: [0, 0, 0],
            rotation: 0,
            mirror_h: false,
            mirror_v: false,
            scale_to_fit: true,
            verbose: false,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file atomically
    ///
    /// Writes to a temporary file and renames it over the target, so a power
    /// cut never leaves a half-written config behind.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)?;

        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, &content)?;

        std::fs::rename(&tmp_path, path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp_path);
            ConfigError::ReadError(e)
        })?;

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.wiring.validate()?;

        if self.transfer_timeout_ms == 0 || self.transfer_timeout_ms > 60_000 {
            return Err(ConfigError::ValidationError(
                "transfer_timeout_ms must be between 1 and 60000".to_string(),
            ));
        }

        if self.margin_row > 32 || self.margin_col > 32 {
            return Err(ConfigError::ValidationError(
                "margin_row and margin_col must not exceed 32".to_string(),
            ));
        }

        if self.refresh_interval_secs < 1 || self.refresh_interval_secs > 86_400 {
            return Err(ConfigError::ValidationError(
                "refresh_interval_secs must be between 1 and 86400".to_string(),
            ));
        }

        if !matches!(self.rotation, 0 | 90 | 180 | 270) {
            return Err(ConfigError::ValidationError(
                "rotation must be 0, 90, 180, or 270".to_string(),
            ));
        }

        Ok(())
    }

    /// Foreground as RGB565
    pub fn foreground_color(&self) -> u16 {
        let [r, g, b] = self.foreground;
        pack_color(r, g, b)
    }

    /// Background as RGB565
    pub fn background_color(&self) -> u16 {
        let [r, g, b] = self.background;
        pack_color(r, g, b)
    }
}

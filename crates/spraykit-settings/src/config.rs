//! Configuration and settings management for SprayKit
//!
//! Provides configuration file handling and validation. Supports JSON and
//! TOML file formats stored in platform-specific directories.
//!
//! Configuration is organized into logical sections:
//! - Connection settings (device address, unit id, timeouts)
//! - Transmission pacing (chunk size, delays, save polling)
//! - Geometry defaults (arc discretization)

use crate::error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
use serde::{Deserialize, Serialize};
use spraykit_communication::modbus::MAX_WRITE_REGISTERS;
use spraykit_communication::SessionConfig;
use spraykit_geometry::{AngularResolution, MIN_RESOLUTION_DEG};
use std::path::{Path, PathBuf};

/// Name of the settings file inside the config directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Number of recent programs to remember
const RECENT_PROGRAMS_COUNT: usize = 10;

/// Device connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Hostname or IP address of the spray controller
    pub host: String,
    /// Modbus TCP port
    pub port: u16,
    /// Modbus unit identifier
    pub unit_id: u8,
    /// Connection timeout in milliseconds
    pub connect_timeout_ms: u64,
    /// Per-request read/write timeout in milliseconds
    pub io_timeout_ms: u64,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            host: "192.168.0.10".to_string(),
            port: 502,
            unit_id: 1,
            connect_timeout_ms: 2000,
            io_timeout_ms: 2000,
        }
    }
}

/// Program transmission pacing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransmissionSettings {
    /// Registers per payload write
    pub chunk_registers: usize,
    /// Pause between payload chunks in milliseconds
    pub chunk_delay_ms: u64,
    /// Pause between save status polls in milliseconds
    pub poll_interval_ms: u64,
    /// Save status polls before giving up
    pub max_poll_attempts: u32,
}

impl Default for TransmissionSettings {
    fn default() -> Self {
        Self {
            chunk_registers: 50,
            chunk_delay_ms: 20,
            poll_interval_ms: 100,
            max_poll_attempts: 50,
        }
    }
}

/// Geometry defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometrySettings {
    /// Angular step for arcs and circles in degrees
    pub arc_resolution_deg: f64,
}

impl Default for GeometrySettings {
    fn default() -> Self {
        Self {
            arc_resolution_deg: 15.0,
        }
    }
}

/// Complete application configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Recently opened program files, newest first
    pub recent_programs: Vec<PathBuf>,
    pub connection: ConnectionSettings,
    pub transmission: TransmissionSettings,
    pub geometry: GeometrySettings,
}

enum Format {
    Json,
    Toml,
}

fn format_of(path: &Path) -> ConfigResult<Format> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        other => Err(ConfigError::UnsupportedFormat(
            other.unwrap_or("<none>").to_string(),
        )),
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = format_of(path)?;
        let content = std::fs::read_to_string(path)?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match format_of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Platform config location, e.g. `~/.config/spraykit/config.toml`
    pub fn default_config_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("spraykit").join(CONFIG_FILE_NAME))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("no configuration directory on this platform".into())
            })
    }

    /// Load from `path`, or the default location, falling back to defaults
    /// when the file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> SettingsResult<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_config_path() {
                Ok(path) => path,
                Err(e) => {
                    tracing::warn!("{}; using default settings", e);
                    return Ok(Self::default());
                }
            },
        };

        if path.exists() {
            tracing::debug!("Loading settings from {}", path.display());
            Self::load_from_file(&path)
        } else {
            tracing::debug!("No settings at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.connection.host.trim().is_empty() {
            return Err(ConfigError::out_of_range("connection.host", "\"\""));
        }

        if self.connection.connect_timeout_ms == 0 {
            return Err(ConfigError::out_of_range("connection.connect_timeout_ms", 0));
        }

        if self.connection.io_timeout_ms == 0 {
            return Err(ConfigError::out_of_range("connection.io_timeout_ms", 0));
        }

        let chunk = self.transmission.chunk_registers;
        if chunk == 0 || chunk > MAX_WRITE_REGISTERS {
            return Err(ConfigError::out_of_range("transmission.chunk_registers", chunk));
        }

        if self.transmission.max_poll_attempts == 0 {
            return Err(ConfigError::out_of_range("transmission.max_poll_attempts", 0));
        }

        let resolution = self.geometry.arc_resolution_deg;
        if !(resolution >= MIN_RESOLUTION_DEG && resolution <= 90.0) {
            return Err(ConfigError::out_of_range("geometry.arc_resolution_deg", resolution));
        }

        Ok(())
    }

    /// Session parameters for the transport layer
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            unit_id: self.connection.unit_id,
            connect_timeout_ms: self.connection.connect_timeout_ms,
            io_timeout_ms: self.connection.io_timeout_ms,
            chunk_registers: self.transmission.chunk_registers,
            chunk_delay_ms: self.transmission.chunk_delay_ms,
            poll_interval_ms: self.transmission.poll_interval_ms,
            max_poll_attempts: self.transmission.max_poll_attempts,
        }
    }

    pub fn resolution(&self) -> AngularResolution {
        AngularResolution::from_degrees(self.geometry.arc_resolution_deg)
    }

    /// Add file to recent programs list
    pub fn add_recent_program(&mut self, path: PathBuf) {
        self.recent_programs.retain(|f| f != &path);
        self.recent_programs.insert(0, path);
        self.recent_programs.truncate(RECENT_PROGRAMS_COUNT);
    }
}

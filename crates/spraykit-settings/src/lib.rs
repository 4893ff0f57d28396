//! SprayKit Settings Crate
//!
//! Handles application configuration: device connection, transmission pacing
//! and geometry defaults.

pub mod config;
pub mod error;

pub use config::{Config, ConnectionSettings, GeometrySettings, TransmissionSettings};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};

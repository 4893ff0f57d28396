//! # SprayKit
//!
//! Teaches spray-coating trajectories to a robot arm controller:
//! - CAD drawings (DXF) normalized into lines, arcs, circles and polygons
//! - Trajectories with direction, heights, runtime and nozzle settings
//! - Up to four spray passes per program
//! - Register encoding and Modbus TCP transfer with a save handshake
//!
//! ## Architecture
//!
//! SprayKit is organized as a workspace with multiple crates:
//!
//! 1. **spraykit-core** - Point type, units, error taxonomy
//! 2. **spraykit-geometry** - Geometry engine, trajectories, DXF import, program files
//! 3. **spraykit-communication** - Register protocol encoder, Modbus TCP, transport session
//! 4. **spraykit-settings** - Connection, transmission and geometry settings
//! 5. **spraykit** - Library facade and command line tool

pub mod program;

pub use spraykit_core::{
    mm_to_m, m_to_mm, ConfigurationError, Error, GeometryError, Point3D, Result,
    TransportError, TransportResult, ValidationError,
};

pub use spraykit_geometry::{
    calculate_min_runtime, calculate_trajectory_length, import_dxf, normalize_all,
    AngularResolution, CadEntity, CadShape, Configuration, DxfImport, HeightEdit, Nozzle,
    NozzleState, Primitive, PrimitiveKind, ProgramFile, SprayPass, Trajectory, MAX_PASSES,
};

pub use spraykit_communication::{
    EncodedProgram, Endpoint, ProtocolEncoder, RegisterClient, SendReport, SessionConfig,
    TransportSession,
};

pub use spraykit_settings::{Config, SettingsError};

pub use program::{configuration_from_import, summarize, TrajectorySummary};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Pretty formatted output on stderr, keeping stdout for command output
/// - RUST_LOG environment variable support (default `info`)
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

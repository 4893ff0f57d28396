//! Error handling for SprayKit
//!
//! Provides error types for all layers of the application:
//! - Geometry errors (degenerate primitives, absorbed with fallbacks)
//! - Configuration errors (program shape checks that block a send)
//! - Transport errors (connection, I/O and device faults)
//! - Validation errors (rejected operator edits)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Geometry error type
///
/// Raised while parametrizing primitives. The reconstructor absorbs these
/// with raw-point fallbacks so an editing session stays usable.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// Collinear or coincident defining points
    #[error("Degenerate geometry: {reason}")]
    Degenerate {
        /// What made the geometry degenerate.
        reason: String,
    },
}

impl GeometryError {
    /// Create a degenerate-geometry error
    pub fn degenerate(reason: impl Into<String>) -> Self {
        Self::Degenerate {
            reason: reason.into(),
        }
    }
}

/// Configuration error type
///
/// Checked before any register is written; a failing check means nothing
/// reached the device.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// The program has no passes at all
    #[error("Configuration has no spray passes")]
    NoPasses,

    /// More passes than the device accepts
    #[error("Too many spray passes: {count} (maximum {max})")]
    TooManyPasses {
        /// Number of passes in the program.
        count: usize,
        /// Maximum accepted by the device.
        max: usize,
    },

    /// A pass without trajectories
    #[error("Spray pass {index} ('{name}') has no trajectories")]
    EmptyPass {
        /// Index of the empty pass.
        index: usize,
        /// Name of the empty pass.
        name: String,
    },

    /// Pass index out of range
    #[error("Invalid pass index {index} (program has {count} passes)")]
    InvalidPassIndex {
        /// The requested index.
        index: usize,
        /// Number of passes available.
        count: usize,
    },

    /// Trajectory index out of range
    #[error("Invalid trajectory index {index} (pass has {count} trajectories)")]
    InvalidTrajectoryIndex {
        /// The requested index.
        index: usize,
        /// Number of trajectories available.
        count: usize,
    },

    /// Encoded payload exceeds the device's register window
    #[error("Payload too large: {floats} floats (maximum {max})")]
    PayloadTooLarge {
        /// Number of floats the program encodes to.
        floats: usize,
        /// Maximum accepted by the device.
        max: usize,
    },
}

/// Transport error type
///
/// Represents failures talking to the fieldbus device. `address` and `phase`
/// identify where a transmission stopped.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    /// Operation attempted without a live connection
    #[error("Device not connected")]
    NotConnected,

    /// The TCP connection could not be opened
    #[error("Failed to connect to {host}:{port}: {reason}")]
    ConnectionFailed {
        /// Target host.
        host: String,
        /// Target port.
        port: u16,
        /// The reason the connection failed.
        reason: String,
    },

    /// The TCP connection did not open in time
    #[error("Connection timeout after {timeout_ms}ms")]
    ConnectionTimeout {
        /// The timeout duration in milliseconds.
        timeout_ms: u64,
    },

    /// Socket-level failure
    #[error("I/O error during {phase} at register {address}: {reason}")]
    Io {
        /// Transmission phase (e.g. "payload chunk").
        phase: String,
        /// Register address of the failed request.
        address: u16,
        /// The underlying I/O failure.
        reason: String,
    },

    /// The device answered with a Modbus exception
    #[error("Device exception {code:#04x} for function {function:#04x} at register {address}")]
    Exception {
        /// Function code of the rejected request.
        function: u8,
        /// Modbus exception code.
        code: u8,
        /// Register address of the rejected request.
        address: u16,
    },

    /// The device answered without register data
    #[error("No data returned for register {address}")]
    NoData {
        /// Register address that was read.
        address: u16,
    },

    /// The reply did not match the request
    #[error("Unexpected response: {reason}")]
    UnexpectedResponse {
        /// What did not match.
        reason: String,
    },
}

impl TransportError {
    /// Build an I/O error for the given phase and register
    pub fn io(phase: impl Into<String>, address: u16, err: &std::io::Error) -> Self {
        Self::Io {
            phase: phase.into(),
            address,
            reason: err.to_string(),
        }
    }
}

/// Validation error type
///
/// Rejected operator edits. The edited field keeps its last valid value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// The text is not a number
    #[error("Invalid value for {field}: '{input}' is not a number")]
    Malformed {
        /// Name of the edited field.
        field: String,
        /// The rejected input.
        input: String,
    },

    /// NaN or infinite input
    #[error("Invalid value for {field}: must be finite")]
    NotFinite {
        /// Name of the edited field.
        field: String,
    },

    /// Below the allowed minimum
    #[error("{field} must be at least {minimum:.3} (got {value:.3})")]
    BelowMinimum {
        /// Name of the edited field.
        field: String,
        /// The rejected value.
        value: f64,
        /// Smallest accepted value.
        minimum: f64,
    },

    /// The edit does not apply to this primitive kind
    #[error("{field} cannot be edited on a {kind} trajectory")]
    NotApplicable {
        /// Name of the edited field.
        field: String,
        /// Primitive kind of the trajectory.
        kind: String,
    },
}

/// Main error type for SprayKit
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Transport error
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The device did not acknowledge the save in time
    #[error("Device did not confirm save after {attempts} polls ({waited_ms}ms)")]
    SaveTimeout {
        /// Number of status polls performed.
        attempts: u32,
        /// Total time spent waiting in milliseconds.
        waited_ms: u64,
    },
}

impl Error {
    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Error::SaveTimeout { .. } | Error::Transport(TransportError::ConnectionTimeout { .. })
        )
    }

    /// Check if this is a transport error
    pub fn is_transport_error(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    /// Check if this is a configuration error
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

/// Result type for register-level operations
pub type TransportResult<T> = std::result::Result<T, TransportError>;

//! # SprayKit Core
//!
//! Core types, units, and error handling for SprayKit.
//! Provides the point type shared by the geometry and communication crates,
//! the millimeter/meter conventions, and the error taxonomy used across the
//! workspace.

pub mod data;
pub mod error;
pub mod units;

pub use data::Point3D;

pub use error::{
    ConfigurationError, Error, GeometryError, Result, TransportError, TransportResult,
    ValidationError,
};

pub use units::{mm_to_m, m_to_mm, REFERENCE_SPEED_M_PER_S};

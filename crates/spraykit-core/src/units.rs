//! Unit conventions
//!
//! Geometry is carried in millimeters. Lengths reported to the operator and
//! used for speed derivation are in meters; runtimes are in seconds.

/// Reference traversal speed used to derive the minimum runtime of a trajectory
pub const REFERENCE_SPEED_M_PER_S: f64 = 2.0;

/// Millimeters per meter
pub const MM_PER_M: f64 = 1000.0;

/// Convert millimeters to meters
pub fn mm_to_m(value_mm: f64) -> f64 {
    value_mm / MM_PER_M
}

/// Convert meters to millimeters
pub fn m_to_mm(value_m: f64) -> f64 {
    value_m * MM_PER_M
}

/// Format a length in meters for display
pub fn format_length_m(value_m: f64) -> String {
    format!("{:.3} m", value_m)
}

/// Format a duration in seconds for display
pub fn format_runtime_s(value_s: f64) -> String {
    format!("{:.2} s", value_s)
}

//! Spray trajectories
//!
//! A trajectory owns one primitive together with the operator's choices for
//! it: direction, runtime, nozzle valves and height. Its `points` are a pure
//! function of those fields and are rebuilt after every edit.

use crate::discretize::AngularResolution;
use crate::measure;
use crate::nozzle::{Nozzle, NozzleState};
use crate::primitive::{Primitive, PrimitiveKind};
use crate::reconstruct::{HeightOverrides, PrimitiveReconstructor};
use serde::{Deserialize, Serialize};
use spraykit_core::{Point3D, ValidationError};
use std::fmt;

/// Slack allowed when comparing a runtime against its minimum (seconds)
const RUNTIME_TOLERANCE_S: f64 = 1e-9;

/// Which height an edit targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeightEdit {
    /// Z of a line's start point
    LineStart,
    /// Z of a line's end point
    LineEnd,
    /// Same Z for every defining point
    Uniform,
    /// Z of all polygon vertices
    Polygon,
}

impl HeightEdit {
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::LineStart => "start Z",
            Self::LineEnd => "end Z",
            Self::Uniform => "Z",
            Self::Polygon => "polygon Z",
        }
    }
}

impl fmt::Display for HeightEdit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// Parse an operator-entered number
pub fn parse_number(field: &str, text: &str) -> Result<f64, ValidationError> {
    let value: f64 = text
        .trim()
        .parse()
        .map_err(|_| ValidationError::Malformed {
            field: field.to_string(),
            input: text.to_string(),
        })?;
    if !value.is_finite() {
        return Err(ValidationError::NotFinite {
            field: field.to_string(),
        });
    }
    Ok(value)
}

/// One primitive plus its spray settings and discretized path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TrajectoryRecord", into = "TrajectoryRecord")]
pub struct Trajectory {
    name: String,
    primitive: Primitive,
    is_reversed: bool,
    runtime: f64,
    nozzles: NozzleState,
    polygon_z: f64,
    resolution: AngularResolution,
    points: Vec<Point3D>,
}

impl Trajectory {
    /// Create a trajectory running forward at its minimum runtime, valves closed
    pub fn new(primitive: Primitive) -> Self {
        let name = primitive.kind().to_string();
        Self::with_name(primitive, name)
    }

    pub fn with_name(primitive: Primitive, name: impl Into<String>) -> Self {
        Self::with_resolution(primitive, name, AngularResolution::default())
    }

    pub fn with_resolution(
        primitive: Primitive,
        name: impl Into<String>,
        resolution: AngularResolution,
    ) -> Self {
        let polygon_z = elevation_of(&primitive);
        let mut trajectory = Self {
            name: name.into(),
            primitive,
            is_reversed: false,
            runtime: 0.0,
            nozzles: NozzleState::new(),
            polygon_z,
            resolution,
            points: Vec::new(),
        };
        trajectory.regenerate();
        trajectory.runtime = trajectory.min_runtime();
        trajectory
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn primitive(&self) -> &Primitive {
        &self.primitive
    }

    pub fn kind(&self) -> PrimitiveKind {
        self.primitive.kind()
    }

    /// Primitive geometry in traversal order, with height overrides applied
    pub fn directed_primitive(&self) -> Primitive {
        match self.primitive.directed(self.is_reversed) {
            Primitive::Polygon {
                vertices, closed, ..
            } => Primitive::Polygon {
                vertices,
                closed,
                elevation: self.polygon_z,
            },
            other => other,
        }
    }

    /// Replace the geometry, keeping direction, valves and runtime where valid
    pub fn set_primitive(&mut self, primitive: Primitive) {
        self.polygon_z = elevation_of(&primitive);
        self.primitive = primitive;
        self.geometry_changed();
    }

    pub fn points(&self) -> &[Point3D] {
        &self.points
    }

    pub fn is_reversed(&self) -> bool {
        self.is_reversed
    }

    pub fn set_reversed(&mut self, reversed: bool) {
        if self.is_reversed != reversed {
            self.is_reversed = reversed;
            self.geometry_changed();
        }
    }

    pub fn toggle_reversed(&mut self) {
        self.set_reversed(!self.is_reversed);
    }

    /// Runtime in seconds
    pub fn runtime(&self) -> f64 {
        self.runtime
    }

    /// Set the runtime; values below the minimum are rejected.
    pub fn set_runtime(&mut self, runtime: f64) -> Result<(), ValidationError> {
        if !runtime.is_finite() {
            return Err(ValidationError::NotFinite {
                field: "runtime".to_string(),
            });
        }
        let minimum = self.min_runtime();
        if runtime + RUNTIME_TOLERANCE_S < minimum {
            return Err(ValidationError::BelowMinimum {
                field: "runtime".to_string(),
                value: runtime,
                minimum,
            });
        }
        self.runtime = runtime;
        Ok(())
    }

    pub fn set_runtime_text(&mut self, text: &str) -> Result<(), ValidationError> {
        let runtime = parse_number("runtime", text)?;
        self.set_runtime(runtime)
    }

    pub fn nozzles(&self) -> NozzleState {
        self.nozzles
    }

    pub fn set_nozzles(&mut self, nozzles: NozzleState) {
        self.nozzles = nozzles;
    }

    pub fn set_gas(&mut self, nozzle: Nozzle, on: bool) {
        self.nozzles.set_gas(nozzle, on);
    }

    pub fn set_liquid(&mut self, nozzle: Nozzle, on: bool) {
        self.nozzles.set_liquid(nozzle, on);
    }

    /// Z applied to every polygon vertex
    pub fn polygon_z(&self) -> f64 {
        self.polygon_z
    }

    /// Current value of the height targeted by `edit`, if it applies
    pub fn height(&self, edit: HeightEdit) -> Option<f64> {
        match (edit, &self.primitive) {
            (HeightEdit::LineStart, Primitive::Line { start, .. }) => Some(start.z),
            (HeightEdit::LineEnd, Primitive::Line { end, .. }) => Some(end.z),
            (HeightEdit::Polygon | HeightEdit::Uniform, Primitive::Polygon { .. }) => {
                Some(self.polygon_z)
            }
            (HeightEdit::Uniform, Primitive::Line { start, .. }) => Some(start.z),
            (HeightEdit::Uniform, Primitive::Arc { p1, .. } | Primitive::Circle { p1, .. }) => {
                Some(p1.z)
            }
            _ => None,
        }
    }

    /// Change a height and regenerate the path.
    ///
    /// Edits that do not apply to the primitive kind are rejected and leave
    /// the trajectory unchanged.
    pub fn apply_height(&mut self, edit: HeightEdit, z: f64) -> Result<(), ValidationError> {
        if !z.is_finite() {
            return Err(ValidationError::NotFinite {
                field: edit.field_name().to_string(),
            });
        }

        match (edit, &mut self.primitive) {
            (HeightEdit::LineStart, Primitive::Line { start, .. }) => start.z = z,
            (HeightEdit::LineEnd, Primitive::Line { end, .. }) => end.z = z,
            (HeightEdit::Uniform, Primitive::Line { start, end }) => {
                start.z = z;
                end.z = z;
            }
            (
                HeightEdit::Uniform,
                Primitive::Arc { p1, p2, p3 } | Primitive::Circle { p1, p2, p3 },
            ) => {
                p1.z = z;
                p2.z = z;
                p3.z = z;
            }
            (HeightEdit::Polygon | HeightEdit::Uniform, Primitive::Polygon { .. }) => {
                self.polygon_z = z
            }
            (edit, primitive) => {
                return Err(ValidationError::NotApplicable {
                    field: edit.field_name().to_string(),
                    kind: primitive.kind().to_string(),
                })
            }
        }

        self.geometry_changed();
        Ok(())
    }

    pub fn apply_height_text(&mut self, edit: HeightEdit, text: &str) -> Result<(), ValidationError> {
        let z = parse_number(edit.field_name(), text)?;
        self.apply_height(edit, z)
    }

    pub fn resolution(&self) -> AngularResolution {
        self.resolution
    }

    /// Path length in meters
    pub fn length_m(&self) -> f64 {
        measure::calculate_trajectory_length(self)
    }

    /// Minimum runtime in seconds
    pub fn min_runtime(&self) -> f64 {
        measure::calculate_min_runtime(self)
    }

    /// Number of device primitives this trajectory encodes to
    pub fn primitive_count(&self) -> usize {
        self.primitive.primitive_count()
    }

    /// Rebuild `points` from the primitive, direction, heights and resolution
    pub fn regenerate(&mut self) {
        let heights = HeightOverrides {
            polygon_z: Some(self.polygon_z),
        };
        self.points = PrimitiveReconstructor::new(self.resolution).reconstruct(
            &self.primitive,
            self.is_reversed,
            &heights,
        );
    }

    /// Regenerate, then raise the runtime if the path got longer
    fn geometry_changed(&mut self) {
        self.regenerate();
        let minimum = self.min_runtime();
        if self.runtime + RUNTIME_TOLERANCE_S < minimum {
            tracing::debug!(
                "Runtime of '{}' raised from {:.3}s to minimum {:.3}s",
                self.name,
                self.runtime,
                minimum
            );
            self.runtime = minimum;
        }
    }
}

fn elevation_of(primitive: &Primitive) -> f64 {
    match primitive {
        Primitive::Polygon { elevation, .. } => *elevation,
        _ => 0.0,
    }
}

/// Persisted form of a [`Trajectory`]; points are never stored
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TrajectoryRecord {
    #[serde(default)]
    name: String,
    primitive: Primitive,
    #[serde(default)]
    is_reversed: bool,
    #[serde(default)]
    runtime: f64,
    #[serde(default)]
    nozzles: NozzleState,
    #[serde(default)]
    polygon_z: Option<f64>,
    #[serde(default)]
    resolution: AngularResolution,
}

impl From<TrajectoryRecord> for Trajectory {
    fn from(record: TrajectoryRecord) -> Self {
        let resolution = record.resolution;
        let mut trajectory = Self {
            name: record.name,
            polygon_z: record
                .polygon_z
                .unwrap_or_else(|| elevation_of(&record.primitive)),
            primitive: record.primitive,
            is_reversed: record.is_reversed,
            runtime: 0.0,
            nozzles: record.nozzles,
            resolution,
            points: Vec::new(),
        };
        trajectory.regenerate();

        let minimum = trajectory.min_runtime();
        trajectory.runtime = if !record.runtime.is_finite()
            || record.runtime + RUNTIME_TOLERANCE_S < minimum
        {
            tracing::warn!(
                "Stored runtime {:.3}s of '{}' is below its minimum, clamped to {:.3}s",
                record.runtime,
                trajectory.name,
                minimum
            );
            minimum
        } else {
            record.runtime
        };
        trajectory
    }
}

impl From<Trajectory> for TrajectoryRecord {
    fn from(trajectory: Trajectory) -> Self {
        Self {
            name: trajectory.name,
            primitive: trajectory.primitive,
            is_reversed: trajectory.is_reversed,
            runtime: trajectory.runtime,
            nozzles: trajectory.nozzles,
            polygon_z: Some(trajectory.polygon_z),
            resolution: trajectory.resolution,
        }
    }
}

//! # SprayKit Geometry
//!
//! This crate turns CAD drawing entities into spray trajectories: parametric
//! primitives with a discretized point path, a direction, a runtime, nozzle
//! settings and height overrides.
//!
//! ## Core Components
//!
//! ### Geometry Engine
//! - **Arc**: Center, radius, plane and sweep of three-point arcs and circles
//! - **Discretize**: Fixed angular step walks of arcs and circles
//! - **Bulge**: Expansion of bulge-encoded polyline edges
//! - **Polygon**: Edge counting, walking and vertex ordering
//! - **Measure**: Path length and minimum runtime
//!
//! ### Program Model
//! - **Primitive**: Closed set of shapes (line, arc, circle, polygon)
//! - **Trajectory**: A primitive plus operator settings and its points
//! - **Configuration**: Up to four spray passes of ordered trajectories
//! - **Reconstruct**: Point regeneration after every edit
//!
//! ### Import/Export
//! - **CAD**: Normalization of drawing entities into primitives
//! - **DXF Import**: LINE, ARC, CIRCLE and polyline entities
//! - **Program File**: JSON program files
//!
//! ## Architecture
//!
//! ```text
//! DXF drawing
//!   └── CadEntity (center/angles, bulges)
//!         └── Primitive (three points, plain vertices)
//!               └── Trajectory (direction, heights, runtime, nozzles)
//!                     └── points (regenerated on every edit)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use spraykit_geometry::{import_dxf, normalize_all, AngularResolution, Configuration, Trajectory};
//!
//! let drawing = import_dxf("panel.dxf")?;
//! let mut configuration = Configuration::new();
//! let pass = configuration.add_pass("base coat");
//! for primitive in normalize_all(&drawing.entities, AngularResolution::default()) {
//!     configuration.pass_mut(pass)?.add_trajectory(Trajectory::new(primitive));
//! }
//! ```

pub mod arc;
pub mod bulge;
pub mod cad;
pub mod configuration;
pub mod discretize;
pub mod dxf_import;
pub mod measure;
pub mod nozzle;
pub mod polygon;
pub mod primitive;
pub mod program_file;
pub mod reconstruct;
pub mod trajectory;

pub use arc::{
    calculate_arc_parameters_from_three_points, calculate_circle_center_radius_from_three_points,
    ArcParameters, CircleParameters, LocalFrame,
};
pub use bulge::{expand_bulge_polyline, BulgeArc, BulgeSegment};
pub use cad::{normalize, normalize_all, CadEntity, CadShape};
pub use configuration::{Configuration, SprayPass, MAX_PASSES};
pub use discretize::{
    discretize_arc, discretize_circle, AngularResolution, DEFAULT_RESOLUTION_DEG,
    MIN_RESOLUTION_DEG,
};
pub use dxf_import::{entities_from_drawing, import_dxf, DxfImport};
pub use measure::{calculate_min_runtime, calculate_trajectory_length, path_length_mm};
pub use nozzle::{Nozzle, NozzleState};
pub use primitive::{find_matching_primitive, Primitive, PrimitiveKind};
pub use program_file::{ProgramFile, ProgramMetadata, FILE_FORMAT_VERSION};
pub use reconstruct::{regenerate_points, HeightOverrides, PrimitiveReconstructor, Reconstruction};
pub use trajectory::{HeightEdit, Trajectory};

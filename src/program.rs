//! Program assembly and inspection helpers shared by the command line tool.

use spraykit_communication::protocol::{polygon_speed, trajectory_speed};
use spraykit_core::m_to_mm;
use spraykit_geometry::{
    AngularResolution, Configuration, DxfImport, PrimitiveKind, SprayPass, Trajectory,
};

/// Build a single-pass configuration from an imported drawing.
///
/// Every supported entity becomes one trajectory at its minimum runtime,
/// named after its layer.
pub fn configuration_from_import(
    import: &DxfImport,
    pass_name: &str,
    resolution: AngularResolution,
) -> Configuration {
    let mut pass = SprayPass::new(pass_name);
    for entity in &import.entities {
        let primitive = entity.normalize(resolution);
        let name = format!("{} {}", entity.layer, primitive.kind());
        pass.add_trajectory(Trajectory::with_resolution(primitive, name, resolution));
    }

    let mut configuration = Configuration::new();
    configuration.push_pass(pass);
    configuration
}

/// One row of a program listing
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectorySummary {
    pub pass: usize,
    pub index: usize,
    pub name: String,
    pub kind: PrimitiveKind,
    pub reversed: bool,
    pub length_m: f64,
    pub runtime: f64,
    pub min_runtime: f64,
    /// Speed as it will be sent to the device
    pub speed: f64,
    pub nozzle_code: u16,
}

fn device_speed(trajectory: &Trajectory) -> f64 {
    match trajectory.kind() {
        PrimitiveKind::Polygon => polygon_speed(m_to_mm(trajectory.length_m()), trajectory.runtime()),
        _ => trajectory_speed(trajectory.length_m(), trajectory.runtime()),
    }
}

/// List every trajectory of every pass
pub fn summarize(configuration: &Configuration) -> Vec<TrajectorySummary> {
    configuration
        .passes()
        .iter()
        .enumerate()
        .flat_map(|(pass, spray_pass)| {
            spray_pass
                .trajectories()
                .iter()
                .enumerate()
                .map(move |(index, trajectory)| TrajectorySummary {
                    pass,
                    index,
                    name: trajectory.name().to_string(),
                    kind: trajectory.kind(),
                    reversed: trajectory.is_reversed(),
                    length_m: trajectory.length_m(),
                    runtime: trajectory.runtime(),
                    min_runtime: trajectory.min_runtime(),
                    speed: device_speed(trajectory),
                    nozzle_code: trajectory.nozzles().status_code(),
                })
        })
        .collect()
}

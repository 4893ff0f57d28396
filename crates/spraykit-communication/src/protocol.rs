//! Register map and program encoding
//!
//! A spray program travels as two streams: six integer control registers
//! describing the pass layout, and a float payload with fifteen values per
//! device primitive. Floats occupy two registers each, low word first.

use spraykit_core::{ConfigurationError, Point3D};
use spraykit_geometry::{polygon, Configuration, Primitive, Trajectory};

/// Device writes [`SAVE_SUCCESS`] here once the program is stored
pub const SAVE_STATUS_REGISTER: u16 = 1001;
/// Set to [`MARKER_WRITING`] before and [`MARKER_COMPLETE`] after a transfer
pub const WRITE_MARKER_REGISTER: u16 = 1010;
/// Pass count followed by per-pass primitive counts
pub const CONTROL_BASE_REGISTER: u16 = 1011;
/// First register of the float payload
pub const PAYLOAD_BASE_REGISTER: u16 = 4000;

pub const CONTROL_SLOTS: usize = 6;
pub const MARKER_WRITING: u16 = 1;
pub const MARKER_COMPLETE: u16 = 2;
pub const SAVE_CLEAR: u16 = 0;
pub const SAVE_SUCCESS: i16 = 1;

/// Floats describing one device primitive
pub const FLOATS_PER_PRIMITIVE: usize = 15;
/// Size of the device's payload window in floats
pub const MAX_PAYLOAD_FLOATS: usize = 900;
/// Registers per encoded float
pub const REGISTERS_PER_FLOAT: usize = 2;

/// Lengths and runtimes at or below this produce a zero speed
const SPEED_EPSILON: f64 = 1e-5;

/// Primitive type codes understood by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PrimitiveTypeCode {
    Line = 1,
    Circle = 2,
    Arc = 3,
}

impl PrimitiveTypeCode {
    pub fn as_f32(self) -> f32 {
        f32::from(self as u8)
    }
}

/// Split a float into two registers, low word first
pub fn float_to_registers(value: f32) -> [u16; 2] {
    let bits = value.to_bits();
    [(bits & 0xFFFF) as u16, (bits >> 16) as u16]
}

/// Join two registers (low word first) back into a float
pub fn registers_to_float(registers: [u16; 2]) -> f32 {
    f32::from_bits(u32::from(registers[0]) | (u32::from(registers[1]) << 16))
}

/// Speed of a non-polygon trajectory in meters per second
pub fn trajectory_speed(length_m: f64, runtime_s: f64) -> f64 {
    if length_m > SPEED_EPSILON && runtime_s > SPEED_EPSILON {
        length_m / runtime_s
    } else {
        0.0
    }
}

/// Speed shared by every edge of a polygon.
///
/// Computed from the raw millimeter perimeter as `mm / s / 1000`.
pub fn polygon_speed(perimeter_mm: f64, runtime_s: f64) -> f64 {
    if runtime_s > SPEED_EPSILON {
        perimeter_mm / runtime_s / 1000.0
    } else {
        0.0
    }
}

/// A program ready for the wire
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedProgram {
    /// Pass count and per-pass primitive counts, zero padded
    pub control: [u16; CONTROL_SLOTS],
    pub payload: Vec<f32>,
}

impl EncodedProgram {
    pub fn pass_count(&self) -> usize {
        usize::from(self.control[0])
    }

    /// Per-pass primitive counts, without padding
    pub fn pass_primitive_counts(&self) -> &[u16] {
        &self.control[1..=self.pass_count().min(CONTROL_SLOTS - 1)]
    }

    pub fn primitive_count(&self) -> usize {
        self.pass_primitive_counts()
            .iter()
            .map(|&count| usize::from(count))
            .sum()
    }

    /// Payload flattened to registers, each float low word first
    pub fn payload_registers(&self) -> Vec<u16> {
        self.payload
            .iter()
            .flat_map(|&value| float_to_registers(value))
            .collect()
    }

    /// The fifteen floats of one device primitive
    pub fn primitive_record(&self, index: usize) -> Option<&[f32]> {
        let start = index * FLOATS_PER_PRIMITIVE;
        self.payload.get(start..start + FLOATS_PER_PRIMITIVE)
    }
}

/// Encodes configurations into control and payload streams
#[derive(Debug, Clone, Copy, Default)]
pub struct ProtocolEncoder;

impl ProtocolEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Validate and encode a configuration.
    ///
    /// Fails before producing anything when the configuration has no passes,
    /// too many passes, an empty pass, or more floats than the device holds.
    pub fn encode(&self, configuration: &Configuration) -> Result<EncodedProgram, ConfigurationError> {
        configuration.validate_for_send()?;

        let floats = configuration.total_primitive_count() * FLOATS_PER_PRIMITIVE;
        if floats > MAX_PAYLOAD_FLOATS {
            return Err(ConfigurationError::PayloadTooLarge {
                floats,
                max: MAX_PAYLOAD_FLOATS,
            });
        }

        let mut control = [0u16; CONTROL_SLOTS];
        control[0] = configuration.pass_count() as u16;
        for (slot, pass) in control[1..].iter_mut().zip(configuration.passes()) {
            *slot = pass.primitive_count() as u16;
        }

        let mut payload = Vec::with_capacity(floats);
        let mut seq = 1u32;
        for pass in configuration.passes() {
            for trajectory in pass.trajectories() {
                encode_trajectory(trajectory, &mut seq, &mut payload);
            }
        }

        tracing::debug!(
            "Encoded {} passes, {} primitives, {} floats",
            control[0],
            payload.len() / FLOATS_PER_PRIMITIVE,
            payload.len()
        );

        Ok(EncodedProgram { control, payload })
    }
}

fn push_point(payload: &mut Vec<f32>, p: &Point3D) {
    payload.extend_from_slice(&[p.x as f32, p.y as f32, p.z as f32]);
}

fn push_header(payload: &mut Vec<f32>, seq: &mut u32, code: PrimitiveTypeCode, nozzle: u16, speed: f64) {
    payload.extend_from_slice(&[
        *seq as f32,
        code.as_f32(),
        f32::from(nozzle),
        speed as f32,
        0.0,
        0.0,
    ]);
    *seq += 1;
}

fn encode_trajectory(trajectory: &Trajectory, seq: &mut u32, payload: &mut Vec<f32>) {
    let nozzle = trajectory.nozzles().status_code();

    match trajectory.directed_primitive() {
        Primitive::Line { start, end } => {
            let speed = trajectory_speed(trajectory.length_m(), trajectory.runtime());
            push_header(payload, seq, PrimitiveTypeCode::Line, nozzle, speed);
            push_point(payload, &start);
            push_point(payload, &Point3D::ORIGIN);
            push_point(payload, &end);
        }
        Primitive::Arc { p1, p2, p3 } => {
            let speed = trajectory_speed(trajectory.length_m(), trajectory.runtime());
            push_header(payload, seq, PrimitiveTypeCode::Arc, nozzle, speed);
            for p in [p1, p2, p3] {
                push_point(payload, &p);
            }
        }
        Primitive::Circle { p1, p2, p3 } => {
            let speed = trajectory_speed(trajectory.length_m(), trajectory.runtime());
            push_header(payload, seq, PrimitiveTypeCode::Circle, nozzle, speed);
            for p in [p1, p2, p3] {
                push_point(payload, &p);
            }
        }
        Primitive::Polygon {
            vertices,
            closed,
            elevation,
        } => {
            let flat: Vec<Point3D> = vertices.iter().map(|v| v.with_z(elevation)).collect();
            let speed = polygon_speed(polygon::perimeter_mm(&flat, closed), trajectory.runtime());
            for (start, end) in polygon::segments(&flat, closed) {
                push_header(payload, seq, PrimitiveTypeCode::Line, nozzle, speed);
                push_point(payload, &start);
                push_point(payload, &Point3D::ORIGIN);
                push_point(payload, &end);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spraykit_geometry::{Nozzle, SprayPass};

    fn single_line_configuration() -> Configuration {
        let mut configuration = Configuration::new();
        let index = configuration.add_pass("pass 1");
        let mut trajectory = Trajectory::new(Primitive::Line {
            start: Point3D::ORIGIN,
            end: Point3D::xy(2000.0, 0.0),
        });
        trajectory.set_runtime(1.0).unwrap();
        configuration
            .pass_mut(index)
            .unwrap()
            .add_trajectory(trajectory);
        configuration
    }

    #[test]
    fn test_word_order() {
        // 1.0f32 = 0x3F80_0000
        assert_eq!(float_to_registers(1.0), [0x0000, 0x3F80]);
        assert_eq!(registers_to_float([0x0000, 0x3F80]), 1.0);
        assert_eq!(float_to_registers(-2.5), [0x0000, 0xC020]);
    }

    #[test]
    fn test_single_line_program() {
        let encoded = ProtocolEncoder::new()
            .encode(&single_line_configuration())
            .unwrap();

        assert_eq!(encoded.control, [1, 1, 0, 0, 0, 0]);
        assert_eq!(encoded.pass_primitive_counts(), &[1]);
        assert_eq!(
            encoded.payload,
            vec![
                1.0, 1.0, 0.0, 2.0, 0.0, 0.0, // header
                0.0, 0.0, 0.0, // start
                0.0, 0.0, 0.0, // reserved
                2000.0, 0.0, 0.0, // end
            ]
        );
        assert_eq!(encoded.payload_registers().len(), 30);
    }

    #[test]
    fn test_reversed_arc_swaps_endpoints() {
        let mut configuration = Configuration::new();
        let index = configuration.add_pass("arcs");
        let mut trajectory = Trajectory::new(Primitive::Arc {
            p1: Point3D::xy(10.0, 0.0),
            p2: Point3D::xy(0.0, 10.0),
            p3: Point3D::xy(-10.0, 0.0),
        });
        trajectory.set_reversed(true);
        trajectory.set_liquid(Nozzle::Lower, true);
        configuration.pass_mut(index).unwrap().add_trajectory(trajectory);

        let encoded = ProtocolEncoder::new().encode(&configuration).unwrap();
        let record = encoded.primitive_record(0).unwrap();
        assert_eq!(record[1], 3.0);
        assert_eq!(record[2], 11.0);
        assert_eq!(&record[6..9], &[-10.0, 0.0, 0.0]);
        assert_eq!(&record[9..12], &[0.0, 10.0, 0.0]);
        assert_eq!(&record[12..15], &[10.0, 0.0, 0.0]);
    }

    #[test]
    fn test_polygon_segments_share_speed() {
        let mut configuration = Configuration::new();
        let mut pass = SprayPass::new("outline");
        let mut square = Trajectory::new(Primitive::Polygon {
            vertices: vec![
                Point3D::xy(0.0, 0.0),
                Point3D::xy(100.0, 0.0),
                Point3D::xy(100.0, 100.0),
                Point3D::xy(0.0, 100.0),
            ],
            closed: true,
            elevation: 15.0,
        });
        square.set_runtime(2.0).unwrap();
        pass.add_trajectory(square);
        configuration.push_pass(pass);

        let encoded = ProtocolEncoder::new().encode(&configuration).unwrap();
        assert_eq!(encoded.control, [1, 4, 0, 0, 0, 0]);
        assert_eq!(encoded.payload.len(), 4 * FLOATS_PER_PRIMITIVE);

        for i in 0..4 {
            let record = encoded.primitive_record(i).unwrap();
            assert_eq!(record[0], (i + 1) as f32);
            assert_eq!(record[1], 1.0);
            // 400 mm / 2 s / 1000
            assert!((record[3] - 0.2).abs() < 1e-6);
            assert_eq!(record[8], 15.0);
            assert_eq!(record[14], 15.0);
        }
        let closing = encoded.primitive_record(3).unwrap();
        assert_eq!(&closing[6..8], &[0.0, 100.0]);
        assert_eq!(&closing[12..14], &[0.0, 0.0]);
    }

    #[test]
    fn test_sequence_spans_passes() {
        let mut configuration = single_line_configuration();
        let index = configuration.add_pass("pass 2");
        configuration
            .pass_mut(index)
            .unwrap()
            .add_trajectory(Trajectory::new(Primitive::Circle {
                p1: Point3D::xy(1.0, 0.0),
                p2: Point3D::xy(0.0, 1.0),
                p3: Point3D::xy(-1.0, 0.0),
            }));

        let encoded = ProtocolEncoder::new().encode(&configuration).unwrap();
        assert_eq!(encoded.control, [2, 1, 1, 0, 0, 0]);
        assert_eq!(encoded.primitive_count(), 2);
        let circle = encoded.primitive_record(1).unwrap();
        assert_eq!(circle[0], 2.0);
        assert_eq!(circle[1], 2.0);
    }

    #[test]
    fn test_zero_runtime_gives_zero_speed() {
        assert_eq!(trajectory_speed(2.0, 0.0), 0.0);
        assert_eq!(trajectory_speed(0.0, 5.0), 0.0);
        assert_eq!(polygon_speed(400.0, 1e-6), 0.0);
    }

    #[test]
    fn test_payload_limit() {
        let mut configuration = Configuration::new();
        let index = configuration.add_pass("dense");
        let pass = configuration.pass_mut(index).unwrap();
        for i in 0..61 {
            pass.add_trajectory(Trajectory::new(Primitive::Line {
                start: Point3D::xy(0.0, i as f64),
                end: Point3D::xy(10.0, i as f64),
            }));
        }
        assert_eq!(
            ProtocolEncoder::new().encode(&configuration),
            Err(ConfigurationError::PayloadTooLarge {
                floats: 915,
                max: 900
            })
        );

        configuration.pass_mut(index).unwrap().remove_trajectory(0).unwrap();
        let encoded = ProtocolEncoder::new().encode(&configuration).unwrap();
        assert_eq!(encoded.payload.len(), 900);
    }
}

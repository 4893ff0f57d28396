//! # SprayKit Communication
//!
//! Register protocol encoding and transport for SprayKit.
//! Programs are flattened into a fixed register map and written to the spray
//! controller over Modbus TCP, followed by a save handshake.

pub mod modbus;
pub mod protocol;
pub mod transport;

pub use modbus::{ModbusClient, ModbusTcpClient, Request, Response};
pub use protocol::{
    float_to_registers, registers_to_float, EncodedProgram, PrimitiveTypeCode, ProtocolEncoder,
    MAX_PAYLOAD_FLOATS,
};
pub use transport::{
    Connector, Endpoint, RegisterClient, SendReport, SessionConfig, TcpConnector,
    TransportSession,
};

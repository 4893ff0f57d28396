//! Modbus TCP framing
//!
//! Implements the subset of Modbus TCP the spray controller speaks: read
//! holding registers (0x03), write single register (0x06) and write multiple
//! registers (0x10). Every request is sent as one MBAP frame and answered by
//! exactly one reply.
//!
//! Frame layout:
//! ```text
//! transaction id (u16) | protocol id (u16, 0) | length (u16) | unit id (u8) | PDU
//! ```
//! All header and register values are big-endian on the wire.

use crate::transport::RegisterClient;
use spraykit_core::{TransportError, TransportResult};
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

pub const MBAP_HEADER_LEN: usize = 7;
pub const MODBUS_PROTOCOL_ID: u16 = 0;

pub const FC_READ_HOLDING_REGISTERS: u8 = 0x03;
pub const FC_WRITE_SINGLE_REGISTER: u8 = 0x06;
pub const FC_WRITE_MULTIPLE_REGISTERS: u8 = 0x10;
pub const EXCEPTION_FLAG: u8 = 0x80;

/// Largest register count a single read may request
pub const MAX_READ_REGISTERS: u16 = 125;
/// Largest register count a single write may carry
pub const MAX_WRITE_REGISTERS: usize = 123;

/// Largest PDU allowed by the protocol
const MAX_PDU_LEN: usize = 253;

/// One register request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    ReadHoldingRegisters { address: u16, count: u16 },
    WriteSingleRegister { address: u16, value: u16 },
    WriteMultipleRegisters { address: u16, values: Vec<u16> },
}

impl Request {
    pub fn function_code(&self) -> u8 {
        match self {
            Self::ReadHoldingRegisters { .. } => FC_READ_HOLDING_REGISTERS,
            Self::WriteSingleRegister { .. } => FC_WRITE_SINGLE_REGISTER,
            Self::WriteMultipleRegisters { .. } => FC_WRITE_MULTIPLE_REGISTERS,
        }
    }

    pub fn address(&self) -> u16 {
        match self {
            Self::ReadHoldingRegisters { address, .. }
            | Self::WriteSingleRegister { address, .. }
            | Self::WriteMultipleRegisters { address, .. } => *address,
        }
    }

    /// Protocol data unit: function code followed by its arguments
    pub fn to_pdu(&self) -> Vec<u8> {
        let mut pdu = vec![self.function_code()];
        match self {
            Self::ReadHoldingRegisters { address, count } => {
                pdu.extend_from_slice(&address.to_be_bytes());
                pdu.extend_from_slice(&count.to_be_bytes());
            }
            Self::WriteSingleRegister { address, value } => {
                pdu.extend_from_slice(&address.to_be_bytes());
                pdu.extend_from_slice(&value.to_be_bytes());
            }
            Self::WriteMultipleRegisters { address, values } => {
                pdu.extend_from_slice(&address.to_be_bytes());
                pdu.extend_from_slice(&(values.len() as u16).to_be_bytes());
                pdu.push((values.len() * 2) as u8);
                for value in values {
                    pdu.extend_from_slice(&value.to_be_bytes());
                }
            }
        }
        pdu
    }
}

/// Decoded reply to a [`Request`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Registers(Vec<u16>),
    SingleWritten { address: u16, value: u16 },
    MultipleWritten { address: u16, count: u16 },
}

/// MBAP header preceding every PDU
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MbapHeader {
    pub transaction_id: u16,
    pub protocol_id: u16,
    /// Byte count of unit id plus PDU
    pub length: u16,
    pub unit_id: u8,
}

impl MbapHeader {
    pub fn encode(&self) -> [u8; MBAP_HEADER_LEN] {
        let t = self.transaction_id.to_be_bytes();
        let p = self.protocol_id.to_be_bytes();
        let l = self.length.to_be_bytes();
        [t[0], t[1], p[0], p[1], l[0], l[1], self.unit_id]
    }

    pub fn decode(bytes: &[u8; MBAP_HEADER_LEN]) -> Self {
        Self {
            transaction_id: u16::from_be_bytes([bytes[0], bytes[1]]),
            protocol_id: u16::from_be_bytes([bytes[2], bytes[3]]),
            length: u16::from_be_bytes([bytes[4], bytes[5]]),
            unit_id: bytes[6],
        }
    }

    /// Length of the PDU that follows the header
    pub fn pdu_len(&self) -> TransportResult<usize> {
        let length = usize::from(self.length);
        if length == 0 || length - 1 > MAX_PDU_LEN {
            return Err(TransportError::UnexpectedResponse {
                reason: format!("invalid MBAP length {}", self.length),
            });
        }
        Ok(length - 1)
    }
}

/// Build a complete request frame
pub fn encode_frame(transaction_id: u16, unit_id: u8, request: &Request) -> Vec<u8> {
    let pdu = request.to_pdu();
    let header = MbapHeader {
        transaction_id,
        protocol_id: MODBUS_PROTOCOL_ID,
        length: (pdu.len() + 1) as u16,
        unit_id,
    };
    let mut frame = Vec::with_capacity(MBAP_HEADER_LEN + pdu.len());
    frame.extend_from_slice(&header.encode());
    frame.extend_from_slice(&pdu);
    frame
}

fn unexpected(reason: impl Into<String>) -> TransportError {
    TransportError::UnexpectedResponse {
        reason: reason.into(),
    }
}

fn read_u16(pdu: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([pdu[offset], pdu[offset + 1]])
}

/// Interpret the reply PDU to `request`.
///
/// Exception replies become [`TransportError::Exception`]; replies without
/// register data become [`TransportError::NoData`].
pub fn decode_response(request: &Request, pdu: &[u8]) -> TransportResult<Response> {
    let function = request.function_code();
    let address = request.address();

    let Some(&code) = pdu.first() else {
        return Err(TransportError::NoData { address });
    };
    if code == function | EXCEPTION_FLAG {
        return Err(TransportError::Exception {
            function,
            code: pdu.get(1).copied().unwrap_or(0),
            address,
        });
    }
    if code != function {
        return Err(unexpected(format!(
            "function {:#04x} in reply to {:#04x}",
            code, function
        )));
    }

    match request {
        Request::ReadHoldingRegisters { count, .. } => {
            let byte_count = pdu.get(1).copied().map(usize::from).unwrap_or(0);
            if byte_count == 0 {
                return Err(TransportError::NoData { address });
            }
            if pdu.len() != 2 + byte_count || byte_count != usize::from(*count) * 2 {
                return Err(unexpected(format!(
                    "{} data bytes for {} registers",
                    byte_count, count
                )));
            }
            let registers = pdu[2..].chunks_exact(2).map(|b| u16::from_be_bytes([b[0], b[1]]));
            Ok(Response::Registers(registers.collect()))
        }
        Request::WriteSingleRegister { value, .. } => {
            if pdu.len() != 5 {
                return Err(unexpected(format!("write echo of {} bytes", pdu.len())));
            }
            let (echo_address, echo_value) = (read_u16(pdu, 1), read_u16(pdu, 3));
            if echo_address != address || echo_value != *value {
                return Err(unexpected(format!(
                    "write echo {}={} for {}={}",
                    echo_address, echo_value, address, value
                )));
            }
            Ok(Response::SingleWritten {
                address,
                value: *value,
            })
        }
        Request::WriteMultipleRegisters { values, .. } => {
            if pdu.len() != 5 {
                return Err(unexpected(format!("write echo of {} bytes", pdu.len())));
            }
            let (echo_address, echo_count) = (read_u16(pdu, 1), read_u16(pdu, 3));
            if echo_address != address || usize::from(echo_count) != values.len() {
                return Err(unexpected(format!(
                    "wrote {} registers at {}, device confirmed {} at {}",
                    values.len(),
                    address,
                    echo_count,
                    echo_address
                )));
            }
            Ok(Response::MultipleWritten {
                address,
                count: echo_count,
            })
        }
    }
}

/// Modbus client over any byte stream
pub struct ModbusClient<S> {
    stream: S,
    unit_id: u8,
    transaction_id: u16,
}

/// Modbus client over a TCP socket
pub type ModbusTcpClient = ModbusClient<TcpStream>;

impl<S: Read + Write> ModbusClient<S> {
    /// Wrap an already open stream
    pub fn new(stream: S, unit_id: u8) -> Self {
        Self {
            stream,
            unit_id,
            transaction_id: 0,
        }
    }

    pub fn unit_id(&self) -> u8 {
        self.unit_id
    }

    pub fn into_inner(self) -> S {
        self.stream
    }

    fn next_transaction_id(&mut self) -> u16 {
        self.transaction_id = self.transaction_id.wrapping_add(1);
        self.transaction_id
    }

    /// Send one request and wait for its reply
    pub fn execute(&mut self, request: &Request) -> TransportResult<Response> {
        let transaction_id = self.next_transaction_id();
        let address = request.address();
        let frame = encode_frame(transaction_id, self.unit_id, request);
        tracing::trace!("Modbus TX [{}]: {:02x?}", transaction_id, frame);

        self.stream
            .write_all(&frame)
            .and_then(|_| self.stream.flush())
            .map_err(|e| TransportError::io("request", address, &e))?;

        let mut header_bytes = [0u8; MBAP_HEADER_LEN];
        self.stream
            .read_exact(&mut header_bytes)
            .map_err(|e| TransportError::io("reply header", address, &e))?;
        let header = MbapHeader::decode(&header_bytes);

        if header.protocol_id != MODBUS_PROTOCOL_ID {
            return Err(unexpected(format!("protocol id {}", header.protocol_id)));
        }
        if header.transaction_id != transaction_id {
            return Err(unexpected(format!(
                "transaction id {} in reply to {}",
                header.transaction_id, transaction_id
            )));
        }

        let mut pdu = vec![0u8; header.pdu_len()?];
        self.stream
            .read_exact(&mut pdu)
            .map_err(|e| TransportError::io("reply body", address, &e))?;
        tracing::trace!("Modbus RX [{}]: {:02x?}", transaction_id, pdu);

        decode_response(request, &pdu)
    }
}

impl ModbusTcpClient {
    /// Open a TCP connection to a Modbus device
    pub fn connect(
        host: &str,
        port: u16,
        unit_id: u8,
        connect_timeout: Duration,
        io_timeout: Duration,
    ) -> TransportResult<Self> {
        let failed = |reason: String| TransportError::ConnectionFailed {
            host: host.to_string(),
            port,
            reason,
        };

        let addrs: Vec<SocketAddr> = (host, port)
            .to_socket_addrs()
            .map_err(|e| failed(e.to_string()))?
            .collect();
        if addrs.is_empty() {
            return Err(failed("host did not resolve".to_string()));
        }

        let mut last_error = None;
        for addr in &addrs {
            match TcpStream::connect_timeout(addr, connect_timeout) {
                Ok(stream) => {
                    let configure = || -> io::Result<()> {
                        stream.set_read_timeout(Some(io_timeout))?;
                        stream.set_write_timeout(Some(io_timeout))?;
                        stream.set_nodelay(true)
                    };
                    configure().map_err(|e| failed(e.to_string()))?;
                    tracing::debug!("TCP connection to {} established", addr);
                    return Ok(Self::new(stream, unit_id));
                }
                Err(e) => last_error = Some(e),
            }
        }

        match last_error {
            Some(e) if e.kind() == io::ErrorKind::TimedOut => Err(TransportError::ConnectionTimeout {
                timeout_ms: connect_timeout.as_millis() as u64,
            }),
            Some(e) => Err(failed(e.to_string())),
            None => Err(failed("no address to connect to".to_string())),
        }
    }
}

impl<S: Read + Write + Send> RegisterClient for ModbusClient<S> {
    fn read_holding_registers(&mut self, address: u16, count: u16) -> TransportResult<Vec<u16>> {
        match self.execute(&Request::ReadHoldingRegisters { address, count })? {
            Response::Registers(registers) => Ok(registers),
            other => Err(unexpected(format!("{:?} in reply to a read", other))),
        }
    }

    fn write_single_register(&mut self, address: u16, value: u16) -> TransportResult<()> {
        self.execute(&Request::WriteSingleRegister { address, value })
            .map(|_| ())
    }

    fn write_multiple_registers(&mut self, address: u16, values: &[u16]) -> TransportResult<()> {
        if values.is_empty() || values.len() > MAX_WRITE_REGISTERS {
            return Err(unexpected(format!(
                "cannot write {} registers in one request",
                values.len()
            )));
        }
        self.execute(&Request::WriteMultipleRegisters {
            address,
            values: values.to_vec(),
        })
        .map(|_| ())
    }

    fn close(&mut self) -> TransportResult<()> {
        self.stream
            .flush()
            .map_err(|e| TransportError::io("close", 0, &e))
    }
}

//! Device session and program transmission
//!
//! A [`TransportSession`] owns at most one connection to the spray
//! controller. It is synchronous: every call blocks until the device has
//! answered, and the pauses between payload chunks and status polls are
//! plain sleeps.
//!
//! Transmission sequence for [`TransportSession::send_configuration`]:
//! 1. Validate and encode (nothing is written on failure)
//! 2. Clear the save status register
//! 3. Raise the writing marker, then write the control registers one by one
//! 4. Write the payload in chunks
//! 5. Set the completion marker
//! 6. Poll the save status register until the device confirms

use crate::modbus::ModbusTcpClient;
use crate::protocol::{
    EncodedProgram, ProtocolEncoder, CONTROL_BASE_REGISTER, MARKER_COMPLETE, MARKER_WRITING,
    PAYLOAD_BASE_REGISTER, SAVE_CLEAR, SAVE_STATUS_REGISTER, SAVE_SUCCESS, WRITE_MARKER_REGISTER,
};
use serde::{Deserialize, Serialize};
use spraykit_core::{Error, Result, TransportError, TransportResult};
use spraykit_geometry::Configuration;
use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

/// Register-level access to a device
pub trait RegisterClient: Send {
    fn read_holding_registers(&mut self, address: u16, count: u16) -> TransportResult<Vec<u16>>;

    fn write_single_register(&mut self, address: u16, value: u16) -> TransportResult<()>;

    fn write_multiple_registers(&mut self, address: u16, values: &[u16]) -> TransportResult<()>;

    /// Release the connection
    fn close(&mut self) -> TransportResult<()> {
        Ok(())
    }
}

/// Opens register clients for a session
pub trait Connector: Send {
    fn connect(
        &self,
        endpoint: &Endpoint,
        config: &SessionConfig,
    ) -> TransportResult<Box<dyn RegisterClient>>;
}

/// Opens Modbus TCP connections
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    fn connect(
        &self,
        endpoint: &Endpoint,
        config: &SessionConfig,
    ) -> TransportResult<Box<dyn RegisterClient>> {
        let client = ModbusTcpClient::connect(
            &endpoint.host,
            endpoint.port,
            config.unit_id,
            config.connect_timeout(),
            config.io_timeout(),
        )?;
        Ok(Box::new(client))
    }
}

/// Host and port of a device
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Timeouts and pacing of a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Modbus unit identifier
    pub unit_id: u8,
    pub connect_timeout_ms: u64,
    /// Read and write timeout of every request
    pub io_timeout_ms: u64,
    /// Registers per payload write
    pub chunk_registers: usize,
    /// Pause between payload chunks
    pub chunk_delay_ms: u64,
    /// Pause before each save status poll
    pub poll_interval_ms: u64,
    pub max_poll_attempts: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            unit_id: 1,
            connect_timeout_ms: 2000,
            io_timeout_ms: 2000,
            chunk_registers: 50,
            chunk_delay_ms: 20,
            poll_interval_ms: 100,
            max_poll_attempts: 50,
        }
    }
}

impl SessionConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn io_timeout(&self) -> Duration {
        Duration::from_millis(self.io_timeout_ms)
    }

    pub fn chunk_delay(&self) -> Duration {
        Duration::from_millis(self.chunk_delay_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Outcome of a successful transmission
#[derive(Debug, Clone, PartialEq)]
pub struct SendReport {
    pub passes: usize,
    pub primitives: usize,
    pub floats: usize,
    pub chunks: usize,
    /// Status polls until the device confirmed the save
    pub poll_attempts: u32,
    pub elapsed: Duration,
}

struct Connection {
    endpoint: Endpoint,
    client: Box<dyn RegisterClient>,
}

/// Relabel socket failures with the transmission phase they happened in
fn in_phase(err: TransportError, phase: &str) -> TransportError {
    match err {
        TransportError::Io {
            address, reason, ..
        } => TransportError::Io {
            phase: phase.to_string(),
            address,
            reason,
        },
        other => other,
    }
}

/// Connection to one spray controller
pub struct TransportSession {
    config: SessionConfig,
    connector: Box<dyn Connector>,
    connection: Option<Connection>,
    encoder: ProtocolEncoder,
}

impl TransportSession {
    /// Create a disconnected session using Modbus TCP
    pub fn new(config: SessionConfig) -> Self {
        Self::with_connector(config, Box::new(TcpConnector))
    }

    pub fn with_connector(config: SessionConfig, connector: Box<dyn Connector>) -> Self {
        Self {
            config,
            connector,
            connection: None,
            encoder: ProtocolEncoder::new(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Connect to `host:port`.
    ///
    /// Connecting to the endpoint already in use does nothing; connecting
    /// elsewhere closes the current connection first.
    pub fn connect(&mut self, host: &str, port: u16) -> TransportResult<()> {
        let endpoint = Endpoint::new(host, port);
        if let Some(connection) = &self.connection {
            if connection.endpoint == endpoint {
                tracing::debug!("Already connected to {}", endpoint);
                return Ok(());
            }
            self.disconnect();
        }

        tracing::info!("Connecting to {}", endpoint);
        let client = self.connector.connect(&endpoint, &self.config).map_err(|e| {
            tracing::warn!("Connection to {} failed: {}", endpoint, e);
            e
        })?;
        tracing::info!("Connected to {}", endpoint);
        self.connection = Some(Connection { endpoint, client });
        Ok(())
    }

    /// Close the connection. Failures are logged, never returned.
    pub fn disconnect(&mut self) {
        if let Some(mut connection) = self.connection.take() {
            if let Err(e) = connection.client.close() {
                tracing::warn!("Error while closing {}: {}", connection.endpoint, e);
            }
            tracing::info!("Disconnected from {}", connection.endpoint);
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub fn endpoint(&self) -> Option<&Endpoint> {
        self.connection.as_ref().map(|c| &c.endpoint)
    }

    fn client(&mut self) -> TransportResult<&mut dyn RegisterClient> {
        match self.connection.as_mut() {
            Some(connection) => Ok(connection.client.as_mut()),
            None => Err(TransportError::NotConnected),
        }
    }

    /// Read one signed status register
    pub fn read_status_register(&mut self, address: u16) -> TransportResult<i16> {
        let registers = self.client()?.read_holding_registers(address, 1)?;
        registers
            .first()
            .map(|&raw| raw as i16)
            .ok_or(TransportError::NoData { address })
    }

    /// Write one signed status register
    pub fn write_status_register(&mut self, address: u16, value: i16) -> TransportResult<()> {
        self.client()?.write_single_register(address, value as u16)
    }

    /// Validate, encode and transmit a configuration, then wait for the save.
    ///
    /// A missing connection is reported before the configuration is checked.
    /// Neither failure writes anything.
    pub fn send_configuration(&mut self, configuration: &Configuration) -> Result<SendReport> {
        if !self.is_connected() {
            return Err(TransportError::NotConnected.into());
        }
        let encoded = self.encoder.encode(configuration)?;

        let started = Instant::now();
        tracing::info!(
            "Sending {} passes ({} primitives, {} floats)",
            encoded.pass_count(),
            encoded.primitive_count(),
            encoded.payload.len()
        );

        let chunks = match self.transmit(&encoded) {
            Ok(chunks) => chunks,
            Err(e) => {
                tracing::error!("Transmission aborted, device program may be incomplete: {}", e);
                return Err(e.into());
            }
        };

        let poll_attempts = self.wait_for_save()?;
        let report = SendReport {
            passes: encoded.pass_count(),
            primitives: encoded.primitive_count(),
            floats: encoded.payload.len(),
            chunks,
            poll_attempts,
            elapsed: started.elapsed(),
        };
        tracing::info!(
            "Device confirmed save after {} polls ({:.2}s)",
            report.poll_attempts,
            report.elapsed.as_secs_f64()
        );
        Ok(report)
    }

    /// Steps 2 to 5 of the transmission; returns the number of payload chunks
    fn transmit(&mut self, encoded: &EncodedProgram) -> TransportResult<usize> {
        let chunk_registers = self.config.chunk_registers.max(1);
        let chunk_delay = self.config.chunk_delay();
        let client = self.client()?;

        client
            .write_single_register(SAVE_STATUS_REGISTER, SAVE_CLEAR)
            .map_err(|e| in_phase(e, "save status reset"))?;

        client
            .write_single_register(WRITE_MARKER_REGISTER, MARKER_WRITING)
            .map_err(|e| in_phase(e, "writing marker"))?;
        for (offset, &value) in encoded.control.iter().enumerate() {
            client
                .write_single_register(CONTROL_BASE_REGISTER + offset as u16, value)
                .map_err(|e| in_phase(e, "control registers"))?;
        }
        tracing::debug!("Control registers written: {:?}", encoded.control);

        let registers = encoded.payload_registers();
        let mut chunks = 0;
        for (index, chunk) in registers.chunks(chunk_registers).enumerate() {
            if index > 0 && !chunk_delay.is_zero() {
                thread::sleep(chunk_delay);
            }
            let address = PAYLOAD_BASE_REGISTER + (index * chunk_registers) as u16;
            client
                .write_multiple_registers(address, chunk)
                .map_err(|e| in_phase(e, "payload chunk"))?;
            tracing::debug!("Payload chunk {} written at {}", index, address);
            chunks += 1;
        }

        client
            .write_single_register(WRITE_MARKER_REGISTER, MARKER_COMPLETE)
            .map_err(|e| in_phase(e, "completion marker"))?;
        Ok(chunks)
    }

    /// Step 6: poll until the device reports success.
    ///
    /// Exception and empty replies count as failed attempts; socket failures
    /// abort immediately.
    fn wait_for_save(&mut self) -> Result<u32> {
        let attempts = self.config.max_poll_attempts;
        let interval = self.config.poll_interval();

        for attempt in 1..=attempts {
            if !interval.is_zero() {
                thread::sleep(interval);
            }
            match self.read_status_register(SAVE_STATUS_REGISTER) {
                Ok(SAVE_SUCCESS) => return Ok(attempt),
                Ok(status) => tracing::debug!("Save status {} (poll {}/{})", status, attempt, attempts),
                Err(e @ (TransportError::Exception { .. } | TransportError::NoData { .. })) => {
                    tracing::debug!("Save status poll {}/{} failed: {}", attempt, attempts, e)
                }
                Err(e) => return Err(in_phase(e, "save status poll").into()),
            }
        }

        let waited_ms = u64::from(attempts) * self.config.poll_interval_ms;
        tracing::error!("Device did not confirm save after {} polls", attempts);
        Err(Error::SaveTimeout {
            attempts,
            waited_ms,
        })
    }
}

impl Drop for TransportSession {
    fn drop(&mut self) {
        self.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct RefusingConnector;

    impl Connector for RefusingConnector {
        fn connect(
            &self,
            endpoint: &Endpoint,
            _config: &SessionConfig,
        ) -> TransportResult<Box<dyn RegisterClient>> {
            Err(TransportError::ConnectionFailed {
                host: endpoint.host.clone(),
                port: endpoint.port,
                reason: "refused".to_string(),
            })
        }
    }

    #[test]
    fn test_session_config_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.chunk_registers, 50);
        assert_eq!(config.chunk_delay(), Duration::from_millis(20));
        assert_eq!(config.poll_interval(), Duration::from_millis(100));
        assert_eq!(config.max_poll_attempts, 50);
        assert_eq!(config.connect_timeout(), Duration::from_secs(2));
    }

    #[test]
    fn test_disconnected_operations_fail() {
        let mut session =
            TransportSession::with_connector(SessionConfig::default(), Box::new(RefusingConnector));
        assert_eq!(
            session.read_status_register(1001),
            Err(TransportError::NotConnected)
        );
        assert_eq!(
            session.write_status_register(1010, 1),
            Err(TransportError::NotConnected)
        );
        // Disconnecting twice is harmless
        session.disconnect();
        session.disconnect();
    }

    #[test]
    fn test_failed_connect_stays_disconnected() {
        let mut session =
            TransportSession::with_connector(SessionConfig::default(), Box::new(RefusingConnector));
        let err = session.connect("10.0.0.5", 502).unwrap_err();
        assert!(matches!(err, TransportError::ConnectionFailed { port: 502, .. }));
        assert!(!session.is_connected());
    }

    #[test]
    fn test_phase_relabel_keeps_address() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed");
        let err = in_phase(TransportError::io("request", 4050, &io), "payload chunk");
        assert_eq!(
            err,
            TransportError::Io {
                phase: "payload chunk".to_string(),
                address: 4050,
                reason: "closed".to_string()
            }
        );
    }
}

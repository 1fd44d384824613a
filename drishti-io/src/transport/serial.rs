//! UART link to the lidar

use super::Transport;
use crate::config::LidarConfig;
use crate::error::Result;
use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::{ErrorKind, Read, Write};

/// Serial port configured for the G2: 8N1, no flow control
///
/// Reads wait at most the configured poll timeout and report an idle line
/// as `Ok(0)`, which the reader thread uses to re-check its shutdown flag.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
    name: String,
}

impl SerialTransport {
    /// Open `config.port` at `config.baud_rate`
    pub fn open(config: &LidarConfig) -> Result<Self> {
        let port = serialport::new(&config.port, config.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(config.poll_timeout())
            .open()?;

        log::info!(
            "Lidar port {} open at {} baud, poll {:?}",
            config.port,
            config.baud_rate,
            config.poll_timeout()
        );

        Ok(Self {
            port,
            name: config.port.clone(),
        })
    }

    /// Device path this transport was opened on
    pub fn port_name(&self) -> &str {
        &self.name
    }
}

impl Transport for SerialTransport {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        match self.port.read(buffer) {
            Ok(n) => Ok(n),
            Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        Ok(self.port.write(data)?)
    }

    fn flush(&mut self) -> Result<()> {
        Ok(self.port.flush()?)
    }

    fn available(&mut self) -> Result<usize> {
        Ok(self.port.bytes_to_read()? as usize)
    }

    fn discard_input(&mut self) -> Result<usize> {
        let pending = self.available()?;
        self.port.clear(ClearBuffer::Input)?;
        Ok(pending)
    }
}

//! YDLidar G2 driver
//!
//! ```text
//!  serial ──▶ g2-reader thread ──▶ ScanDecoder ──▶ bounded queue ──▶ read_cycle()
//!                (owns reads)      (frames+cycles)  (Block | DropOldest)
//! ```
//! Device queries (info, health, frequency) are request/response exchanges
//! and are only available while the reader is stopped.

pub mod constants;
pub mod decoder;
pub mod protocol;
mod reader;
pub mod sim;

pub use decoder::{CycleAssembler, DecoderStats, FrameDecoder, ScanDecoder, ScanFrame};
pub use protocol::{Command, DeviceInfo, FrameHeader, HealthStatus, PacketKind, ResponseHeader};
pub use reader::ReaderStats;

use crate::config::{BackpressurePolicy, LidarConfig};
use crate::error::{Error, Result};
use crate::transport::{SerialTransport, Transport};
use crate::types::Cycle;
use constants::*;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use parking_lot::Mutex;
use reader::ReaderContext;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

pub(crate) type SharedTransport = Arc<Mutex<Box<dyn Transport>>>;

/// G2 lidar driver
pub struct G2Driver {
    transport: SharedTransport,
    config: LidarConfig,
    shutdown: Arc<AtomicBool>,
    reader_handle: Option<JoinHandle<()>>,
    cycle_rx: Option<Receiver<Result<Cycle>>>,
    stats: Arc<Mutex<ReaderStats>>,
}

impl G2Driver {
    /// Create a driver over an already-open transport
    pub fn new<T: Transport + 'static>(transport: T, config: LidarConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            transport: Arc::new(Mutex::new(Box::new(transport))),
            config,
            shutdown: Arc::new(AtomicBool::new(false)),
            reader_handle: None,
            cycle_rx: None,
            stats: Arc::new(Mutex::new(ReaderStats::default())),
        })
    }

    /// Open the configured serial port
    pub fn open(config: LidarConfig) -> Result<Self> {
        config.validate()?;
        let transport = SerialTransport::open(&config)?;
        Self::new(transport, config)
    }

    pub fn config(&self) -> &LidarConfig {
        &self.config
    }

    /// True while the reader thread is running
    pub fn is_enabled(&self) -> bool {
        self.reader_handle.is_some()
    }

    /// Start scanning: send start-scan and spawn the reader thread
    pub fn enable(&mut self) -> Result<()> {
        if self.is_enabled() {
            return Err(Error::AlreadyScanning);
        }

        {
            let mut transport = self.transport.lock();
            transport.write_all(&Command::StartScan.to_bytes())?;
            transport.flush()?;
        }

        let (tx, rx) = crossbeam_channel::bounded(self.config.queue_capacity);
        let evict = match self.config.backpressure {
            BackpressurePolicy::DropOldest => Some(rx.clone()),
            BackpressurePolicy::Block => None,
        };
        self.shutdown.store(false, Ordering::Relaxed);
        *self.stats.lock() = ReaderStats::default();

        let ctx = ReaderContext {
            transport: Arc::clone(&self.transport),
            shutdown: Arc::clone(&self.shutdown),
            tx,
            evict,
            backpressure: self.config.backpressure,
            checksum: self.config.checksum,
            stats: Arc::clone(&self.stats),
        };

        let handle = thread::Builder::new()
            .name("g2-reader".to_string())
            .spawn(move || reader::reader_loop(ctx))?;

        self.reader_handle = Some(handle);
        self.cycle_rx = Some(rx);
        log::info!(
            "G2: Scanning enabled (queue {}, {:?} backpressure, {:?} checksum)",
            self.config.queue_capacity,
            self.config.backpressure,
            self.config.checksum
        );
        Ok(())
    }

    /// Stop scanning: signal and join the reader, then send stop-scan
    ///
    /// Queued cycles are discarded. A no-op when already disabled.
    pub fn disable(&mut self) -> Result<()> {
        let Some(handle) = self.reader_handle.take() else {
            return Ok(());
        };

        log::info!("G2: Stopping scan...");
        self.shutdown.store(true, Ordering::Relaxed);
        let joined = handle.join();
        self.cycle_rx = None;

        {
            let mut transport = self.transport.lock();
            transport.write_all(&Command::StopScan.to_bytes())?;
            transport.flush()?;
        }

        joined.map_err(|_| Error::ThreadPanic)?;
        log::info!("G2: Scanning stopped");
        Ok(())
    }

    /// Next complete revolution, waiting at most `timeout`
    ///
    /// `Error::Timeout` means no revolution completed in time; the driver is
    /// still usable. A transport failure in the reader is returned once, after
    /// which the queue reports `Error::ReaderStopped`.
    pub fn read_cycle(&self, timeout: Duration) -> Result<Cycle> {
        let rx = self.cycle_rx.as_ref().ok_or(Error::NotScanning)?;
        match rx.recv_timeout(timeout) {
            Ok(item) => item,
            Err(RecvTimeoutError::Timeout) => Err(Error::Timeout),
            Err(RecvTimeoutError::Disconnected) => Err(Error::ReaderStopped),
        }
    }

    /// Next revolution if one is already queued
    pub fn try_read_cycle(&self) -> Option<Result<Cycle>> {
        self.cycle_rx.as_ref()?.try_recv().ok()
    }

    /// One-shot capture: enable, skip `skip` revolutions, return the next, disable
    ///
    /// Each revolution is awaited for at most the response timeout.
    pub fn capture(&mut self, skip: usize) -> Result<Cycle> {
        self.enable()?;
        let timeout = self.config.response_timeout();
        let result = (0..skip)
            .try_for_each(|_| self.read_cycle(timeout).map(drop))
            .and_then(|()| self.read_cycle(timeout));
        let stopped = self.disable();
        let cycle = result?;
        stopped?;
        Ok(cycle)
    }

    /// Reader counters since the last `enable`
    pub fn stats(&self) -> ReaderStats {
        *self.stats.lock()
    }

    /// Query model, firmware, hardware and serial number
    pub fn device_info(&mut self) -> Result<DeviceInfo> {
        let payload = self.request(Command::GetDeviceInfo, Some(RESPONSE_TYPE_DEVICE_INFO))?;
        let info = DeviceInfo::parse(&payload)?;
        log::info!(
            "G2: Model {:#04x}, firmware {}, hardware {}, serial {}",
            info.model,
            info.firmware_version(),
            info.hardware,
            info.serial_number()
        );
        Ok(info)
    }

    /// Query the health status
    pub fn health(&mut self) -> Result<HealthStatus> {
        let payload = self.request(Command::GetHealth, Some(RESPONSE_TYPE_HEALTH))?;
        let health = HealthStatus::parse(&payload)?;
        if !health.is_ok() {
            log::warn!(
                "G2: Health status {} (error code {:#06x})",
                health.status,
                health.error_code
            );
        }
        Ok(health)
    }

    /// Query the configured scan frequency in Hz
    pub fn scan_frequency(&mut self) -> Result<f32> {
        // Firmware revisions disagree on the type code, so it is not checked
        let payload = self.request(Command::GetScanFrequency, None)?;
        protocol::parse_scan_frequency(&payload)
    }

    fn request(&mut self, command: Command, expected_type: Option<u8>) -> Result<Vec<u8>> {
        if self.is_enabled() {
            return Err(Error::AlreadyScanning);
        }

        let deadline = Instant::now() + self.config.response_timeout();
        let mut transport = self.transport.lock();
        let stale = transport.discard_input()?;
        if stale > 0 {
            log::debug!("G2: Discarded {} stale bytes before {:?}", stale, command);
        }

        transport.write_all(&command.to_bytes())?;
        transport.flush()?;

        let header = read_response_header(&mut **transport, deadline)?;
        if let Some(expected) = expected_type.filter(|&t| t != header.type_code) {
            return Err(Error::InvalidPacket(format!(
                "{:?}: expected response type {:#04x}, got {:#04x}",
                command, expected, header.type_code
            )));
        }

        let length = header.length as usize;
        if length > MAX_RESPONSE_PAYLOAD {
            return Err(Error::InvalidPacket(format!(
                "{:?}: response length {} too large",
                command, length
            )));
        }

        let mut payload = vec![0u8; length];
        read_exact_before(&mut **transport, &mut payload, deadline)?;
        log::trace!("G2: {:?} response {:02X?}", command, payload);
        Ok(payload)
    }
}

impl Drop for G2Driver {
    fn drop(&mut self) {
        let _ = self.disable();
    }
}

/// Scan for the response sign and read the rest of the header
fn read_response_header(
    transport: &mut dyn Transport,
    deadline: Instant,
) -> Result<ResponseHeader> {
    let mut header = [0u8; RESPONSE_HEADER_SIZE];
    let mut byte = [0u8; 1];
    let mut matched = 0;

    while matched < 2 {
        read_exact_before(transport, &mut byte, deadline)?;
        matched = match (matched, byte[0]) {
            (0, RESPONSE_SYNC_1) | (1, RESPONSE_SYNC_1) => 1,
            (1, RESPONSE_SYNC_2) => 2,
            _ => 0,
        };
    }

    header[0] = RESPONSE_SYNC_1;
    header[1] = RESPONSE_SYNC_2;
    read_exact_before(transport, &mut header[2..], deadline)?;
    ResponseHeader::parse(&header)
}

/// Fill `buf` completely or fail with `Error::Timeout` at `deadline`
fn read_exact_before(transport: &mut dyn Transport, buf: &mut [u8], deadline: Instant) -> Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = transport.read(&mut buf[filled..])?;
        if n == 0 {
            if Instant::now() >= deadline {
                return Err(Error::Timeout);
            }
            thread::sleep(Duration::from_millis(1));
        }
        filled += n;
    }
    Ok(())
}

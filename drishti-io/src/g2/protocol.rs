//! YDLidar G2 wire protocol
//!
//! Scan frame (little-endian):
//! ```text
//! ┌──────┬──────┬────┬─────┬───────┬───────┬───────┬──────────────┐
//! │ 0xAA │ 0x55 │ CT │ LSN │ FSA   │ LSA   │ CS    │ LSN × 3 B    │
//! │      │      │    │     │ (u16) │ (u16) │ (u16) │ samples      │
//! └──────┴──────┴────┴─────┴───────┴───────┴───────┴──────────────┘
//! ```
//! - CT bit 0: 1 = first frame of a revolution; bits 1-7: frequency × 10
//! - FSA/LSA: first/last sample angle, `(code >> 1) / 64` degrees
//! - Sample: bits 0-9 intensity, bits 10-23 distance (mm)
//!
//! Command responses start with `A5 5A`, a u32 whose low 30 bits are the
//! payload length and top 2 bits the mode, then a type byte.

use super::constants::*;
use crate::error::{Error, Result};
use crate::types::ScanSample;

/// Frame kind carried in CT bit 0
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketKind {
    /// Mid-revolution frame
    Continuation,
    /// First frame of a new revolution
    CycleStart,
}

/// Parsed scan frame header (the 8 bytes after the sync marker)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameHeader {
    pub kind: PacketKind,
    pub frequency_hz: f32,
    pub sample_count: u8,
    pub start_code: u16,
    pub end_code: u16,
    pub checksum: u16,
}

impl FrameHeader {
    pub fn parse(buf: &[u8; FRAME_HEADER_SIZE]) -> Self {
        let status = buf[0];
        let kind = if status & CT_CYCLE_START != 0 {
            PacketKind::CycleStart
        } else {
            PacketKind::Continuation
        };

        Self {
            kind,
            frequency_hz: f32::from(status >> 1) / 10.0,
            sample_count: buf[1],
            start_code: u16::from_le_bytes([buf[2], buf[3]]),
            end_code: u16::from_le_bytes([buf[4], buf[5]]),
            checksum: u16::from_le_bytes([buf[6], buf[7]]),
        }
    }

    /// Payload size in bytes
    pub fn payload_len(&self) -> usize {
        usize::from(self.sample_count) * SAMPLE_SIZE
    }

    /// First sample angle in degrees
    pub fn start_angle(&self) -> f64 {
        decode_angle(self.start_code)
    }

    /// Last sample angle in degrees
    pub fn end_angle(&self) -> f64 {
        decode_angle(self.end_code)
    }

    /// Angular span covered by the frame, wrapped through 360°
    pub fn angle_span(&self) -> f64 {
        let span = self.end_angle() - self.start_angle();
        if span < 0.0 { span + 360.0 } else { span }
    }

    /// Uncorrected angle of sample `index`, in degrees
    ///
    /// Interpolates over N+1 intervals, so the last sample stops one step
    /// short of LSA.
    pub fn interpolated_angle(&self, index: usize) -> f64 {
        let steps = f64::from(self.sample_count) + 1.0;
        self.start_angle() + self.angle_span() / steps * (index as f64 + 1.0)
    }

    /// Decode sample `index` from its 3 payload bytes
    pub fn decode_sample(&self, index: usize, bytes: [u8; SAMPLE_SIZE]) -> ScanSample {
        let (intensity, distance) = split_sample(bytes);
        let degrees = self.interpolated_angle(index) + angle_correction(distance);
        ScanSample::new(
            degrees.rem_euclid(360.0).to_radians(),
            distance,
            intensity,
        )
    }
}

/// Decode an FSA/LSA angle code into degrees
pub fn decode_angle(code: u16) -> f64 {
    f64::from(code >> 1) / ANGLE_SCALE
}

/// Encode degrees into an angle code with the check bit set
pub fn encode_angle(degrees: f64) -> u16 {
    let scaled = (degrees * ANGLE_SCALE).clamp(0.0, f64::from(u16::MAX >> 1));
    ((scaled as u16) << 1) | 1
}

/// Split a packed sample into (intensity, distance mm)
pub fn split_sample(bytes: [u8; SAMPLE_SIZE]) -> (u16, u16) {
    let raw = u32::from(bytes[0]) | (u32::from(bytes[1]) << 8) | (u32::from(bytes[2]) << 16);
    (
        (raw & INTENSITY_MASK) as u16,
        (raw >> DISTANCE_SHIFT) as u16,
    )
}

/// Pack (intensity, distance mm) into sample bytes
pub fn pack_sample(intensity: u16, distance: u16) -> [u8; SAMPLE_SIZE] {
    let raw = (u32::from(intensity) & INTENSITY_MASK)
        | (u32::from(distance.min(MAX_DISTANCE_CODE)) << DISTANCE_SHIFT);
    let bytes = raw.to_le_bytes();
    [bytes[0], bytes[1], bytes[2]]
}

/// Distance-dependent angle correction
///
/// Zero for the no-return sentinel. The value is in radians and is added
/// unchanged to the degree angle, matching the sensor vendor's reference
/// decoder.
pub fn angle_correction(distance: u16) -> f64 {
    if distance == 0 {
        return 0.0;
    }
    let d = f64::from(distance);
    (CORRECTION_BASELINE * (CORRECTION_DISTANCE - d)).atan2(CORRECTION_DISTANCE * d)
}

/// XOR checksum over a frame
///
/// `header` is the 8 bytes after the sync marker; its CS field is ignored.
pub fn frame_checksum(header: &[u8; FRAME_HEADER_SIZE], payload: &[u8]) -> u16 {
    let start = u16::from_le_bytes([header[2], header[3]]);
    let end = u16::from_le_bytes([header[4], header[5]]);
    let status_count = u16::from_le_bytes([header[0], header[1]]);

    let samples = payload
        .chunks_exact(SAMPLE_SIZE)
        .fold(0u16, |acc, s| acc ^ u16::from(s[0]) ^ u16::from_le_bytes([s[1], s[2]]));

    PACKET_HEADER_WORD ^ start ^ samples ^ status_count ^ end
}

/// Check a frame against the checksum carried in its header
pub fn verify_checksum(header: &[u8; FRAME_HEADER_SIZE], payload: &[u8]) -> Result<()> {
    let expected = u16::from_le_bytes([header[6], header[7]]);
    let actual = frame_checksum(header, payload);
    if expected == actual {
        Ok(())
    } else {
        Err(Error::ChecksumError { expected, actual })
    }
}

/// Host-to-device commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Command {
    StartScan = CMD_START_SCAN,
    StopScan = CMD_STOP_SCAN,
    GetDeviceInfo = CMD_GET_DEVICE_INFO,
    GetHealth = CMD_GET_HEALTH,
    GetScanFrequency = CMD_GET_SCAN_FREQUENCY,
}

impl Command {
    pub const fn to_bytes(self) -> [u8; 2] {
        [CMD_SYNC_BYTE, self as u8]
    }
}

/// Command response header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseHeader {
    /// Payload length in bytes
    pub length: u32,
    /// 0 = single response, 1 = continuous stream
    pub mode: u8,
    pub type_code: u8,
}

impl ResponseHeader {
    pub fn parse(buf: &[u8; RESPONSE_HEADER_SIZE]) -> Result<Self> {
        if buf[0] != RESPONSE_SYNC_1 || buf[1] != RESPONSE_SYNC_2 {
            return Err(Error::InvalidPacket(format!(
                "bad response sign {:02X} {:02X}",
                buf[0], buf[1]
            )));
        }
        let word = u32::from_le_bytes([buf[2], buf[3], buf[4], buf[5]]);
        Ok(Self {
            length: word & RESPONSE_LENGTH_MASK,
            mode: (word >> RESPONSE_MODE_SHIFT) as u8,
            type_code: buf[6],
        })
    }

    pub fn to_bytes(&self) -> [u8; RESPONSE_HEADER_SIZE] {
        let word = (self.length & RESPONSE_LENGTH_MASK) | (u32::from(self.mode) << RESPONSE_MODE_SHIFT);
        let w = word.to_le_bytes();
        [RESPONSE_SYNC_1, RESPONSE_SYNC_2, w[0], w[1], w[2], w[3], self.type_code]
    }
}

/// Device identification returned by `GetDeviceInfo`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceInfo {
    pub model: u8,
    pub firmware_major: u8,
    pub firmware_minor: u8,
    pub hardware: u8,
    /// One decimal digit per byte
    pub serial: [u8; SERIAL_NUMBER_SIZE],
}

impl DeviceInfo {
    pub fn parse(payload: &[u8]) -> Result<Self> {
        if payload.len() < DEVICE_INFO_SIZE {
            return Err(Error::InvalidPacket(format!(
                "device info needs {} bytes, got {}",
                DEVICE_INFO_SIZE,
                payload.len()
            )));
        }
        let mut serial = [0u8; SERIAL_NUMBER_SIZE];
        serial.copy_from_slice(&payload[4..DEVICE_INFO_SIZE]);
        Ok(Self {
            model: payload[0],
            firmware_minor: payload[1],
            firmware_major: payload[2],
            hardware: payload[3],
            serial,
        })
    }

    /// Firmware version as "major.minor"
    pub fn firmware_version(&self) -> String {
        format!("{}.{}", self.firmware_major, self.firmware_minor)
    }

    /// Serial number as a digit string
    pub fn serial_number(&self) -> String {
        self.serial
            .iter()
            .map(|&digit| char::from_digit(u32::from(digit), 10).unwrap_or('?'))
            .collect()
    }
}

/// Health report returned by `GetHealth`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthStatus {
    /// 0 = good, 1 = warning, 2 = error
    pub status: u8,
    pub error_code: u16,
}

impl HealthStatus {
    pub fn parse(payload: &[u8]) -> Result<Self> {
        if payload.len() < HEALTH_SIZE {
            return Err(Error::InvalidPacket(format!(
                "health needs {} bytes, got {}",
                HEALTH_SIZE,
                payload.len()
            )));
        }
        Ok(Self {
            status: payload[0],
            error_code: u16::from_le_bytes([payload[1], payload[2]]),
        })
    }

    pub fn is_ok(&self) -> bool {
        self.status == 0
    }
}

/// Parse a `GetScanFrequency` payload into Hz
pub fn parse_scan_frequency(payload: &[u8]) -> Result<f32> {
    let Some(bytes) = payload.get(..SCAN_FREQUENCY_SIZE) else {
        return Err(Error::InvalidPacket(format!(
            "scan frequency needs {} bytes, got {}",
            SCAN_FREQUENCY_SIZE,
            payload.len()
        )));
    };
    let raw = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    Ok(raw as f32 / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn header_bytes(ct: u8, lsn: u8, fsa: u16, lsa: u16) -> [u8; FRAME_HEADER_SIZE] {
        let fsa = fsa.to_le_bytes();
        let lsa = lsa.to_le_bytes();
        [ct, lsn, fsa[0], fsa[1], lsa[0], lsa[1], 0, 0]
    }

    #[test]
    fn test_header_parse() {
        let header = FrameHeader::parse(&header_bytes(0x47, 10, 0x0B41, 0x1C81));
        assert_eq!(header.kind, PacketKind::CycleStart);
        assert_relative_eq!(header.frequency_hz, 3.5);
        assert_eq!(header.sample_count, 10);
        assert_eq!(header.payload_len(), 30);
        assert_relative_eq!(header.start_angle(), 22.5);
        assert_relative_eq!(header.end_angle(), 57.0);
    }

    #[test]
    fn test_span_wraps_through_zero() {
        let header = FrameHeader::parse(&header_bytes(
            0,
            4,
            encode_angle(350.0),
            encode_angle(10.0),
        ));
        assert_eq!(header.kind, PacketKind::Continuation);
        assert_relative_eq!(header.angle_span(), 20.0);
    }

    #[test]
    fn test_interpolation_uses_n_plus_one_steps() {
        let header = FrameHeader::parse(&header_bytes(
            0,
            3,
            encode_angle(10.0),
            encode_angle(30.0),
        ));
        assert_relative_eq!(header.interpolated_angle(0), 15.0);
        assert_relative_eq!(header.interpolated_angle(1), 20.0);
        assert_relative_eq!(header.interpolated_angle(2), 25.0);
    }

    #[test]
    fn test_sample_split() {
        // distance 1000, intensity 0x155
        let raw: u32 = (1000 << 10) | 0x155;
        let bytes = raw.to_le_bytes();
        assert_eq!(split_sample([bytes[0], bytes[1], bytes[2]]), (0x155, 1000));
        assert_eq!(pack_sample(0x155, 1000), [bytes[0], bytes[1], bytes[2]]);
    }

    #[test]
    fn test_angle_correction() {
        assert_eq!(angle_correction(0), 0.0);
        // Zero at the correction distance, negative beyond it
        assert_relative_eq!(angle_correction(155), 0.0, epsilon = 1e-3);
        assert!(angle_correction(1000) < 0.0);
        assert!(angle_correction(100) > 0.0);
        assert_relative_eq!(
            angle_correction(1000),
            (21.8f64 * (155.3 - 1000.0)).atan2(155.3 * 1000.0)
        );
    }

    #[test]
    fn test_decoded_angle_is_wrapped_radians() {
        let header = FrameHeader::parse(&header_bytes(
            0,
            1,
            encode_angle(359.5),
            encode_angle(0.5),
        ));
        // 359.5 + 1.0 / 2 = 360.0 -> wraps to ~0 after a small negative correction
        let sample = header.decode_sample(0, pack_sample(0, 2000));
        let expected = (360.0 + angle_correction(2000)).rem_euclid(360.0).to_radians();
        assert_relative_eq!(sample.angle, expected, epsilon = 1e-9);
        assert!(sample.angle < std::f64::consts::TAU);
    }

    #[test]
    fn test_checksum_covers_every_word() {
        let header = header_bytes(0x01, 1, 0x0001, 0x0001);
        let payload = [0x12, 0x34, 0x56];
        // PH ^ FSA ^ 0x0012 ^ 0x5634 ^ (LSN<<8 | CT) ^ LSA
        let expected: u16 = 0x55AA ^ 0x0001 ^ 0x0012 ^ 0x5634 ^ 0x0101 ^ 0x0001;
        assert_eq!(frame_checksum(&header, &payload), expected);

        let mut with_cs = header;
        with_cs[6..8].copy_from_slice(&expected.to_le_bytes());
        assert!(verify_checksum(&with_cs, &payload).is_ok());
        assert!(matches!(
            verify_checksum(&with_cs, &[0x13, 0x34, 0x56]),
            Err(Error::ChecksumError { .. })
        ));
    }

    #[test]
    fn test_command_bytes() {
        assert_eq!(Command::StartScan.to_bytes(), [0xA5, 0x60]);
        assert_eq!(Command::StopScan.to_bytes(), [0xA5, 0x65]);
        assert_eq!(Command::GetDeviceInfo.to_bytes(), [0xA5, 0x90]);
        assert_eq!(Command::GetHealth.to_bytes(), [0xA5, 0x92]);
        assert_eq!(Command::GetScanFrequency.to_bytes(), [0xA5, 0x0D]);
    }

    #[test]
    fn test_response_header() {
        let header = ResponseHeader::parse(&[0xA5, 0x5A, 0x05, 0x00, 0x00, 0x40, 0x81]).unwrap();
        assert_eq!(header.length, 5);
        assert_eq!(header.mode, 1);
        assert_eq!(header.type_code, 0x81);
        assert_eq!(header.to_bytes(), [0xA5, 0x5A, 0x05, 0x00, 0x00, 0x40, 0x81]);

        assert!(ResponseHeader::parse(&[0xA5, 0x00, 0, 0, 0, 0, 0]).is_err());
    }

    #[test]
    fn test_device_info_parse() {
        let mut payload = vec![0x0F, 0x03, 0x01, 0x02];
        payload.extend([2, 0, 2, 4, 0, 1, 1, 5, 0, 0, 0, 0, 0, 0, 4, 2]);
        let info = DeviceInfo::parse(&payload).unwrap();
        assert_eq!(info.model, 0x0F);
        assert_eq!(info.firmware_version(), "1.3");
        assert_eq!(info.hardware, 2);
        assert_eq!(info.serial_number(), "2024011500000042");

        assert!(DeviceInfo::parse(&payload[..10]).is_err());
    }

    #[test]
    fn test_health_and_frequency_parse() {
        let health = HealthStatus::parse(&[0x00, 0x00, 0x00]).unwrap();
        assert!(health.is_ok());
        let health = HealthStatus::parse(&[0x02, 0x34, 0x12]).unwrap();
        assert!(!health.is_ok());
        assert_eq!(health.error_code, 0x1234);

        assert_relative_eq!(parse_scan_frequency(&1000u32.to_le_bytes()).unwrap(), 10.0);
        assert!(parse_scan_frequency(&[1, 2]).is_err());
    }
}

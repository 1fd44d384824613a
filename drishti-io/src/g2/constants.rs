//! Constants for the YDLidar G2

// Scan frame sync marker (PH = 0x55AA little-endian)
pub const SYNC_BYTE_1: u8 = 0xAA;
pub const SYNC_BYTE_2: u8 = 0x55;
pub const PACKET_HEADER_WORD: u16 = 0x55AA;

// Scan frame layout
pub const FRAME_HEADER_SIZE: usize = 8; // CT, LSN, FSA(2), LSA(2), CS(2)
pub const SAMPLE_SIZE: usize = 3; // 10-bit intensity + 14-bit distance
pub const CT_CYCLE_START: u8 = 0x01; // CT bit 0
pub const INTENSITY_MASK: u32 = 0x03FF;
pub const DISTANCE_SHIFT: u32 = 10;
pub const MAX_DISTANCE_CODE: u16 = 0x3FFF;

// Angle code: bit 0 is a check bit, bits 1..16 are degrees × 64
pub const ANGLE_SCALE: f64 = 64.0;

// Distance-dependent angle correction (triangulation geometry)
pub const CORRECTION_BASELINE: f64 = 21.8;
pub const CORRECTION_DISTANCE: f64 = 155.3;

// Rated measuring range
pub const MIN_RANGE_MM: u16 = 120;
pub const MAX_RANGE_MM: u16 = 16_000;

// Commands: [CMD_SYNC_BYTE, id]
pub const CMD_SYNC_BYTE: u8 = 0xA5;
pub const CMD_START_SCAN: u8 = 0x60;
pub const CMD_STOP_SCAN: u8 = 0x65;
pub const CMD_GET_DEVICE_INFO: u8 = 0x90;
pub const CMD_GET_HEALTH: u8 = 0x92;
pub const CMD_GET_SCAN_FREQUENCY: u8 = 0x0D;

// Response header: A5 5A, u32 (30-bit length | 2-bit mode), type
pub const RESPONSE_SYNC_1: u8 = 0xA5;
pub const RESPONSE_SYNC_2: u8 = 0x5A;
pub const RESPONSE_HEADER_SIZE: usize = 7;
pub const RESPONSE_LENGTH_MASK: u32 = 0x3FFF_FFFF;
pub const RESPONSE_MODE_SHIFT: u32 = 30;
pub const RESPONSE_TYPE_DEVICE_INFO: u8 = 0x04;
pub const RESPONSE_TYPE_HEALTH: u8 = 0x06;
pub const MAX_RESPONSE_PAYLOAD: usize = 64;

// Payload sizes
pub const DEVICE_INFO_SIZE: usize = 20;
pub const HEALTH_SIZE: usize = 3;
pub const SCAN_FREQUENCY_SIZE: usize = 4;
pub const SERIAL_NUMBER_SIZE: usize = 16;

// Reader thread
pub const READ_CHUNK_SIZE: usize = 512;
pub const SEND_RETRY_INTERVAL_MS: u64 = 50;
pub const CYCLE_CAPACITY_HINT: usize = 1024;

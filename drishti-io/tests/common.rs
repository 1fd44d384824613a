//! Test utilities for DrishtiIO integration tests.

#![allow(dead_code)]

use drishti_io::g2::sim::RoomSimulator;
use drishti_io::{BackpressurePolicy, LidarConfig};
use std::thread;
use std::time::{Duration, Instant};

/// Driver config with short timeouts for tests.
pub fn test_config() -> LidarConfig {
    LidarConfig {
        port: "mock".to_string(),
        poll_timeout_ms: 10,
        response_timeout_ms: 200,
        ..LidarConfig::default()
    }
}

/// Same as [`test_config`] with a given queue depth and policy.
pub fn queue_config(capacity: usize, backpressure: BackpressurePolicy) -> LidarConfig {
    LidarConfig {
        queue_capacity: capacity,
        backpressure,
        ..test_config()
    }
}

/// Byte stream of `revolutions` noiseless revolutions in a 4 m × 3 m room.
///
/// Yields `revolutions - 1` cycles once decoded.
pub fn room_stream(revolutions: usize) -> Vec<u8> {
    RoomSimulator::new(4000.0, 3000.0, 42)
        .with_layout(6, 20)
        .stream(revolutions)
}

/// Poll `condition` until it holds or `timeout` passes.
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}

/// Command response bytes: header followed by payload.
pub fn response(type_code: u8, payload: &[u8]) -> Vec<u8> {
    let mut bytes = vec![0xA5, 0x5A];
    bytes.extend((payload.len() as u32).to_le_bytes());
    bytes.push(type_code);
    bytes.extend_from_slice(payload);
    bytes
}

//! Sensor data types

mod scan;

pub use scan::{Cycle, ScanSample};

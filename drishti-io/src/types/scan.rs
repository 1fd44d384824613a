//! Lidar scan types

use crate::g2::constants::{MAX_RANGE_MM, MIN_RANGE_MM};

/// A single range measurement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanSample {
    /// Angle in radians, in [0, 2π)
    pub angle: f64,
    /// Distance in millimeters; 0 means no return
    pub distance: u16,
    /// Signal strength (10 bits)
    pub intensity: u16,
}

impl ScanSample {
    /// Create new sample
    pub fn new(angle: f64, distance: u16, intensity: u16) -> Self {
        Self {
            angle,
            distance,
            intensity,
        }
    }

    /// True for the "no return" sentinel
    pub fn is_no_return(&self) -> bool {
        self.distance == 0
    }

    /// True when the distance lies within the sensor's rated range
    pub fn is_valid(&self) -> bool {
        (MIN_RANGE_MM..=MAX_RANGE_MM).contains(&self.distance)
    }

    /// Convert to Cartesian coordinates (x, y) in millimeters
    pub fn to_cartesian(&self) -> (f64, f64) {
        let distance = f64::from(self.distance);
        (distance * self.angle.cos(), distance * self.angle.sin())
    }
}

/// One revolution of samples, in arrival order
#[derive(Debug, Clone, PartialEq)]
pub struct Cycle {
    /// Samples spanning the revolution
    pub samples: Vec<ScanSample>,
    /// 1-based position in the decoded stream
    pub sequence: u64,
    /// Rotation frequency reported by the closing header, in Hz
    pub frequency_hz: f32,
}

impl Cycle {
    /// Create a cycle
    pub fn new(sequence: u64, frequency_hz: f32, samples: Vec<ScanSample>) -> Self {
        Self {
            samples,
            sequence,
            frequency_hz,
        }
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True if the revolution carried no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Iterate over samples
    pub fn iter(&self) -> impl Iterator<Item = &ScanSample> {
        self.samples.iter()
    }

    /// Samples within the sensor's rated range
    pub fn valid_samples(&self) -> impl Iterator<Item = &ScanSample> {
        self.samples.iter().filter(|s| s.is_valid())
    }
}

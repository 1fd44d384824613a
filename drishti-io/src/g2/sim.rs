//! G2 byte-stream simulator
//!
//! Encodes scan frames exactly as the sensor sends them, and generates whole
//! revolutions for a sensor standing in a rectangular room. Used to exercise
//! the decoder and downstream consumers without hardware.

use super::constants::*;
use super::protocol::{PacketKind, encode_angle, frame_checksum, pack_sample};
use rand::prelude::*;
use rand::rngs::SmallRng;
use rand_distr::StandardNormal;

/// Encode one scan frame, including sync marker and a valid checksum
///
/// `samples` are `(distance mm, intensity)` pairs; at most 255 are used.
pub fn encode_frame(
    kind: PacketKind,
    frequency_hz: f32,
    start_deg: f64,
    end_deg: f64,
    samples: &[(u16, u16)],
) -> Vec<u8> {
    let samples = &samples[..samples.len().min(usize::from(u8::MAX))];
    let kind_bit = match kind {
        PacketKind::CycleStart => CT_CYCLE_START,
        PacketKind::Continuation => 0,
    };
    let frequency_code = ((frequency_hz * 10.0).round() as u8).min(0x7F);

    let start = encode_angle(start_deg).to_le_bytes();
    let end = encode_angle(end_deg).to_le_bytes();
    let mut header = [
        (frequency_code << 1) | kind_bit,
        samples.len() as u8,
        start[0],
        start[1],
        end[0],
        end[1],
        0,
        0,
    ];

    let payload: Vec<u8> = samples
        .iter()
        .flat_map(|&(distance, intensity)| pack_sample(intensity, distance))
        .collect();
    let checksum = frame_checksum(&header, &payload).to_le_bytes();
    header[6] = checksum[0];
    header[7] = checksum[1];

    let mut frame = Vec::with_capacity(2 + FRAME_HEADER_SIZE + payload.len());
    frame.extend([SYNC_BYTE_1, SYNC_BYTE_2]);
    frame.extend(header);
    frame.extend(payload);
    frame
}

/// Sensor at the center of an axis-aligned rectangular room
pub struct RoomSimulator {
    half_width_mm: f64,
    half_height_mm: f64,
    frames_per_revolution: usize,
    samples_per_frame: usize,
    frequency_hz: f32,
    range_noise_mm: f64,
    dropout_rate: f64,
    corruption_rate: f64,
    rng: SmallRng,
}

impl RoomSimulator {
    /// Create a noiseless simulator
    ///
    /// A seed of 0 draws from entropy; any other seed is reproducible.
    pub fn new(width_mm: f64, height_mm: f64, seed: u64) -> Self {
        let rng = if seed == 0 {
            SmallRng::from_entropy()
        } else {
            SmallRng::seed_from_u64(seed)
        };
        Self {
            half_width_mm: width_mm / 2.0,
            half_height_mm: height_mm / 2.0,
            frames_per_revolution: 12,
            samples_per_frame: 40,
            frequency_hz: 7.0,
            range_noise_mm: 0.0,
            dropout_rate: 0.0,
            corruption_rate: 0.0,
            rng,
        }
    }

    /// Frames per revolution and samples per frame
    pub fn with_layout(mut self, frames_per_revolution: usize, samples_per_frame: usize) -> Self {
        self.frames_per_revolution = frames_per_revolution.max(1);
        self.samples_per_frame = samples_per_frame.clamp(1, usize::from(u8::MAX));
        self
    }

    /// Gaussian range noise (standard deviation, mm)
    pub fn with_range_noise(mut self, stddev_mm: f64) -> Self {
        self.range_noise_mm = stddev_mm.max(0.0);
        self
    }

    /// Probability that a sample reports no return
    pub fn with_dropout(mut self, rate: f64) -> Self {
        self.dropout_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Probability that any emitted byte is flipped
    pub fn with_corruption(mut self, rate: f64) -> Self {
        self.corruption_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Exact distance to the wall along `angle_deg`, in millimeters
    pub fn true_range(&self, angle_deg: f64) -> f64 {
        let (sin, cos) = angle_deg.to_radians().sin_cos();
        let to_x = if cos.abs() > f64::EPSILON {
            self.half_width_mm / cos.abs()
        } else {
            f64::INFINITY
        };
        let to_y = if sin.abs() > f64::EPSILON {
            self.half_height_mm / sin.abs()
        } else {
            f64::INFINITY
        };
        to_x.min(to_y)
    }

    fn measure(&mut self, angle_deg: f64) -> (u16, u16) {
        if self.dropout_rate > 0.0 && self.rng.gen_bool(self.dropout_rate) {
            return (0, 0);
        }
        let mut range = self.true_range(angle_deg);
        if self.range_noise_mm > 0.0 {
            let n: f64 = self.rng.sample(StandardNormal);
            range += n * self.range_noise_mm;
        }
        let distance = range.round().clamp(1.0, f64::from(MAX_DISTANCE_CODE)) as u16;
        // Brighter returns from closer walls
        let intensity = (1023.0 - range / 16.0).clamp(16.0, 1023.0) as u16;
        (distance, intensity)
    }

    /// One revolution: a cycle-start frame at 0° followed by the body frames
    pub fn revolution(&mut self) -> Vec<u8> {
        let first = self.measure(0.0);
        let mut bytes = encode_frame(PacketKind::CycleStart, self.frequency_hz, 0.0, 0.0, &[first]);

        let step = 360.0 / self.frames_per_revolution as f64;
        let per_sample = step / (self.samples_per_frame as f64 + 1.0);
        for frame in 0..self.frames_per_revolution {
            let start = frame as f64 * step;
            let samples: Vec<(u16, u16)> = (0..self.samples_per_frame)
                .map(|i| self.measure(start + per_sample * (i as f64 + 1.0)))
                .collect();
            bytes.extend(encode_frame(
                PacketKind::Continuation,
                self.frequency_hz,
                start,
                start + step,
                &samples,
            ));
        }

        if self.corruption_rate > 0.0 {
            for byte in bytes.iter_mut() {
                if self.rng.gen_bool(self.corruption_rate) {
                    *byte ^= self.rng.gen_range(1..=u8::MAX);
                }
            }
        }
        bytes
    }

    /// Several consecutive revolutions
    pub fn stream(&mut self, revolutions: usize) -> Vec<u8> {
        (0..revolutions).flat_map(|_| self.revolution()).collect()
    }
}

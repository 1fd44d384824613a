//! Streaming decoder for G2 scan frames
//!
//! Bytes are pushed one at a time; a corrupted byte costs at most the frame it
//! lands in:
//! ```text
//! SeekSync1 ──0xAA──▶ SeekSync2 ──0x55──▶ Header ──8 B──▶ Samples ──N×3 B──▶ frame
//!     ▲                  │ other                                     │
//!     └──────────────────┴───────────────────────────────────────────┘
//! ```
//! Frames then go through [`CycleAssembler`], which groups them into
//! revolutions on cycle-start headers.

use super::constants::*;
use super::protocol::{FrameHeader, PacketKind, verify_checksum};
use crate::config::ChecksumPolicy;
use crate::types::{Cycle, ScanSample};

/// One decoded scan frame
#[derive(Debug, Clone, PartialEq)]
pub struct ScanFrame {
    pub header: FrameHeader,
    pub samples: Vec<ScanSample>,
    /// False when the checksum did not match (only kept under `Ignore`)
    pub checksum_ok: bool,
}

/// Running decoder counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderStats {
    /// Frames handed to the assembler
    pub frames: u64,
    /// Cycles emitted
    pub cycles: u64,
    /// Frames whose checksum did not match
    pub checksum_errors: u64,
    /// Mismatching frames dropped under `ChecksumPolicy::Reject`
    pub rejected_frames: u64,
    /// Bytes discarded while hunting for the sync marker
    pub skipped_bytes: u64,
}

#[derive(Debug, Clone, Copy)]
enum State {
    SeekSync1,
    SeekSync2,
    Header,
    Samples(FrameHeader),
}

/// Byte-level frame decoder with marker resynchronization
pub struct FrameDecoder {
    state: State,
    header_buf: [u8; FRAME_HEADER_SIZE],
    header_len: usize,
    payload: Vec<u8>,
    policy: ChecksumPolicy,
    stats: DecoderStats,
}

impl FrameDecoder {
    pub fn new(policy: ChecksumPolicy) -> Self {
        Self {
            state: State::SeekSync1,
            header_buf: [0; FRAME_HEADER_SIZE],
            header_len: 0,
            payload: Vec::with_capacity(usize::from(u8::MAX) * SAMPLE_SIZE),
            policy,
            stats: DecoderStats::default(),
        }
    }

    /// Feed one byte; returns a frame when its last payload byte arrives
    pub fn push(&mut self, byte: u8) -> Option<ScanFrame> {
        match self.state {
            State::SeekSync1 => {
                if byte == SYNC_BYTE_1 {
                    self.state = State::SeekSync2;
                } else {
                    self.stats.skipped_bytes += 1;
                }
                None
            }
            State::SeekSync2 => {
                if byte == SYNC_BYTE_2 {
                    self.header_len = 0;
                    self.state = State::Header;
                } else if byte == SYNC_BYTE_1 {
                    // The earlier 0xAA was noise; this one may start the marker
                    self.stats.skipped_bytes += 1;
                } else {
                    self.stats.skipped_bytes += 2;
                    self.state = State::SeekSync1;
                }
                None
            }
            State::Header => {
                self.header_buf[self.header_len] = byte;
                self.header_len += 1;
                if self.header_len < FRAME_HEADER_SIZE {
                    return None;
                }

                let header = FrameHeader::parse(&self.header_buf);
                self.payload.clear();
                if header.sample_count == 0 {
                    self.state = State::SeekSync1;
                    return self.finish(header);
                }
                self.state = State::Samples(header);
                None
            }
            State::Samples(header) => {
                self.payload.push(byte);
                if self.payload.len() < header.payload_len() {
                    return None;
                }
                self.state = State::SeekSync1;
                self.finish(header)
            }
        }
    }

    fn finish(&mut self, header: FrameHeader) -> Option<ScanFrame> {
        let checksum_ok = match verify_checksum(&self.header_buf, &self.payload) {
            Ok(()) => true,
            Err(e) => {
                self.stats.checksum_errors += 1;
                if self.policy == ChecksumPolicy::Reject {
                    self.stats.rejected_frames += 1;
                    log::debug!("G2: Dropping frame ({})", e);
                    return None;
                }
                log::trace!("G2: Keeping frame despite {}", e);
                false
            }
        };

        self.stats.frames += 1;
        let samples = self
            .payload
            .chunks_exact(SAMPLE_SIZE)
            .enumerate()
            .map(|(index, bytes)| header.decode_sample(index, [bytes[0], bytes[1], bytes[2]]))
            .collect();

        Some(ScanFrame {
            header,
            samples,
            checksum_ok,
        })
    }

    /// Current counters (`cycles` is filled in by [`ScanDecoder`])
    pub fn stats(&self) -> DecoderStats {
        self.stats
    }

    /// Forget any partial frame
    pub fn reset(&mut self) {
        self.state = State::SeekSync1;
        self.header_len = 0;
        self.payload.clear();
    }
}

/// Groups frames into revolutions
///
/// Frames seen before the first cycle-start frame belong to a partial
/// revolution and are dropped. The first cycle-start frame opens
/// accumulation with its own samples. Each later cycle-start frame
/// contributes its samples to the open revolution, closes it and opens an
/// empty one.
#[derive(Debug, Default)]
pub struct CycleAssembler {
    open: bool,
    samples: Vec<ScanSample>,
    sequence: u64,
}

impl CycleAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_frame(&mut self, frame: ScanFrame) -> Option<Cycle> {
        match frame.header.kind {
            PacketKind::Continuation => {
                if self.open {
                    self.samples.extend(frame.samples);
                }
                None
            }
            PacketKind::CycleStart if !self.open => {
                log::debug!("G2: First cycle start, accumulating");
                self.open = true;
                self.samples = frame.samples;
                None
            }
            PacketKind::CycleStart => {
                self.samples.extend(frame.samples);
                let samples = std::mem::replace(
                    &mut self.samples,
                    Vec::with_capacity(CYCLE_CAPACITY_HINT),
                );
                self.sequence += 1;
                Some(Cycle::new(self.sequence, frame.header.frequency_hz, samples))
            }
        }
    }

    /// True once a cycle-start frame has been seen
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Drop the open revolution and wait for the next cycle start
    pub fn reset(&mut self) {
        self.open = false;
        self.samples.clear();
    }
}

/// Bytes in, revolutions out
pub struct ScanDecoder {
    frames: FrameDecoder,
    assembler: CycleAssembler,
    cycles: u64,
}

impl ScanDecoder {
    pub fn new(policy: ChecksumPolicy) -> Self {
        Self {
            frames: FrameDecoder::new(policy),
            assembler: CycleAssembler::new(),
            cycles: 0,
        }
    }

    /// Feed one byte
    pub fn push(&mut self, byte: u8) -> Option<Cycle> {
        let frame = self.frames.push(byte)?;
        let cycle = self.assembler.push_frame(frame)?;
        self.cycles += 1;
        log::trace!(
            "G2: Cycle #{} with {} samples at {:.1} Hz",
            cycle.sequence,
            cycle.len(),
            cycle.frequency_hz
        );
        Some(cycle)
    }

    /// Feed a chunk, appending completed cycles to `out`
    ///
    /// Returns the number of cycles appended.
    pub fn feed(&mut self, bytes: &[u8], out: &mut Vec<Cycle>) -> usize {
        let before = out.len();
        out.extend(bytes.iter().filter_map(|&byte| self.push(byte)));
        out.len() - before
    }

    pub fn stats(&self) -> DecoderStats {
        DecoderStats {
            cycles: self.cycles,
            ..self.frames.stats()
        }
    }

    /// Restart from a clean state, as after the sensor is re-enabled
    pub fn reset(&mut self) {
        self.frames.reset();
        self.assembler.reset();
    }
}

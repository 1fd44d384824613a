//! Reader thread: transport bytes → decoder → bounded cycle queue

use super::SharedTransport;
use super::constants::{READ_CHUNK_SIZE, SEND_RETRY_INTERVAL_MS};
use super::decoder::{DecoderStats, ScanDecoder};
use crate::config::{BackpressurePolicy, ChecksumPolicy};
use crate::error::Result;
use crate::transport::Transport;
use crate::types::Cycle;
use crossbeam_channel::{Receiver, SendTimeoutError, Sender, TrySendError};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

/// Counters shared between the reader thread and the driver
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReaderStats {
    pub decoder: DecoderStats,
    pub bytes_read: u64,
    /// Cycles evicted under `BackpressurePolicy::DropOldest`
    pub dropped_cycles: u64,
}

/// Everything the reader thread owns
pub(super) struct ReaderContext {
    pub transport: SharedTransport,
    pub shutdown: Arc<AtomicBool>,
    pub tx: Sender<Result<Cycle>>,
    /// Consumer-side handle used to evict under `DropOldest`
    pub evict: Option<Receiver<Result<Cycle>>>,
    pub backpressure: BackpressurePolicy,
    pub checksum: ChecksumPolicy,
    pub stats: Arc<Mutex<ReaderStats>>,
}

pub(super) fn reader_loop(ctx: ReaderContext) {
    let mut decoder = ScanDecoder::new(ctx.checksum);
    let mut buffer = [0u8; READ_CHUNK_SIZE];
    let mut cycles = Vec::new();

    'read: while !ctx.shutdown.load(Ordering::Relaxed) {
        let read = ctx.transport.lock().read(&mut buffer);
        match read {
            Ok(0) => {
                // Serial reads already wait for the poll timeout
                thread::sleep(Duration::from_millis(1));
            }
            Ok(n) => {
                decoder.feed(&buffer[..n], &mut cycles);
                {
                    let mut stats = ctx.stats.lock();
                    stats.bytes_read += n as u64;
                    stats.decoder = decoder.stats();
                }

                for cycle in cycles.drain(..) {
                    let sequence = cycle.sequence;
                    if !deliver(&ctx, Ok(cycle)) {
                        break 'read;
                    }
                    if sequence % 100 == 0 {
                        let stats = decoder.stats();
                        log::debug!(
                            "G2: {} cycles, {} frames, {} checksum errors, {} bytes skipped",
                            stats.cycles,
                            stats.frames,
                            stats.checksum_errors,
                            stats.skipped_bytes
                        );
                    }
                }
            }
            Err(e) => {
                log::error!("G2 read error: {}", e);
                deliver(&ctx, Err(e));
                break;
            }
        }
    }

    log::info!("G2 reader thread exiting");
}

/// Push one item into the queue according to the backpressure policy
///
/// Returns false when the reader should stop: shutdown was requested or the
/// consumer is gone.
fn deliver(ctx: &ReaderContext, mut item: Result<Cycle>) -> bool {
    match (ctx.backpressure, ctx.evict.as_ref()) {
        (BackpressurePolicy::DropOldest, Some(evict)) => loop {
            match ctx.tx.try_send(item) {
                Ok(()) => return true,
                Err(TrySendError::Full(returned)) => {
                    if evict.try_recv().is_ok() {
                        ctx.stats.lock().dropped_cycles += 1;
                        log::debug!("G2: Cycle queue full, dropped oldest cycle");
                    }
                    item = returned;
                }
                Err(TrySendError::Disconnected(_)) => return false,
            }
        },
        _ => {
            let mut stalled = false;
            loop {
                match ctx
                    .tx
                    .send_timeout(item, Duration::from_millis(SEND_RETRY_INTERVAL_MS))
                {
                    Ok(()) => return true,
                    Err(SendTimeoutError::Timeout(returned)) => {
                        if ctx.shutdown.load(Ordering::Relaxed) {
                            return false;
                        }
                        if !stalled {
                            log::debug!("G2: Cycle queue full, waiting for consumer");
                            stalled = true;
                        }
                        item = returned;
                    }
                    Err(SendTimeoutError::Disconnected(_)) => return false,
                }
            }
        }
    }
}

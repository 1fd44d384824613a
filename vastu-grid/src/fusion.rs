//! Single-writer fusion worker.
//!
//! One `fusion` thread owns the submapper and the global mapper. Revolutions,
//! observer-position updates and snapshot requests all arrive on one FIFO
//! channel, so a position update always applies between two fusions and
//! never in the middle of one.
//!
//! ```text
//!  lidar consumer ──Cycle──────────┐
//!  pose source ────ObserverPosition┼──▶ fusion thread ──▶ GlobalMapper
//!  UI / export ────Snapshot(reply)─┘         │
//!                     ◀──── MapSnapshot ─────┘
//! ```

use crate::config::{ConfigError, MapperConfig};
use crate::core::GridCoord;
use crate::error::{Error, Result};
use crate::grid::OccupancyGrid;
use crate::mapper::{GlobalMapper, UpdateResult};
use crate::submap::{Submap, Submapper};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use drishti_io::Cycle;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Messages accepted by the fusion thread.
#[derive(Debug)]
pub enum FusionMessage {
    /// Build a submap from a revolution and fuse it.
    Cycle(Cycle),
    /// Fuse a prebuilt submap.
    Submap(Submap),
    /// Replace the observer position.
    ObserverPosition(GridCoord),
    /// Reply with a copy of the current map.
    Snapshot(Sender<MapSnapshot>),
    /// Stop after everything queued before this message.
    Shutdown,
}

/// Running fusion counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FusionStats {
    /// Revolutions fused.
    pub cycles_fused: u64,
    /// Submaps fused, including those built from revolutions.
    pub submaps_fused: u64,
    /// Observer position updates applied.
    pub position_updates: u64,
    /// Global grid resizes.
    pub resizes: u64,
    /// Cells copied into the global grid.
    pub cells_written: u64,
}

/// Copy of the map at one point in the message stream.
#[derive(Clone, Debug)]
pub struct MapSnapshot {
    /// The global grid.
    pub grid: OccupancyGrid,
    /// Observer position.
    pub observer: GridCoord,
    /// Grid cell of the observer.
    pub drawing_point: GridCoord,
    /// Counters at snapshot time.
    pub stats: FusionStats,
}

/// Submapper plus global mapper.
///
/// Usable directly on the caller's thread, or moved onto its own thread
/// with [`FusionWorker::spawn`].
#[derive(Clone, Debug)]
pub struct FusionWorker {
    submapper: Submapper,
    mapper: GlobalMapper,
    stats: FusionStats,
}

impl FusionWorker {
    /// Combine a submapper and a mapper.
    pub fn new(submapper: Submapper, mapper: GlobalMapper) -> Self {
        Self {
            submapper,
            mapper,
            stats: FusionStats::default(),
        }
    }

    /// Build both parts from a configuration.
    pub fn from_config(config: &MapperConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(
            Submapper::from_config(config)?,
            GlobalMapper::from_config(config)?,
        ))
    }

    /// Build the submap for `cycle` and fuse it at the current position.
    pub fn fuse_cycle(&mut self, cycle: &Cycle) -> UpdateResult {
        let submap = self.submapper.build(cycle);
        let result = self.fuse_submap(&submap);
        self.stats.cycles_fused += 1;
        result
    }

    /// Fuse a submap at the current position.
    pub fn fuse_submap(&mut self, submap: &Submap) -> UpdateResult {
        let result = self.mapper.update(submap);
        self.stats.submaps_fused += 1;
        self.stats.cells_written += result.cells_written as u64;
        if result.resized {
            self.stats.resizes += 1;
        }
        result
    }

    /// Replace the observer position.
    pub fn update_observer_pos(&mut self, position: GridCoord) {
        self.mapper.update_observer_pos(position);
        self.stats.position_updates += 1;
    }

    /// The submapper.
    pub fn submapper(&self) -> &Submapper {
        &self.submapper
    }

    /// The global mapper.
    pub fn mapper(&self) -> &GlobalMapper {
        &self.mapper
    }

    /// Consume into the global mapper.
    pub fn into_mapper(self) -> GlobalMapper {
        self.mapper
    }

    /// Counters so far.
    pub fn stats(&self) -> FusionStats {
        self.stats
    }

    /// Copy of the current map.
    pub fn snapshot(&self) -> MapSnapshot {
        MapSnapshot {
            grid: self.mapper.grid().clone(),
            observer: self.mapper.observer_pos(),
            drawing_point: self.mapper.drawing_point(),
            stats: self.stats,
        }
    }

    /// Move the worker onto a `fusion` thread.
    pub fn spawn(self) -> Result<FusionHandle> {
        let (tx, rx) = crossbeam_channel::unbounded();
        let handle = thread::Builder::new()
            .name("fusion".into())
            .spawn(move || self.run(rx))?;
        Ok(FusionHandle {
            tx,
            handle: Some(handle),
        })
    }

    fn run(mut self, rx: Receiver<FusionMessage>) -> Self {
        log::info!("Fusion thread starting");

        for message in rx.iter() {
            match message {
                FusionMessage::Cycle(cycle) => {
                    let result = self.fuse_cycle(&cycle);
                    if self.stats.cycles_fused % 50 == 0 {
                        log::debug!(
                            "Fused {} cycles, grid {}x{}, last wrote {} cells",
                            self.stats.cycles_fused,
                            self.mapper.grid().width(),
                            self.mapper.grid().height(),
                            result.cells_written
                        );
                    }
                }
                FusionMessage::Submap(submap) => {
                    self.fuse_submap(&submap);
                }
                FusionMessage::ObserverPosition(position) => self.update_observer_pos(position),
                FusionMessage::Snapshot(reply) => {
                    // The requester may have timed out already
                    let _ = reply.send(self.snapshot());
                }
                FusionMessage::Shutdown => break,
            }
        }

        log::info!(
            "Fusion thread exiting after {} cycles ({} resizes)",
            self.stats.cycles_fused,
            self.stats.resizes
        );
        self
    }
}

/// Sending side of a running fusion thread.
///
/// Dropping the handle stops the thread after the queued messages.
pub struct FusionHandle {
    tx: Sender<FusionMessage>,
    handle: Option<JoinHandle<FusionWorker>>,
}

impl FusionHandle {
    /// Queue a revolution for fusion.
    pub fn submit_cycle(&self, cycle: Cycle) -> Result<()> {
        self.send(FusionMessage::Cycle(cycle))
    }

    /// Queue a prebuilt submap for fusion.
    pub fn submit_submap(&self, submap: Submap) -> Result<()> {
        self.send(FusionMessage::Submap(submap))
    }

    /// Queue an observer position update.
    pub fn update_observer_pos(&self, position: GridCoord) -> Result<()> {
        self.send(FusionMessage::ObserverPosition(position))
    }

    /// Copy of the map once every message queued before this call is applied.
    pub fn snapshot(&self, timeout: Duration) -> Result<MapSnapshot> {
        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        self.send(FusionMessage::Snapshot(reply_tx))?;
        reply_rx.recv_timeout(timeout).map_err(|e| match e {
            RecvTimeoutError::Timeout => Error::Timeout,
            RecvTimeoutError::Disconnected => Error::WorkerStopped,
        })
    }

    /// True until the thread exits.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Drain the queue, stop the thread and take back the worker.
    pub fn shutdown(mut self) -> Result<FusionWorker> {
        let handle = self.handle.take().ok_or(Error::WorkerStopped)?;
        // A dead thread has dropped its receiver; join reports why
        let _ = self.tx.send(FusionMessage::Shutdown);
        handle.join().map_err(|_| Error::WorkerPanicked)
    }

    fn send(&self, message: FusionMessage) -> Result<()> {
        self.tx.send(message).map_err(|_| Error::WorkerStopped)
    }
}

impl Drop for FusionHandle {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = self.tx.send(FusionMessage::Shutdown);
            let _ = handle.join();
        }
    }
}

//! # DrishtiIO
//!
//! Serial driver and stream decoder for the YDLidar G2 rotating range sensor.
//!
//! The sensor streams self-synchronizing binary frames; this crate finds frame
//! boundaries, decodes the packed samples with the distance-dependent angle
//! correction, groups them into revolutions and hands them to a consumer
//! through a bounded queue fed by a dedicated reader thread.
//!
//! ```no_run
//! use drishti_io::{G2Driver, LidarConfig};
//! use std::time::Duration;
//!
//! let mut lidar = G2Driver::open(LidarConfig::default())?;
//! lidar.enable()?;
//! let cycle = lidar.read_cycle(Duration::from_secs(1))?;
//! println!("{} samples", cycle.len());
//! lidar.disable()?;
//! # Ok::<(), drishti_io::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod g2;
pub mod transport;
pub mod types;

pub use config::{BackpressurePolicy, ChecksumPolicy, LidarConfig};
pub use error::{Error, Result};
pub use g2::{DecoderStats, G2Driver, ReaderStats, ScanDecoder};
pub use transport::{MockTransport, SerialTransport, Transport};
pub use types::{Cycle, ScanSample};

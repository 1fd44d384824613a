//! G2 scan dumper
//!
//! Queries the lidar, then prints a summary of every revolution for ten
//! seconds. Pass a TOML config path as the first argument, or `--sim` to run
//! against the built-in room simulator.

use drishti_io::g2::sim::RoomSimulator;
use drishti_io::{Error, G2Driver, LidarConfig, MockTransport};
use std::time::{Duration, Instant};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let arg = std::env::args().nth(1);
    let mut lidar = match arg.as_deref() {
        Some("--sim") => {
            let transport = MockTransport::new();
            let mut room = RoomSimulator::new(5000.0, 3500.0, 42).with_range_noise(8.0);
            transport.inject_read(&room.stream(80));
            G2Driver::new(transport, LidarConfig::default())?
        }
        Some(path) => G2Driver::open(LidarConfig::from_file(path)?)?,
        None => G2Driver::open(LidarConfig::default())?,
    };

    if arg.as_deref() != Some("--sim") {
        lidar.device_info()?;
        let health = lidar.health()?;
        log::info!("Health: {:?}", health);
        log::info!("Scan frequency: {:.2} Hz", lidar.scan_frequency()?);
    }

    lidar.enable()?;
    let start = Instant::now();
    while start.elapsed() < Duration::from_secs(10) {
        match lidar.read_cycle(Duration::from_millis(500)) {
            Ok(cycle) => {
                let valid = cycle.valid_samples().count();
                let nearest = cycle
                    .valid_samples()
                    .map(|s| s.distance)
                    .min()
                    .unwrap_or(0);
                log::info!(
                    "Cycle #{}: {} samples ({} valid), {:.1} Hz, nearest {} mm",
                    cycle.sequence,
                    cycle.len(),
                    valid,
                    cycle.frequency_hz,
                    nearest
                );
            }
            Err(Error::Timeout) => log::warn!("No revolution within 500 ms"),
            Err(e) => {
                log::error!("Lidar stopped: {}", e);
                break;
            }
        }
    }

    let stats = lidar.stats();
    lidar.disable()?;
    log::info!(
        "Done: {} cycles, {} frames, {} checksum errors, {} bytes read",
        stats.decoder.cycles,
        stats.decoder.frames,
        stats.decoder.checksum_errors,
        stats.bytes_read
    );
    Ok(())
}

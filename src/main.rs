//! Hydrostat main entry point.
//!
//! Bring-up order: logger, shutdown signals, configuration (defaults
//! when no file exists), calibration, peripherals, then the control
//! loop. Peripheral construction failure is fatal; everything after
//! that point degrades instead of exiting.

use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{info, warn};

use hydrostat::adapters::hardware::{self, Wiring};
use hydrostat::adapters::log_sink::LogEventSink;
use hydrostat::adapters::snapshot::JsonSnapshotSink;
use hydrostat::app::service::Controller;
use hydrostat::config::{CalibrationParams, SystemConfig};

const CONFIG_PATH: &str = "/etc/hydrostat/config.json";
const CALIBRATION_PATH: &str = "/etc/hydrostat/calibration.json";
const SNAPSHOT_PATH: &str = "/var/lib/hydrostat/current_data.json";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("hydrostat v{}", env!("CARGO_PKG_VERSION"));

    // SIGINT/SIGTERM set the flag; the loop exits after its current
    // cycle and runs the shutdown sequence.
    let shutdown = Arc::new(AtomicBool::new(false));
    for signal in [signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM] {
        signal_hook::flag::register(signal, Arc::clone(&shutdown))
            .context("registering shutdown signal handler")?;
    }

    let config_path = std::env::args().nth(1);
    let config_path = config_path.as_deref().unwrap_or(CONFIG_PATH);
    let config = match SystemConfig::load(Path::new(config_path)) {
        Ok(c) => {
            info!("configuration loaded from {config_path}");
            c
        }
        Err(e) => {
            warn!("config load failed ({e}), running with defaults");
            SystemConfig::default()
        }
    };

    let calibration = match CalibrationParams::load(Path::new(CALIBRATION_PATH)) {
        Ok(c) => c,
        Err(e) => {
            warn!("calibration load failed ({e}), using factory defaults");
            CalibrationParams::default()
        }
    };

    // Fatal startup fault: no degraded mode without a full sensor and
    // pump set. Nothing is running yet, so there is nothing to stop.
    let mut hw = hardware::build(&Wiring::default(), &calibration)
        .context("constructing enclosure peripherals")?;

    let mut snapshot = JsonSnapshotSink::new(SNAPSHOT_PATH);
    let mut sink = LogEventSink;

    let mut controller = Controller::new(config);
    controller.run(&mut hw, &mut snapshot, &mut sink, &shutdown);

    Ok(())
}

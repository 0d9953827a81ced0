//! Per-cycle sensor snapshot and the authoritative control state.
//!
//! [`ControlState`] is the single in-process record of the latest
//! readings and pump flags. It is owned exclusively by the controller,
//! mutated once per cycle, and serialized whole to the snapshot sink for
//! the external monitor.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A point-in-time reading of every sensor, in physical units.
///
/// Produced once per cycle by the sensor port. A failed read never
/// yields an absent value; the drivers substitute defined fallbacks
/// (0 ppm, pH 7.0, 25 °C, 0 cm).
#[derive(Debug, Clone, Copy, Default)]
pub struct SensorReadings {
    /// Total dissolved solids (ppm).
    pub tds_ppm: f32,
    /// pH, clamped to [0, 14].
    pub ph: f32,
    /// Water temperature (Celsius).
    pub temperature_c: f32,
    /// Distance-derived water level (cm).
    pub water_level_cm: f32,
}

/// The latest readings plus each pump's hysteresis flag.
///
/// Field names are the published snapshot schema; external monitors
/// parse them, so they do not follow internal naming.
#[derive(Debug, Clone, Serialize)]
pub struct ControlState {
    pub tds: f32,
    pub ph: f32,
    pub temperature: f32,
    pub water_level: f32,
    /// ISO-8601 timestamp of the last sensor read.
    pub timestamp: DateTime<Utc>,
    pub nutrient_pump_active: bool,
    pub ph_pump_active: bool,
}

impl Default for ControlState {
    fn default() -> Self {
        Self {
            tds: 0.0,
            ph: 0.0,
            temperature: 0.0,
            water_level: 0.0,
            timestamp: DateTime::<Utc>::UNIX_EPOCH,
            nutrient_pump_active: false,
            ph_pump_active: false,
        }
    }
}

impl ControlState {
    /// Fold a fresh set of readings in and stamp the time.
    /// Pump flags are left untouched; the hysteresis machines own them.
    pub fn record(&mut self, readings: &SensorReadings, now: DateTime<Utc>) {
        self.tds = readings.tds_ppm;
        self.ph = readings.ph;
        self.temperature = readings.temperature_c;
        self.water_level = readings.water_level_cm;
        self.timestamp = now;
    }
}

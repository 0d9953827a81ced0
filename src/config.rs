//! System configuration parameters.
//!
//! Two structs, deliberately separate: [`SystemConfig`] is the immutable
//! operating envelope loaded once at startup and passed by reference into
//! the control loop, and [`CalibrationParams`] is the small record the
//! external calibration tool rewrites between runs. The controller never
//! writes either back; updated calibration takes effect on restart.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Targets, limits and dosing parameters for the enclosure.
///
/// Defaults are tuned for leafy greens.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Nutrient targets ---
    /// TDS below this starts a nutrient dose (ppm).
    pub target_tds_min: f32,
    /// Upper end of the acceptable TDS band (ppm). Reported to the
    /// external monitor; the dosing logic keys off the minimum only.
    pub target_tds_max: f32,

    // --- pH targets ---
    /// Lower end of the acceptable pH band.
    pub target_ph_min: f32,
    /// pH above this starts a pH-down dose.
    pub target_ph_max: f32,

    // --- Temperature limits ---
    /// Alert below this water temperature (Celsius).
    pub min_temp: f32,
    /// Alert above this water temperature (Celsius).
    pub max_temp: f32,

    // --- Water level ---
    /// Alert when the measured level drops below this (cm).
    pub min_water_level: f32,

    // --- Dosing ---
    /// Nutrient volume per dose (ml).
    pub nutrient_dose_ml: f32,
    /// pH-down volume per dose (ml).
    pub ph_dose_ml: f32,

    // --- Timing ---
    /// Seconds between control cycles.
    pub update_interval_secs: u64,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            target_tds_min: 800.0,
            target_tds_max: 1200.0,
            target_ph_min: 5.5,
            target_ph_max: 6.5,
            min_temp: 18.0,
            max_temp: 26.0,
            min_water_level: 10.0,
            nutrient_dose_ml: 10.0,
            ph_dose_ml: 5.0,
            update_interval_secs: 60,
        }
    }
}

impl SystemConfig {
    /// Load from a JSON file, failing on I/O or schema errors.
    /// Missing-file fallback is the caller's decision (the binary runs
    /// with defaults when no file exists).
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("read {}: {e}", path.display())))?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| Error::Config(format!("parse {}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Range-check every field. Invalid values are rejected, not clamped,
    /// so a bad config file cannot silently disable an alert threshold.
    pub fn validate(&self) -> Result<()> {
        fn reject(msg: &str) -> Result<()> {
            Err(Error::Config(msg.to_string()))
        }

        if self.target_tds_min <= 0.0 || self.target_tds_max <= self.target_tds_min {
            return reject("TDS band must satisfy 0 < min < max");
        }
        if !(0.0..=14.0).contains(&self.target_ph_min)
            || !(0.0..=14.0).contains(&self.target_ph_max)
            || self.target_ph_max <= self.target_ph_min
        {
            return reject("pH band must satisfy 0 <= min < max <= 14");
        }
        if self.max_temp <= self.min_temp {
            return reject("temperature limits must satisfy min < max");
        }
        if self.min_water_level < 0.0 {
            return reject("min_water_level must be non-negative");
        }
        if self.nutrient_dose_ml <= 0.0 || self.ph_dose_ml <= 0.0 {
            return reject("dose volumes must be positive");
        }
        if self.update_interval_secs == 0 {
            return reject("update_interval_secs must be positive");
        }
        Ok(())
    }
}

/// Per-sensor calibration coefficients.
///
/// `ph_slope != 0` is assumed; the transform does not guard against a
/// degenerate slope because the calibration tool can only produce one
/// from two distinct buffer readings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationParams {
    /// Multiplicative TDS correction applied after the polynomial.
    pub tds_factor: f32,
    /// Affine pH correction: `ph = raw_ph * slope + offset`.
    pub ph_slope: f32,
    pub ph_offset: f32,
}

impl Default for CalibrationParams {
    fn default() -> Self {
        Self {
            tds_factor: 0.5,
            ph_slope: 1.0,
            ph_offset: 0.0,
        }
    }
}

impl CalibrationParams {
    /// Load from a JSON file (same shape the calibration tool writes).
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("read {}: {e}", path.display())))?;
        serde_json::from_str(&text)
            .map_err(|e| Error::Config(format!("parse {}: {e}", path.display())))
    }

    /// Derive pH slope/offset from a two-point calibration: the averaged
    /// uncalibrated pH readings in pH 4.0 and pH 7.0 buffer solutions.
    pub fn ph_two_point(low_raw_ph: f32, high_raw_ph: f32) -> (f32, f32) {
        let slope = 3.0 / (high_raw_ph - low_raw_ph);
        let offset = 4.0 - slope * low_raw_ph;
        (slope, offset)
    }

    /// Refit the TDS factor against a known reference solution: scale the
    /// current factor by the ratio of the known value to the measured one.
    pub fn tds_refit(current_factor: f32, known_ppm: f32, measured_ppm: f32) -> f32 {
        current_factor * (known_ppm / measured_ppm)
    }
}

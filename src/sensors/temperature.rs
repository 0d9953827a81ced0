//! Water temperature probe wrapper.
//!
//! The probe reports Celsius directly (DS18B20-style digital sensor,
//! one conversion per cycle, no averaging loop). The fallback on a
//! failed read is 25 °C, chosen so the TDS temperature-compensation
//! coefficient degrades to exactly 1.0.

use log::error;

use crate::app::ports::TempProbe;

/// Substituted when the probe cannot be read.
pub const FALLBACK_C: f32 = 25.0;

pub struct TemperatureSensor<P: TempProbe> {
    probe: P,
}

impl<P: TempProbe> TemperatureSensor<P> {
    pub fn new(probe: P) -> Self {
        Self { probe }
    }

    /// One conversion in Celsius. Logs and returns [`FALLBACK_C`] on fault.
    pub fn read(&mut self) -> f32 {
        match self.probe.read_celsius() {
            Ok(c) => c,
            Err(e) => {
                error!("temperature probe read failed: {e}");
                FALLBACK_C
            }
        }
    }

    pub fn release(&mut self) {
        self.probe.close();
    }
}
